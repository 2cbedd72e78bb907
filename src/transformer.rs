use serde_yaml::Value;

use crate::rule_table::RuleTable;

/// Applies at most one migration rule to one manifest document.
pub struct DocumentTransformer {
    table: RuleTable,
}

/// Result of transforming a single document. Ownership of the (possibly
/// rewritten) document transfers back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationOutcome {
    pub document: Value,
    pub changed: bool,
    pub description: String,
}

impl MigrationOutcome {
    fn unchanged(document: Value) -> Self {
        Self {
            document,
            changed: false,
            description: String::new(),
        }
    }
}

impl DocumentTransformer {
    pub fn new(table: RuleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Migrate one document if its (apiVersion, kind) pair is deprecated.
    ///
    /// Documents that are not mappings, lack apiVersion/kind, or match no rule
    /// pass through unchanged. This never fails: malformed nested shapes
    /// degrade to a schema-only migration rather than aborting the batch.
    pub fn transform(&self, doc: Value) -> MigrationOutcome {
        let api_version = doc
            .get("apiVersion")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let kind = doc.get("kind").and_then(Value::as_str).unwrap_or_default();

        if api_version.is_empty() || kind.is_empty() {
            return MigrationOutcome::unchanged(doc);
        }

        let Some(rule) = self.table.lookup(api_version, kind) else {
            return MigrationOutcome::unchanged(doc);
        };

        let description = format!("{}: {} -> {}", kind, api_version, rule.successor);
        tracing::debug!(kind, old = api_version, new = %rule.successor, "migrating document");

        let mut doc = doc;
        if let Some(map) = doc.as_mapping_mut() {
            map.insert(
                Value::String("apiVersion".to_string()),
                Value::String(rule.successor.clone()),
            );
        }

        let doc = match &rule.transform {
            Some(transform) => transform.apply(doc),
            None => doc,
        };

        MigrationOutcome {
            document: doc,
            changed: true,
            description,
        }
    }
}

impl Default for DocumentTransformer {
    fn default() -> Self {
        Self::new(RuleTable::builtin())
    }
}
