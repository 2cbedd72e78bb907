use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;

use crate::transformer::DocumentTransformer;

/// Per-document record of what the batch driver did.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DocumentResult {
    pub changed: bool,
    pub description: String,
}

/// Result of migrating one multi-document stream.
///
/// `output` is `None` when no document matched a rule: the caller should not
/// write a file and should report that no migrations were needed.
#[derive(Debug, Clone)]
pub struct StreamOutcome {
    pub output: Option<String>,
    pub results: Vec<DocumentResult>,
}

impl StreamOutcome {
    pub fn any_changed(&self) -> bool {
        self.output.is_some()
    }
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("manifest stream is not well-formed YAML: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("failed to serialize migrated manifest stream: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// Migrate an ordered multi-document manifest stream.
///
/// Null sub-documents (blank space between `---` separators) are dropped.
/// Document order is preserved; documents are never reordered, merged, or
/// split. When at least one document changed, the full stream is
/// re-serialized, unchanged documents included in their original positions.
pub fn migrate_stream(
    transformer: &DocumentTransformer,
    input: &str,
) -> Result<StreamOutcome, StreamError> {
    let mut documents = Vec::new();
    for de in serde_yaml::Deserializer::from_str(input) {
        let doc = Value::deserialize(de).map_err(StreamError::Parse)?;
        if doc.is_null() {
            continue;
        }
        documents.push(doc);
    }

    let mut migrated = Vec::with_capacity(documents.len());
    let mut results = Vec::with_capacity(documents.len());
    let mut any_changed = false;

    for doc in documents {
        let outcome = transformer.transform(doc);
        any_changed |= outcome.changed;
        results.push(DocumentResult {
            changed: outcome.changed,
            description: outcome.description,
        });
        migrated.push(outcome.document);
    }

    if !any_changed {
        return Ok(StreamOutcome {
            output: None,
            results,
        });
    }

    let mut output = String::new();
    for (i, doc) in migrated.iter().enumerate() {
        if i > 0 {
            output.push_str("---\n");
        }
        let rendered = serde_yaml::to_string(doc).map_err(StreamError::Serialize)?;
        output.push_str(&rendered);
    }

    Ok(StreamOutcome {
        output: Some(output),
        results,
    })
}
