use std::collections::HashMap;
use thiserror::Error;

use crate::migration_rule::{MigrationRule, StructuralTransform};

/// Immutable registry mapping (deprecated apiVersion, kind) to the successor
/// schema. Built once at startup, read-only afterwards.
#[derive(Debug)]
pub struct RuleTable {
    rules: HashMap<(String, String), MigrationRule>,
}

#[derive(Debug, Error)]
pub enum RuleTableError {
    #[error("duplicate migration rule for ({0}, {1})")]
    DuplicateRule(String, String),
}

impl RuleTable {
    /// Build a table from explicit rules, rejecting ambiguous entries: at most
    /// one rule may match a given (apiVersion, kind) pair.
    pub fn with_rules(rules: Vec<MigrationRule>) -> Result<Self, RuleTableError> {
        let mut table = HashMap::with_capacity(rules.len());
        for rule in rules {
            let key = (rule.deprecated_version.clone(), rule.kind.clone());
            if table.insert(key.clone(), rule).is_some() {
                return Err(RuleTableError::DuplicateRule(key.0, key.1));
            }
        }
        Ok(Self { rules: table })
    }

    /// The built-in Kubernetes deprecation table.
    pub fn builtin() -> Self {
        Self::with_rules(builtin_rules()).expect("built-in rule table contains duplicate entries")
    }

    /// Look up the rule for a (apiVersion, kind) pair. Total: anything not in
    /// the table, including unknown kinds under a known deprecated version,
    /// is simply no match.
    pub fn lookup(&self, api_version: &str, kind: &str) -> Option<&MigrationRule> {
        self.rules
            .get(&(api_version.to_string(), kind.to_string()))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MigrationRule> {
        self.rules.values()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_rules() -> Vec<MigrationRule> {
    let mut rules = Vec::new();

    // Workload resources
    for kind in ["Deployment", "DaemonSet", "ReplicaSet", "StatefulSet"] {
        rules.push(MigrationRule::new("extensions/v1beta1", kind, "apps/v1"));
    }

    // Ingress needs the pathType/backend rewrite on top of the version bump
    rules.push(
        MigrationRule::new("extensions/v1beta1", "Ingress", "networking.k8s.io/v1")
            .with_transform(StructuralTransform::IngressNetworkingV1),
    );

    rules.push(MigrationRule::new(
        "networking.k8s.io/v1beta1",
        "NetworkPolicy",
        "networking.k8s.io/v1",
    ));

    // RBAC
    for kind in ["ClusterRole", "ClusterRoleBinding", "Role", "RoleBinding"] {
        rules.push(MigrationRule::new(
            "rbac.authorization.k8s.io/v1beta1",
            kind,
            "rbac.authorization.k8s.io/v1",
        ));
    }

    // Storage
    for kind in ["StorageClass", "CSIDriver", "CSINode"] {
        rules.push(MigrationRule::new(
            "storage.k8s.io/v1beta1",
            kind,
            "storage.k8s.io/v1",
        ));
    }

    // Admission
    for kind in [
        "MutatingWebhookConfiguration",
        "ValidatingWebhookConfiguration",
    ] {
        rules.push(MigrationRule::new(
            "admissionregistration.k8s.io/v1beta1",
            kind,
            "admissionregistration.k8s.io/v1",
        ));
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_successors() {
        let table = RuleTable::builtin();

        let expected = [
            ("extensions/v1beta1", "Deployment", "apps/v1"),
            ("extensions/v1beta1", "DaemonSet", "apps/v1"),
            ("extensions/v1beta1", "ReplicaSet", "apps/v1"),
            ("extensions/v1beta1", "StatefulSet", "apps/v1"),
            ("extensions/v1beta1", "Ingress", "networking.k8s.io/v1"),
            (
                "networking.k8s.io/v1beta1",
                "NetworkPolicy",
                "networking.k8s.io/v1",
            ),
            (
                "rbac.authorization.k8s.io/v1beta1",
                "ClusterRole",
                "rbac.authorization.k8s.io/v1",
            ),
            (
                "rbac.authorization.k8s.io/v1beta1",
                "ClusterRoleBinding",
                "rbac.authorization.k8s.io/v1",
            ),
            (
                "rbac.authorization.k8s.io/v1beta1",
                "Role",
                "rbac.authorization.k8s.io/v1",
            ),
            (
                "rbac.authorization.k8s.io/v1beta1",
                "RoleBinding",
                "rbac.authorization.k8s.io/v1",
            ),
            ("storage.k8s.io/v1beta1", "StorageClass", "storage.k8s.io/v1"),
            ("storage.k8s.io/v1beta1", "CSIDriver", "storage.k8s.io/v1"),
            ("storage.k8s.io/v1beta1", "CSINode", "storage.k8s.io/v1"),
            (
                "admissionregistration.k8s.io/v1beta1",
                "MutatingWebhookConfiguration",
                "admissionregistration.k8s.io/v1",
            ),
            (
                "admissionregistration.k8s.io/v1beta1",
                "ValidatingWebhookConfiguration",
                "admissionregistration.k8s.io/v1",
            ),
        ];

        assert_eq!(table.len(), expected.len());
        for (version, kind, successor) in expected {
            let rule = table.lookup(version, kind).unwrap();
            assert_eq!(rule.successor, successor, "{kind} under {version}");
        }
    }

    #[test]
    fn test_only_ingress_carries_a_transform() {
        let table = RuleTable::builtin();
        for rule in table.iter() {
            if rule.kind == "Ingress" {
                assert!(rule.transform.is_some());
            } else {
                assert!(rule.transform.is_none(), "{} should be a plain bump", rule.kind);
            }
        }
    }

    #[test]
    fn test_unknown_kind_under_known_version_is_no_match() {
        let table = RuleTable::builtin();
        assert!(table.lookup("extensions/v1beta1", "CronJob").is_none());
        assert!(table.lookup("apps/v1", "Deployment").is_none());
        assert!(table.lookup("", "").is_none());
    }

    #[test]
    fn test_duplicate_rules_rejected_at_construction() {
        let rules = vec![
            MigrationRule::new("extensions/v1beta1", "Deployment", "apps/v1"),
            MigrationRule::new("extensions/v1beta1", "Deployment", "apps/v2"),
        ];

        let err = RuleTable::with_rules(rules).unwrap_err();
        assert!(matches!(err, RuleTableError::DuplicateRule(_, _)));
    }
}
