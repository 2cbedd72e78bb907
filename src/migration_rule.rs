use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// A single deprecation rule: one (deprecated apiVersion, kind) pair and the
/// schema version that replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationRule {
    pub deprecated_version: String,
    pub kind: String,
    pub successor: String,
    pub transform: Option<StructuralTransform>,
}

/// Shape-changing rewrites required by a successor schema, beyond the
/// apiVersion string substitution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StructuralTransform {
    /// Ingress extensions/v1beta1 -> networking.k8s.io/v1: mandatory
    /// `pathType` and the nested `backend.service` shape.
    IngressNetworkingV1,
}

impl MigrationRule {
    pub fn new(
        deprecated_version: impl Into<String>,
        kind: impl Into<String>,
        successor: impl Into<String>,
    ) -> Self {
        Self {
            deprecated_version: deprecated_version.into(),
            kind: kind.into(),
            successor: successor.into(),
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: StructuralTransform) -> Self {
        self.transform = Some(transform);
        self
    }
}

impl StructuralTransform {
    /// Apply the rewrite to an owned document and return the new value.
    ///
    /// Transforms never fail: a document whose nested shape does not match
    /// expectations is returned with only the parts that did match rewritten.
    pub fn apply(&self, mut doc: Value) -> Value {
        match self {
            StructuralTransform::IngressNetworkingV1 => {
                rewrite_ingress_paths(&mut doc);
                doc
            }
        }
    }
}

/// Walk `spec.rules[].http.paths[]` and bring each path entry up to the
/// networking.k8s.io/v1 shape. Missing levels are skipped, not errors.
fn rewrite_ingress_paths(doc: &mut Value) {
    let Some(rules) = doc
        .get_mut("spec")
        .and_then(|spec| spec.get_mut("rules"))
        .and_then(Value::as_sequence_mut)
    else {
        return;
    };

    for rule in rules {
        let Some(paths) = rule
            .get_mut("http")
            .and_then(|http| http.get_mut("paths"))
            .and_then(Value::as_sequence_mut)
        else {
            continue;
        };

        for path in paths {
            let Some(path_map) = path.as_mapping_mut() else {
                continue;
            };

            // pathType is mandatory in v1. Additive only: an explicit value,
            // standard or not, is never overwritten.
            path_map
                .entry(Value::String("pathType".to_string()))
                .or_insert_with(|| Value::String("Prefix".to_string()));

            if let Some(backend_entry) = path_map.get_mut(&Value::String("backend".to_string())) {
                if let Value::Mapping(backend) = backend_entry {
                    // Only the old flat shape carries serviceName; the nested
                    // v1 shape passes through untouched, keeping the rewrite
                    // idempotent.
                    if let Some(service_name) =
                        backend.remove(&Value::String("serviceName".to_string()))
                    {
                        let service_port = backend
                            .remove(&Value::String("servicePort".to_string()))
                            .unwrap_or(Value::Number(serde_yaml::Number::from(80)));

                        let mut port = Mapping::new();
                        port.insert(Value::String("number".to_string()), service_port);

                        let mut service = Mapping::new();
                        service.insert(Value::String("name".to_string()), service_name);
                        service.insert(Value::String("port".to_string()), Value::Mapping(port));

                        let mut new_backend = Mapping::new();
                        new_backend
                            .insert(Value::String("service".to_string()), Value::Mapping(service));

                        *backend_entry = Value::Mapping(new_backend);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingress_with_paths(paths_yaml: &str) -> Value {
        serde_yaml::from_str(&format!(
            r#"
            apiVersion: networking.k8s.io/v1
            kind: Ingress
            spec:
              rules:
                - host: example.com
                  http:
                    paths:
{paths_yaml}
            "#
        ))
        .unwrap()
    }

    fn first_path(doc: &Value) -> &Value {
        &doc["spec"]["rules"][0]["http"]["paths"][0]
    }

    #[test]
    fn test_backend_rewritten_to_nested_shape() {
        let doc = ingress_with_paths(
            r#"
                      - path: /api
                        backend:
                          serviceName: svc
                          servicePort: 8080
            "#,
        );

        let migrated = StructuralTransform::IngressNetworkingV1.apply(doc);
        let path = first_path(&migrated);

        assert_eq!(path["backend"]["service"]["name"].as_str().unwrap(), "svc");
        assert_eq!(
            path["backend"]["service"]["port"]["number"].as_u64().unwrap(),
            8080
        );
        assert!(path["backend"].get("serviceName").is_none());
        assert!(path["backend"].get("servicePort").is_none());
    }

    #[test]
    fn test_missing_service_port_defaults_to_80() {
        let doc = ingress_with_paths(
            r#"
                      - path: /
                        backend:
                          serviceName: web
            "#,
        );

        let migrated = StructuralTransform::IngressNetworkingV1.apply(doc);
        let path = first_path(&migrated);

        assert_eq!(
            path["backend"]["service"]["port"]["number"].as_u64().unwrap(),
            80
        );
    }

    #[test]
    fn test_path_type_added_when_absent() {
        let doc = ingress_with_paths(
            r#"
                      - path: /
                        backend:
                          serviceName: web
            "#,
        );

        let migrated = StructuralTransform::IngressNetworkingV1.apply(doc);
        assert_eq!(
            first_path(&migrated)["pathType"].as_str().unwrap(),
            "Prefix"
        );
    }

    #[test]
    fn test_existing_path_type_preserved() {
        let doc = ingress_with_paths(
            r#"
                      - path: /exact
                        pathType: Exact
                        backend:
                          serviceName: web
            "#,
        );

        let migrated = StructuralTransform::IngressNetworkingV1.apply(doc);
        assert_eq!(first_path(&migrated)["pathType"].as_str().unwrap(), "Exact");
    }

    #[test]
    fn test_new_shape_backend_untouched() {
        let doc = ingress_with_paths(
            r#"
                      - path: /
                        pathType: Prefix
                        backend:
                          service:
                            name: web
                            port:
                              number: 9090
            "#,
        );

        let migrated = StructuralTransform::IngressNetworkingV1.apply(doc.clone());
        assert_eq!(migrated, doc);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let doc = ingress_with_paths(
            r#"
                      - path: /api
                        backend:
                          serviceName: svc
                          servicePort: 8080
            "#,
        );

        let once = StructuralTransform::IngressNetworkingV1.apply(doc);
        let twice = StructuralTransform::IngressNetworkingV1.apply(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_spec_levels_are_skipped() {
        let no_spec: Value = serde_yaml::from_str("kind: Ingress").unwrap();
        let no_http: Value = serde_yaml::from_str(
            r#"
            spec:
              rules:
                - host: example.com
            "#,
        )
        .unwrap();

        assert_eq!(
            StructuralTransform::IngressNetworkingV1.apply(no_spec.clone()),
            no_spec
        );
        assert_eq!(
            StructuralTransform::IngressNetworkingV1.apply(no_http.clone()),
            no_http
        );
    }
}
