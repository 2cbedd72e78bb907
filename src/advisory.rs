use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use thiserror::Error;

/// One deprecated-API finding as reported by an external detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeprecationFinding {
    pub kind: String,
    pub api_version: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u64>,
}

/// Generates free-text remediation guidance from detector findings. The
/// migration engine works without any provider; this is an enrichment only.
pub trait AdvisoryProvider {
    fn advise(&self, findings: &[DeprecationFinding]) -> Result<String, AdvisoryError>;
}

pub const NO_FINDINGS_ADVICE: &str =
    "No deprecated Kubernetes APIs found. Your manifests are up to date.";

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("findings are not well-formed JSON: {0}")]
    InvalidFindings(#[from] serde_json::Error),

    #[error("generated manifest content is not well-formed YAML: {0}")]
    InvalidYaml(#[source] serde_yaml::Error),

    #[error("advisory provider unavailable: {0}")]
    ProviderUnavailable(String),
}

#[derive(Deserialize)]
struct FindingsEnvelope {
    items: Vec<DeprecationFinding>,
}

/// Parse detector output. Detectors emit either a bare JSON array of findings
/// or an `{"items": [...]}` envelope; both are accepted.
pub fn parse_findings(raw: &str) -> Result<Vec<DeprecationFinding>, AdvisoryError> {
    if let Ok(findings) = serde_json::from_str::<Vec<DeprecationFinding>>(raw) {
        return Ok(findings);
    }
    let envelope: FindingsEnvelope = serde_json::from_str(raw)?;
    Ok(envelope.items)
}

/// Gate for externally generated manifest text (for example an advisory
/// provider proposing a rewritten stream): every document must parse as YAML.
/// On failure the caller keeps the original content instead of emitting
/// invalid output.
pub fn validate_generated_stream(candidate: &str) -> Result<(), AdvisoryError> {
    for de in serde_yaml::Deserializer::from_str(candidate) {
        Value::deserialize(de).map_err(AdvisoryError::InvalidYaml)?;
    }
    Ok(())
}

/// Accept a generated rewrite only if it survives validation.
pub fn accept_or_fallback<'a>(original: &'a str, candidate: &'a str) -> &'a str {
    match validate_generated_stream(candidate) {
        Ok(()) => candidate,
        Err(err) => {
            tracing::warn!(error = %err, "generated output rejected, keeping original");
            original
        }
    }
}
