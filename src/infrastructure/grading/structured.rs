//! Parsing of structured grader replies

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use tracing::warn;

use crate::domain::DomainError;

/// Extract the outermost JSON object from a reply (handles prose and code fences)
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Parse a grader reply into `T` without logging, `None` when malformed
pub fn decode<T: DeserializeOwned>(reply: &str) -> Option<T> {
    extract_json(reply).and_then(|json| serde_json::from_str(json).ok())
}

/// Parse a grader reply into `T`, failing on anything malformed
pub fn parse_structured<T: DeserializeOwned>(grader: &str, reply: &str) -> Result<T, DomainError> {
    let json = extract_json(reply).ok_or_else(|| {
        warn!(grader = %grader, reply = %reply, "Grader reply contains no JSON object");
        DomainError::validation(format!("{} returned no JSON object", grader))
    })?;

    serde_json::from_str(json).map_err(|e| {
        warn!(grader = %grader, reply = %reply, error = %e, "Malformed grader reply");
        DomainError::validation(format!("{} returned malformed output: {}", grader, e))
    })
}

/// Accept `true`/`false` or the strings `"yes"`/`"no"` (any case)
pub(crate) fn binary_score<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Bool(value) => Ok(value),
        Raw::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" => Ok(true),
            "no" | "false" => Ok(false),
            other => Err(de::Error::custom(format!(
                "expected yes/no, got '{}'",
                other
            ))),
        },
    }
}
