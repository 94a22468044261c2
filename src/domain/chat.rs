//! Caller-owned conversation history

use serde::{Deserialize, Serialize};

/// One prior turn of the conversation
///
/// Both fields are optional because history comes from the caller as-is; turns
/// without a recognised role or without content are skipped when rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatTurn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            content: Some(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    /// The speaker label used in rendered history, if the role is recognised
    /// and the turn carries non-empty content
    pub fn speaker(&self) -> Option<&'static str> {
        if self.content.as_deref()?.is_empty() {
            return None;
        }

        match self.role.as_deref()? {
            "user" => Some("User"),
            "assistant" => Some("Assistant"),
            _ => None,
        }
    }
}
