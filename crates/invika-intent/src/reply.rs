//! Structured reply sent back to the browser for each turn

use serde::{Deserialize, Serialize};

/// Spoken when no credential is configured
pub const MISSING_CREDENTIAL_TEXT: &str = "Error: API Key missing.";

/// Spoken when every model identifier failed
pub const BUSY_TEXT: &str = "Systems busy. Please try again.";

/// What the browser should do with a reply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentKind {
    /// Speak the text
    #[default]
    Chat,
    /// Speak the text and open `url`
    Open,
}

/// A link offered alongside the reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub url: String,
}

impl Suggestion {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Fully validated reply for one utterance.
///
/// Wire shape: `{"type", "text", "url"?, "name"?, "suggestions"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyIntent {
    #[serde(rename = "type")]
    pub kind: IntentKind,
    pub text: String,
    #[serde(rename = "url", default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

impl ReplyIntent {
    pub fn chat(text: impl Into<String>) -> Self {
        Self {
            kind: IntentKind::Chat,
            text: text.into(),
            target: None,
            label: None,
            suggestions: vec![],
        }
    }

    pub fn open(text: impl Into<String>, target: impl Into<String>, label: Option<String>) -> Self {
        Self {
            kind: IntentKind::Open,
            text: text.into(),
            target: Some(target.into()),
            label,
            suggestions: vec![],
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<Suggestion>) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// Degraded reply used when no credential is configured
    pub fn missing_credential() -> Self {
        Self::chat(MISSING_CREDENTIAL_TEXT)
    }

    /// Degraded reply used when the fallback chain is exhausted
    pub fn busy() -> Self {
        Self::chat(BUSY_TEXT)
    }
}
