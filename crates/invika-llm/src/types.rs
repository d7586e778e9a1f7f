//! Common types for upstream model calls

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while calling an upstream model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LLMError {
    #[error("Request failed: HTTP {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Request timed out after {after:?}")]
    Timeout { after: Duration },
}

impl LLMError {
    /// Build a transport error from a reqwest failure.
    ///
    /// The request URL is dropped because it carries the credential.
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return Self::Timeout { after: timeout };
        }
        Self::NetworkError {
            message: err.without_url().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LLMError>;

/// A single generation request against one model identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (provider-specific)
    pub model: String,
    /// Full prompt text, instruction included
    pub prompt: String,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Text produced by a successful upstream call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated text, exactly as returned
    pub content: String,
    /// Which model produced it
    pub model: String,
    /// Token usage, when the provider reports it
    #[serde(default)]
    pub usage: TokenUsage,
}

impl GenerateResponse {
    pub fn new(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            usage: TokenUsage::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_new() {
        let request = GenerateRequest::new("gemini-2.5-flash", "hi");
        assert_eq!(request.model, "gemini-2.5-flash");
        assert_eq!(request.prompt, "hi");
    }

    #[test]
    fn test_error_display() {
        let err = LLMError::RequestFailed {
            status: 429,
            message: "quota".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed: HTTP 429: quota");
        assert_eq!(
            LLMError::Timeout {
                after: Duration::from_millis(300)
            }
            .to_string(),
            "Request timed out after 300ms"
        );
    }
}
