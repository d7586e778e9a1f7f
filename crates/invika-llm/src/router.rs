//! Model Router - Ordered fallback across model identifiers

use std::sync::Arc;

use crate::providers::*;
use crate::types::*;

/// Result of a single attempt against one model identifier
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The upstream call returned text
    Success(GenerateResponse),
    /// The attempt failed; the next identifier may be tried
    Retryable(LLMError),
}

impl From<Result<GenerateResponse>> for AttemptOutcome {
    fn from(result: Result<GenerateResponse>) -> Self {
        match result {
            Ok(response) => Self::Success(response),
            Err(e) => Self::Retryable(e),
        }
    }
}

/// Result of walking the whole fallback chain
#[derive(Debug)]
pub enum RouteOutcome {
    /// First identifier that produced text
    Success {
        model: String,
        response: GenerateResponse,
    },
    /// Every identifier failed, in order
    Exhausted { failures: Vec<(String, LLMError)> },
}

/// The Model Router tries model identifiers in priority order against one provider
pub struct ModelRouter {
    provider: Arc<dyn LLMProvider>,
    models: Vec<String>,
}

impl ModelRouter {
    /// Create a router over a provider and an ordered model list
    pub fn new(provider: Arc<dyn LLMProvider>, models: Vec<String>) -> Self {
        Self { provider, models }
    }

    /// Model identifiers in the order they are tried
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Run one attempt against a single model identifier
    pub async fn attempt(&self, model: &str, prompt: &str) -> AttemptOutcome {
        self.provider
            .generate(GenerateRequest::new(model, prompt))
            .await
            .into()
    }

    /// Try each model in order, stopping at the first one that returns text
    pub async fn complete_with_fallback(&self, prompt: &str) -> RouteOutcome {
        let mut failures = Vec::new();

        for model in &self.models {
            match self.attempt(model, prompt).await {
                AttemptOutcome::Success(response) => {
                    tracing::debug!(
                        provider = self.provider.name(),
                        model = %model,
                        "Upstream model responded"
                    );
                    return RouteOutcome::Success {
                        model: model.clone(),
                        response,
                    };
                }
                AttemptOutcome::Retryable(e) => {
                    tracing::warn!(
                        provider = self.provider.name(),
                        model = %model,
                        error = %e,
                        "Upstream model failed, trying next"
                    );
                    failures.push((model.clone(), e));
                }
            }
        }

        RouteOutcome::Exhausted { failures }
    }
}
