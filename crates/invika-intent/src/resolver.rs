//! Response Resolver - utterance to [`ReplyIntent`] via the model fallback chain

use std::sync::Arc;
use std::time::Duration;

use invika_llm::{
    GeminiConfig, GeminiProvider, LLMProvider, ModelRouter, RouteOutcome, DEFAULT_TIMEOUT,
    GEMINI_BASE_URL,
};

use crate::parse::interpret;
use crate::prompt::build_prompt;
use crate::reply::ReplyIntent;

/// Model identifiers tried in order, most capable first
pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-flash-lite",
    "gemini-1.5-flash",
];

/// Immutable resolver settings, built once at startup
#[derive(Clone)]
pub struct ResolverConfig {
    /// Upstream credential; `None` puts the resolver in degraded mode
    pub api_key: Option<String>,
    /// Model identifiers in priority order
    pub models: Vec<String>,
    /// Upstream base URL
    pub base_url: String,
    /// Per-attempt timeout
    pub timeout: Duration,
}

impl ResolverConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            base_url: GEMINI_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for ResolverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("models", &self.models)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Converts free text into a [`ReplyIntent`], never failing
pub struct ResponseResolver {
    router: Option<ModelRouter>,
}

impl ResponseResolver {
    /// Build a Gemini-backed resolver, or a degraded one when no credential is set
    pub fn new(config: ResolverConfig) -> Self {
        let Some(api_key) = config.api_key else {
            tracing::warn!(
                "No API key configured, every turn will return the configuration notice"
            );
            return Self::unconfigured();
        };

        let provider = GeminiProvider::new(
            GeminiConfig::new(api_key)
                .with_base_url(config.base_url)
                .with_timeout(config.timeout),
        );

        Self::with_provider(Arc::new(provider), config.models)
    }

    /// Resolver over any provider, used to substitute upstreams in tests
    pub fn with_provider(provider: Arc<dyn LLMProvider>, models: Vec<String>) -> Self {
        Self {
            router: Some(ModelRouter::new(provider, models)),
        }
    }

    /// Resolver without a credential
    pub fn unconfigured() -> Self {
        Self { router: None }
    }

    pub fn is_configured(&self) -> bool {
        self.router.is_some()
    }

    /// Model identifiers in the order they are tried
    pub fn models(&self) -> &[String] {
        self.router.as_ref().map(ModelRouter::models).unwrap_or_default()
    }

    /// Resolve one utterance.
    ///
    /// The first model that returns text ends the turn, whether or not that
    /// text parses as a structured reply.
    pub async fn resolve(&self, utterance: &str) -> ReplyIntent {
        let Some(router) = &self.router else {
            return ReplyIntent::missing_credential();
        };

        match router.complete_with_fallback(&build_prompt(utterance)).await {
            RouteOutcome::Success { model, response } => {
                let reply = interpret(&response.content);
                tracing::info!(
                    model = %model,
                    kind = ?reply.kind,
                    suggestions = reply.suggestions.len(),
                    "Turn resolved"
                );
                reply
            }
            RouteOutcome::Exhausted { failures } => {
                tracing::error!(attempts = failures.len(), "All upstream models failed");
                ReplyIntent::busy()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::MISSING_CREDENTIAL_TEXT;

    #[test]
    fn test_config_defaults() {
        let config = ResolverConfig::new(Some("key".to_string()));
        assert_eq!(config.models, DEFAULT_MODELS);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(!format!("{:?}", config).contains("\"key\""));
    }

    #[test]
    fn test_blank_key_is_absent() {
        assert!(ResolverConfig::new(Some("   ".to_string())).api_key.is_none());
        assert!(!ResponseResolver::new(ResolverConfig::new(Some(String::new()))).is_configured());
    }

    #[tokio::test]
    async fn test_unconfigured_resolves_to_notice() {
        let resolver = ResponseResolver::new(ResolverConfig::default());
        assert!(!resolver.is_configured());
        assert!(resolver.models().is_empty());

        let reply = resolver.resolve("hello").await;
        assert_eq!(reply, ReplyIntent::chat(MISSING_CREDENTIAL_TEXT));
    }
}
