//! Server Configuration
//!
//! Layered configuration for the Invika server: optional config files, then
//! `INVIKA__SECTION__KEY` environment variables, then CLI overrides applied in
//! `main`. The upstream credential is deliberately not part of this struct; it
//! is read once from the environment and handed straight to the resolver.

use std::time::Duration;

use invika_intent::{ResolverConfig, DEFAULT_MODELS};
use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server binding configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Upstream model configuration
    #[serde(default)]
    pub llm: LlmSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Upstream model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Model identifiers, tried in order
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    /// Upstream REST base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            models: default_models(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl LlmSettings {
    /// Get the per-attempt timeout duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Freeze these settings plus the credential into resolver configuration
    pub fn resolver_config(&self, api_key: Option<String>) -> ResolverConfig {
        ResolverConfig::new(api_key)
            .with_models(self.models.clone())
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// =============================================================================
// Default Functions
// =============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_models() -> Vec<String> {
    DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
}

fn default_base_url() -> String {
    invika_intent::ResolverConfig::default().base_url
}

fn default_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl ServerConfig {
    /// Load configuration from optional config files and the environment
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();

        // Add config file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        // Add default config locations
        builder = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        // Add environment variables with INVIKA_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("INVIKA")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("llm.models")
                .try_parsing(true),
        );

        let server_config: ServerConfig = builder.build()?.try_deserialize()?;
        Ok(server_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.models, DEFAULT_MODELS);
        assert_eq!(config.llm.timeout(), Duration::from_secs(10));
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ServerConfig =
            serde_json::from_str(r#"{"llm": {"models": ["only-model"]}}"#).unwrap();
        assert_eq!(config.llm.models, vec!["only-model"]);
        assert_eq!(config.llm.timeout_secs, 10);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_resolver_config_carries_settings() {
        let settings = LlmSettings {
            models: vec!["a".to_string(), "b".to_string()],
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 3,
        };
        let resolver = settings.resolver_config(Some("k".to_string()));
        assert_eq!(resolver.models, vec!["a", "b"]);
        assert_eq!(resolver.base_url, "http://127.0.0.1:9");
        assert_eq!(resolver.timeout, Duration::from_secs(3));
        assert_eq!(resolver.api_key.as_deref(), Some("k"));
    }
}
