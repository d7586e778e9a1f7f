//! Invika Server
//!
//! Voice assistant backend. The browser page served at `/` listens for the
//! wake word, transcribes speech, and sends each utterance over `/ws`; every
//! utterance is resolved through the configured Gemini models and answered
//! with one structured reply.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (reads GEMINI_API_KEY or GOOGLE_API_KEY)
//! invika-server
//!
//! # Start with a config file
//! invika-server --config /path/to/config.toml
//!
//! # Start with environment overrides
//! INVIKA__SERVER__PORT=8080 INVIKA__LLM__MODELS=gemini-2.5-flash,gemini-1.5-flash invika-server
//! ```

mod config;
mod routes;
mod ws;

use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use invika_intent::{ResponseResolver, TurnDispatcher};

use crate::config::{LoggingConfig, ServerConfig};
use crate::routes::{build_router, AppState};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Invika Server - voice assistant turns over WebSocket
#[derive(Parser, Debug)]
#[command(name = "invika-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "INVIKA_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "INVIKA_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "INVIKA_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "INVIKA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "INVIKA_LOG_FORMAT")]
    log_format: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Google API key, used when no Gemini key is set
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    google_api_key: Option<String>,
}

impl Args {
    fn api_key(&self) -> Option<String> {
        [&self.gemini_api_key, &self.google_api_key]
            .into_iter()
            .flatten()
            .find(|k| !k.trim().is_empty())
            .cloned()
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap reads env-backed arguments
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;

    // Override with CLI arguments
    if let Some(host) = args.host.clone() {
        server_config.server.host = host;
    }
    if let Some(port) = args.port {
        server_config.server.port = port;
    }
    if let Some(level) = args.log_level.clone() {
        server_config.logging.level = level;
    }
    if let Some(format) = args.log_format.clone() {
        server_config.logging.format = format;
    }

    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Invika server"
    );

    // The credential is read exactly once, here.
    let resolver = ResponseResolver::new(server_config.llm.resolver_config(args.api_key()));
    tracing::info!(
        configured = resolver.is_configured(),
        models = ?resolver.models(),
        timeout_secs = server_config.llm.timeout_secs,
        "Resolver ready"
    );

    let state = Arc::new(AppState {
        dispatcher: TurnDispatcher::new(Arc::new(resolver)),
    });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((
        server_config.server.host.as_str(),
        server_config.server.port,
    ))
    .await?;

    tracing::info!(addr = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => subscriber
            .with(fmt::layer().json().with_target(true))
            .try_init()?,
        _ => subscriber
            .with(fmt::layer().pretty().with_target(true))
            .try_init()?,
    }

    Ok(())
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
