//! Invika LLM - Upstream Generative-Language Access
//!
//! This crate hides the external model API behind a small provider trait:
//!
//! ## Providers
//! - Google Gemini (`generateContent`), credential passed as the `key` query parameter
//!
//! ## Routing
//! A [`ModelRouter`] owns one provider and an ordered list of model
//! identifiers. Each attempt is classified as [`AttemptOutcome::Success`] or
//! [`AttemptOutcome::Retryable`]; the chain stops at the first success and
//! reports [`RouteOutcome::Exhausted`] when every identifier has failed.
//!
//! ## Key Design Principles
//!
//! 1. Upstream failures are values, never panics
//! 2. The credential never appears in errors or logs
//! 3. Every attempt carries its own timeout

pub mod providers;
pub mod router;
pub mod types;

pub use providers::*;
pub use router::*;
pub use types::*;
