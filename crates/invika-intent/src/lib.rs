//! Invika Intent - Utterance to Structured Reply
//!
//! Every user turn ends in a [`ReplyIntent`]: either content produced by an
//! upstream model and normalised by [`interpret`], or a degraded reply when no
//! credential is configured or every model identifier failed.
//!
//! ```text
//! utterance → TurnDispatcher → ResponseResolver → ModelRouter → interpret → ReplyIntent
//! ```

pub mod dispatcher;
pub mod parse;
pub mod prompt;
pub mod reply;
pub mod resolver;

pub use dispatcher::*;
pub use parse::*;
pub use prompt::*;
pub use reply::*;
pub use resolver::*;
