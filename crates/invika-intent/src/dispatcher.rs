//! Turn Dispatcher - one inbound frame in, at most one reply out

use std::sync::Arc;

use serde::Deserialize;
use tokio::task::JoinHandle;

use crate::reply::ReplyIntent;
use crate::resolver::ResponseResolver;

/// Inbound message from the browser
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub text: String,
}

/// Decode an inbound frame into a trimmed, non-empty utterance
pub fn parse_inbound(frame: &str) -> Option<String> {
    let message: InboundMessage = match serde_json::from_str(frame) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed inbound frame");
            return None;
        }
    };

    let text = message.text.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.to_string())
}

/// Aborts the resolver task when the awaiting turn is dropped.
struct TurnTask(JoinHandle<ReplyIntent>);

impl Drop for TurnTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Stateless bridge between the transport and the resolver
#[derive(Clone)]
pub struct TurnDispatcher {
    resolver: Arc<ResponseResolver>,
}

impl TurnDispatcher {
    pub fn new(resolver: Arc<ResponseResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Arc<ResponseResolver> {
        &self.resolver
    }

    /// Resolve one utterance on its own task.
    ///
    /// A task that panics or is cancelled yields the busy reply, so a bad turn
    /// never reaches the transport as a failure. Dropping the returned future
    /// abandons the upstream call.
    pub async fn dispatch(&self, utterance: &str) -> ReplyIntent {
        let resolver = Arc::clone(&self.resolver);
        let utterance = utterance.to_string();

        let mut task = TurnTask(tokio::spawn(async move {
            resolver.resolve(&utterance).await
        }));

        match (&mut task.0).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, "Resolver task failed");
                ReplyIntent::busy()
            }
        }
    }

    /// Handle one raw inbound frame. `None` means send nothing.
    pub async fn handle_frame(&self, frame: &str) -> Option<ReplyIntent> {
        let utterance = parse_inbound(frame)?;
        tracing::debug!(chars = utterance.chars().count(), "Dispatching turn");
        Some(self.dispatch(&utterance).await)
    }
}
