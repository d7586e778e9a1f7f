//! WebSocket turn loop
//!
//! One task per connection. Turns on a connection are strictly sequential:
//! frames that arrive mid-turn are queued and answered in arrival order. A
//! connection that closes mid-turn abandons the upstream call.

use std::collections::VecDeque;
use std::sync::Arc;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
};
use futures::{stream::SplitStream, SinkExt, StreamExt};
use invika_intent::TurnDispatcher;
use tracing::Instrument;
use uuid::Uuid;

use crate::routes::AppState;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let dispatcher = state.dispatcher.clone();
    ws.on_upgrade(move |socket| {
        let span = tracing::info_span!("connection", id = %Uuid::new_v4());
        handle_socket(socket, dispatcher).instrument(span)
    })
}

async fn handle_socket(socket: WebSocket, dispatcher: TurnDispatcher) {
    tracing::info!("Client connected");
    let (mut sender, mut receiver) = socket.split();
    // Frames that arrive while a turn is in flight, answered in order afterwards.
    let mut queued: VecDeque<String> = VecDeque::new();

    'turns: loop {
        let text = match queued.pop_front() {
            Some(text) => text,
            None => match next_text(&mut receiver).await {
                Some(text) => text,
                None => break,
            },
        };

        let turn = dispatcher.handle_frame(&text);
        tokio::pin!(turn);

        // Keep watching the socket so a disconnect abandons the turn.
        let reply = loop {
            tokio::select! {
                reply = &mut turn => break reply,
                frame = receiver.next() => match frame {
                    Some(Ok(Message::Text(text))) => queued.push_back(text),
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("Client left mid-turn, abandoning upstream call");
                        break 'turns;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "Receive failed mid-turn");
                        break 'turns;
                    }
                },
            }
        };

        let Some(reply) = reply else {
            continue;
        };

        let payload = match serde_json::to_string(&reply) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode reply");
                continue;
            }
        };

        if let Err(e) = sender.send(Message::Text(payload)).await {
            tracing::debug!(error = %e, "Send failed, dropping reply");
            break;
        }
    }

    tracing::info!("Client disconnected");
}

/// Next text frame, or `None` once the connection is closed or broken.
async fn next_text(receiver: &mut SplitStream<WebSocket>) -> Option<String> {
    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => return Some(text),
            Ok(Message::Close(_)) => return None,
            // Pings are answered by axum; binary frames carry no turns.
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(error = %e, "Receive failed");
                return None;
            }
        }
    }
    None
}
