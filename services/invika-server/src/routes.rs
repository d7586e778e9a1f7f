//! HTTP routes: voice UI page, health, WebSocket upgrade

use std::sync::Arc;

use axum::{
    extract::State,
    http::Method,
    response::{Html, Json},
    routing::get,
    Router,
};
use invika_intent::TurnDispatcher;
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::ws::ws_handler;

/// Shared, read-only application state
pub struct AppState {
    pub dispatcher: TurnDispatcher,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    configured: bool,
    models: Vec<String>,
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        )
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let resolver = state.dispatcher.resolver();
    Json(HealthResponse {
        status: "ok",
        configured: resolver.is_configured(),
        models: resolver.models().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{body::Body, http::Request, http::StatusCode};
    use futures::{SinkExt, StreamExt};
    use invika_intent::{ReplyIntent, ResponseResolver, MISSING_CREDENTIAL_TEXT};
    use invika_llm::{GenerateRequest, GenerateResponse, LLMProvider};
    use serde_json::Value;
    use tokio_tungstenite::tungstenite::Message as WsMessage;
    use tower::ServiceExt;

    use super::*;

    /// Answers with a chat object quoting the utterance back.
    struct EchoUpstream;

    #[async_trait]
    impl LLMProvider for EchoUpstream {
        fn name(&self) -> &'static str {
            "Echo"
        }

        async fn generate(&self, request: GenerateRequest) -> invika_llm::Result<GenerateResponse> {
            let utterance = request.prompt.rsplit("User: ").next().unwrap_or_default();
            let body = serde_json::json!({"type": "chat", "text": format!("echo: {}", utterance)});
            Ok(GenerateResponse::new(request.model, body.to_string()))
        }
    }

    /// Never answers; flags when its in-flight call is dropped.
    struct HangingUpstream {
        abandoned: Arc<AtomicBool>,
    }

    struct SetOnDrop(Arc<AtomicBool>);

    impl Drop for SetOnDrop {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl LLMProvider for HangingUpstream {
        fn name(&self) -> &'static str {
            "Hanging"
        }

        async fn generate(&self, request: GenerateRequest) -> invika_llm::Result<GenerateResponse> {
            let _guard = SetOnDrop(self.abandoned.clone());
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(GenerateResponse::new(request.model, "too late"))
        }
    }

    fn app(resolver: ResponseResolver) -> Router {
        build_router(Arc::new(AppState {
            dispatcher: TurnDispatcher::new(Arc::new(resolver)),
        }))
    }

    async fn spawn_app(resolver: ResponseResolver) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = app(resolver);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    async fn next_reply<S>(stream: &mut S) -> ReplyIntent
    where
        S: futures::Stream<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        match stream.next().await.unwrap().unwrap() {
            WsMessage::Text(body) => serde_json::from_str(&body).unwrap(),
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_index_serves_voice_page() {
        let response = app(ResponseResolver::unconfigured())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("/ws"));
    }

    #[tokio::test]
    async fn test_health_reports_configuration() {
        let response = app(ResponseResolver::unconfigured())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["configured"], false);
    }

    #[tokio::test]
    async fn test_websocket_turns_are_ordered_and_skip_empty() {
        let resolver =
            ResponseResolver::with_provider(Arc::new(EchoUpstream), vec!["echo".to_string()]);
        let addr = spawn_app(resolver).await;

        let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
            .await
            .unwrap();

        for frame in [
            r#"{"text": "   "}"#,
            "not json",
            r#"{"text": "one"}"#,
            r#"{"text": "two"}"#,
        ] {
            socket.send(WsMessage::Text(frame.to_string())).await.unwrap();
        }

        assert_eq!(next_reply(&mut socket).await.text, "echo: one");
        assert_eq!(next_reply(&mut socket).await.text, "echo: two");
    }

    #[tokio::test]
    async fn test_websocket_without_credential() {
        let addr = spawn_app(ResponseResolver::unconfigured()).await;

        let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
            .await
            .unwrap();
        socket
            .send(WsMessage::Text(r#"{"text": "hello"}"#.to_string()))
            .await
            .unwrap();

        let reply = next_reply(&mut socket).await;
        assert_eq!(reply, ReplyIntent::chat(MISSING_CREDENTIAL_TEXT));
    }

    #[tokio::test]
    async fn test_disconnect_abandons_turn_in_flight() {
        let abandoned = Arc::new(AtomicBool::new(false));
        let upstream = HangingUpstream {
            abandoned: abandoned.clone(),
        };
        let resolver =
            ResponseResolver::with_provider(Arc::new(upstream), vec!["hang".to_string()]);
        let addr = spawn_app(resolver).await;

        let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
            .await
            .unwrap();
        socket
            .send(WsMessage::Text(r#"{"text": "hello"}"#.to_string()))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!abandoned.load(Ordering::SeqCst));

        socket.close(None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(abandoned.load(Ordering::SeqCst));
    }
}
