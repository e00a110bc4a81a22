//! Test utilities for fintrack-core
//!
//! This module provides a mock OpenAI-compatible server that counts requests
//! and can be scripted to succeed, fail, or stall.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// How the mock server answers chat completion requests
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with this assistant message
    Text(String),
    /// Error status with a JSON error body
    Status(u16),
    /// 200 with a body that is not a chat completion
    Malformed,
    /// 200 with an empty `choices` array
    Empty,
    /// Wait, then answer with text
    Delayed(Duration, String),
}

#[derive(Clone)]
struct ServerState {
    reply: MockReply,
    hits: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<Value>>>,
    last_authorization: Arc<Mutex<Option<String>>>,
}

/// Mock OpenAI-compatible server for tests
pub struct MockOpenAIServer {
    addr: SocketAddr,
    state: ServerState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOpenAIServer {
    /// Start the mock server on an available port
    pub async fn start(reply: MockReply) -> Self {
        let state = ServerState {
            reply,
            hits: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
            last_authorization: Arc::new(Mutex::new(None)),
        };

        let app = Router::new()
            .route("/v1/chat/completions", post(handle_chat_completion))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of chat completion requests received
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// JSON body of the most recent request
    pub fn last_request(&self) -> Option<Value> {
        self.state.last_request.lock().unwrap().clone()
    }

    /// Authorization header of the most recent request
    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOpenAIServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_chat_completion(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_authorization.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let model = request["model"].as_str().unwrap_or("mock").to_string();
    *state.last_request.lock().unwrap() = Some(request);

    match state.reply {
        MockReply::Text(text) => Json(completion(&model, &text)).into_response(),
        MockReply::Status(code) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(json!({"error": {"message": "mock error", "code": code}})),
            )
                .into_response()
        }
        MockReply::Malformed => Json(json!({"unexpected": true})).into_response(),
        MockReply::Empty => Json(json!({"id": "mock", "choices": []})).into_response(),
        MockReply::Delayed(delay, text) => {
            tokio::time::sleep(delay).await;
            Json(completion(&model, &text)).into_response()
        }
    }
}

fn completion(model: &str, text: &str) -> Value {
    json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }]
    })
}
