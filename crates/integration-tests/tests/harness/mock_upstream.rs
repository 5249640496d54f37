//! Mock inference backend for integration tests
//!
//! Accepts `POST <base>/<model-id>` and answers with a scripted reply

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// What the mock answers with
#[derive(Debug, Clone)]
pub enum Reply {
    /// JSON body with the given status
    Json(StatusCode, Value),
    /// Plain text body with the given status
    Text(StatusCode, String),
    /// Wait before answering `200 {}`, for timeout tests
    Stall(Duration),
}

/// One request as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Mock inference backend that returns a fixed reply
pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockUpstreamState>,
}

struct MockUpstreamState {
    request_count: AtomicU32,
    reply: Reply,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockUpstream {
    /// Start a mock that answers `200` with a transcription body
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(Reply::Json(
            StatusCode::OK,
            serde_json::json!({ "text": "hello from the mock" }),
        ))
        .await
    }

    /// Start a mock with a custom reply
    pub async fn start_with(reply: Reply) -> anyhow::Result<Self> {
        let state = Arc::new(MockUpstreamState {
            request_count: AtomicU32::new(0),
            reply,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .fallback(handle_inference)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as the inference endpoint
    pub fn base_url(&self) -> String {
        format!("http://{}/models", self.addr)
    }

    /// Number of requests received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.requests.lock().unwrap().last().cloned()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_inference(
    State(state): State<Arc<MockUpstreamState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        path: uri.path().to_owned(),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body: body.to_vec(),
    });

    match &state.reply {
        Reply::Json(status, value) => (*status, Json(value.clone())).into_response(),
        Reply::Text(status, text) => (*status, text.clone()).into_response(),
        Reply::Stall(delay) => {
            tokio::time::sleep(*delay).await;
            Json(serde_json::json!({})).into_response()
        }
    }
}
