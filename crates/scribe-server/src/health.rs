use axum::Json;
use jiff::Timestamp;
use serde::Serialize;

/// Liveness payload
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: Timestamp,
    pub version: &'static str,
}

/// Health check handler
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Timestamp::now(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
