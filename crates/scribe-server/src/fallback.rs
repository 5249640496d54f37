use axum::{Json, http::Method, http::StatusCode, http::Uri, response::IntoResponse};
use scribe_core::ErrorBody;

/// JSON 404 for routes that match nothing
pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    tracing::debug!(%method, %uri, "no route matched");

    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new("Not found", format!("Route {method} {} not found", uri.path()))),
    )
}
