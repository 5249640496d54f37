#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod error;
mod http_client;
pub mod media;
mod models;
mod outcome;
mod provider;
mod request;
mod server;
mod types;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
};

pub use error::{MODEL_LOADING_RETRY_AFTER_SECS, RelayError, Result};
pub use models::{ModelCatalog, UNKNOWN_MODEL_DESCRIPTION};
pub use outcome::UpstreamOutcome;
pub use provider::TranscriptionProvider;
pub use request::{ExtractUpload, FORM_OVERHEAD_BYTES, UploadForm, UploadedFile};
pub use server::{Server, TranscribeServerBuilder};
pub use types::{ModelInfo, ModelsResponse, TranscriptionMetadata, TranscriptionResult, UpstreamRequest};

/// Build the transcription relay from configuration
///
/// # Errors
///
/// Returns an error if the model table or HTTP client cannot be set up
pub fn build_server(config: &scribe_config::Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        TranscribeServerBuilder::new(config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize transcription relay: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for transcription and model listing
///
/// The upload route accepts bodies up to the configured file limit plus
/// room for the multipart framing.
pub fn endpoint_router(server: &Server) -> Router<Arc<Server>> {
    Router::new()
        .route(
            "/api/transcribe",
            post(transcribe).layer(DefaultBodyLimit::max(server.body_limit())),
        )
        .route("/api/models", get(list_models))
}

/// Handle transcription uploads
async fn transcribe(
    State(server): State<Arc<Server>>,
    ExtractUpload(form): ExtractUpload,
) -> Result<Json<TranscriptionResult>> {
    tracing::debug!(
        filename = %form.file.filename(),
        model = ?form.model,
        "transcription handler called"
    );

    let response = server.transcribe(form.file, form.model.as_deref()).await?;

    Ok(Json(response))
}

/// List the selectable models
async fn list_models(State(server): State<Arc<Server>>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: server.catalog().list(),
    })
}
