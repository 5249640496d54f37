use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use scribe_core::{ErrorBody, HttpError};
use serde_json::Value;
use thiserror::Error;

use crate::outcome::UpstreamOutcome;

pub type Result<T> = std::result::Result<T, RelayError>;

/// Seconds a caller should wait while the upstream model warms up
pub const MODEL_LOADING_RETRY_AFTER_SECS: u64 = 20;

/// Every way a transcription request can fail
#[derive(Debug, Error)]
pub enum RelayError {
    /// The request carried no file in the upload field
    #[error("no file uploaded")]
    NoFile,

    /// A file part failed the audio filter
    #[error("file '{0}' is not an audio file")]
    InvalidFileType(String),

    /// An audio file arrived under a field other than the upload field
    #[error("unexpected file field '{found}', expected '{expected}'")]
    UnexpectedField { found: String, expected: String },

    /// More than one file in the upload field
    #[error("more than one file in field '{0}'")]
    TooManyFiles(String),

    /// Upload exceeded the configured size
    #[error("upload exceeds {limit} bytes")]
    FileTooLarge { limit: u64 },

    /// Multipart body could not be parsed
    #[error("malformed upload: {0}")]
    MalformedUpload(String),

    /// No upstream credential configured
    #[error("upstream API token is not configured")]
    MissingCredential,

    /// Server configuration unusable at startup
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Upstream rejected the credential (401)
    #[error("upstream rejected the API token")]
    AuthenticationFailed,

    /// Upstream throttled the request (429)
    #[error("upstream rate limit exceeded")]
    RateLimited,

    /// Upstream model is still loading (503)
    #[error("upstream model is loading")]
    ModelLoading,

    /// Any other upstream failure status
    #[error("upstream returned {status}: {detail}")]
    TranscriptionFailed { status: u16, detail: String },

    /// No upstream response within the timeout
    #[error("upstream request timed out")]
    Timeout,

    /// Local failure such as an unreadable temp file
    #[error("internal error: {0}")]
    Internal(String),
}

impl UpstreamOutcome {
    /// The provider's body on success, otherwise the matching caller facing error
    pub fn into_result(self) -> Result<Value> {
        match self {
            Self::Success(body) => Ok(body),
            Self::AuthFailed => Err(RelayError::AuthenticationFailed),
            Self::RateLimited => Err(RelayError::RateLimited),
            Self::Loading => Err(RelayError::ModelLoading),
            Self::OtherFailure { status, detail } => Err(RelayError::TranscriptionFailed {
                status,
                detail: detail.unwrap_or_else(|| format!("Upstream request failed with status {status}")),
            }),
        }
    }
}

impl RelayError {
    /// Retry hint in seconds, only set while the model is loading
    pub const fn retry_after(&self) -> Option<u64> {
        match self {
            Self::ModelLoading => Some(MODEL_LOADING_RETRY_AFTER_SECS),
            _ => None,
        }
    }

    /// Auxiliary status reported in the body, the upstream status for generic failures
    pub const fn reported_status(&self) -> Option<u16> {
        match self {
            Self::TranscriptionFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn log(&self) {
        match self {
            Self::NoFile
            | Self::InvalidFileType(_)
            | Self::UnexpectedField { .. }
            | Self::TooManyFiles(_)
            | Self::FileTooLarge { .. }
            | Self::MalformedUpload(_) => tracing::debug!(error = %self, "rejected upload"),
            Self::MissingCredential | Self::Configuration(_) => {
                tracing::error!(error = %self, "server misconfigured");
            }
            Self::AuthenticationFailed
            | Self::RateLimited
            | Self::ModelLoading
            | Self::TranscriptionFailed { .. }
            | Self::Timeout => tracing::warn!(error = %self, "upstream transcription failed"),
            Self::Internal(_) => tracing::error!(error = %self, "transcription failed locally"),
        }
    }
}

impl HttpError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NoFile
            | Self::InvalidFileType(_)
            | Self::UnexpectedField { .. }
            | Self::TooManyFiles(_)
            | Self::MalformedUpload(_) => StatusCode::BAD_REQUEST,
            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::ModelLoading => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::MissingCredential
            | Self::Configuration(_)
            | Self::AuthenticationFailed
            | Self::TranscriptionFailed { .. }
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_label(&self) -> &str {
        match self {
            Self::NoFile => "No file uploaded",
            Self::InvalidFileType(_) => "Invalid file type",
            Self::UnexpectedField { .. } => "Unexpected field",
            Self::TooManyFiles(_) => "Too many files",
            Self::FileTooLarge { .. } => "File too large",
            Self::MalformedUpload(_) => "Invalid upload",
            Self::MissingCredential | Self::Configuration(_) => "Server configuration error",
            Self::AuthenticationFailed => "Authentication failed",
            Self::RateLimited => "Rate limit exceeded",
            Self::ModelLoading => "Model loading",
            Self::TranscriptionFailed { .. } => "Transcription failed",
            Self::Timeout => "Request timeout",
            Self::Internal(_) => "Internal server error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::NoFile => "Please upload an audio file".to_string(),
            Self::InvalidFileType(_) => "Only audio files are allowed".to_string(),
            Self::UnexpectedField { expected, .. } => format!("Audio must be uploaded in the '{expected}' field"),
            Self::TooManyFiles(_) => "Only one file may be uploaded per request".to_string(),
            Self::FileTooLarge { limit } => format!("Maximum upload size is {} MB", limit / (1 << 20)),
            Self::MalformedUpload(detail) | Self::Internal(detail) | Self::TranscriptionFailed { detail, .. } => {
                detail.clone()
            }
            Self::MissingCredential => "Upstream API token is not configured".to_string(),
            Self::Configuration(detail) => detail.clone(),
            Self::AuthenticationFailed => "The transcription service rejected the server's API token".to_string(),
            Self::RateLimited => "Too many requests. Please try again later.".to_string(),
            Self::ModelLoading => format!(
                "The model is currently loading. Please try again in {MODEL_LOADING_RETRY_AFTER_SECS} seconds."
            ),
            Self::Timeout => "The transcription request took too long to complete".to_string(),
        }
    }

    fn to_body(&self) -> ErrorBody {
        let mut body = ErrorBody::new(self.error_label(), self.client_message());

        if let Some(status) = self.reported_status() {
            body = body.with_status(status);
        }

        if let Some(seconds) = self.retry_after() {
            body = body.with_retry_after(seconds);
        }

        body
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        self.log();

        let mut response = (self.status_code(), Json(self.to_body())).into_response();

        if let Some(seconds) = self.retry_after() {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(seconds));
        }

        response
    }
}
