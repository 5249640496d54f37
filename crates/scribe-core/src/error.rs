use http::StatusCode;
use serde::Serialize;

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by each feature crate's error type. The server layer and
/// the feature crates render these through [`ErrorBody`], keeping every
/// failure in the same JSON shape.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Short human readable label (e.g. `Rate limit exceeded`)
    fn error_label(&self) -> &str;

    /// Detail message safe to expose to API consumers
    fn client_message(&self) -> String;

    /// Render the error as the uniform response body
    fn to_body(&self) -> ErrorBody {
        ErrorBody::new(self.error_label(), self.client_message())
    }
}

/// Error body returned by every failing endpoint
///
/// Serialized as `{error, details, status?, retryAfter?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
            status: None,
            retry_after: None,
        }
    }

    /// Attach an auxiliary status code, such as the one returned upstream
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach a retry hint in seconds
    #[must_use]
    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }
}
