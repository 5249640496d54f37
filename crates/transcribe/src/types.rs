use jiff::Timestamp;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Successful transcription response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionResult {
    /// Always `true`; failures use the error body instead
    pub success: bool,
    /// Provider response, passed through untouched
    pub transcription: Value,
    pub metadata: TranscriptionMetadata,
}

/// Details about the processed upload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionMetadata {
    /// Canonical model identifier used upstream
    pub model: String,
    /// Filename as sent by the client
    pub filename: String,
    /// Upload size in bytes
    pub size: u64,
    /// Media type sent upstream
    pub content_type: String,
    /// When the transcription completed
    pub timestamp: Timestamp,
}

/// One entry of the model listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Caller facing key, passed as `?model=`
    pub key: String,
    /// Canonical model identifier
    pub name: String,
    pub description: String,
}

/// Model listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

/// Outbound request handed to a provider
pub struct UpstreamRequest {
    /// Canonical model identifier
    pub model: String,
    /// Raw audio bytes
    pub audio: Vec<u8>,
    /// Media type of `audio`
    pub content_type: String,
    /// Bearer token for the provider
    pub api_token: SecretString,
}
