use std::time::Duration;

use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

/// Hosted inference endpoint; the canonical model id is appended as a path segment
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// Upstream request timeout when none is configured
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Model key used when the caller names none or an unknown one
pub const DEFAULT_MODEL_KEY: &str = "standard";

/// Upstream transcription configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranscriptionConfig {
    /// Bearer token for the inference provider
    #[serde(default)]
    pub api_token: Option<SecretString>,
    /// Base URL of the inference provider
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Upstream request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Key of the model used when the caller does not pick one
    #[serde(default = "default_model_key")]
    pub default_model: String,
    /// Caller-facing model keys mapped to upstream identifiers, in listing order
    #[serde(default = "default_models")]
    pub models: IndexMap<String, ModelConfig>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: default_base_url(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            default_model: default_model_key(),
            models: default_models(),
        }
    }
}

impl TranscriptionConfig {
    /// The configured token, treating an empty value as absent
    pub fn api_token(&self) -> Option<&SecretString> {
        self.api_token
            .as_ref()
            .filter(|token| !token.expose_secret().trim().is_empty())
    }

    /// Upstream request timeout
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// A single selectable model
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Identifier the provider expects, e.g. `openai/whisper-large-v3`
    pub id: String,
    /// Human readable description shown in the model listing
    #[serde(default)]
    pub description: Option<String>,
}

impl ModelConfig {
    pub fn new(id: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            id: id.into(),
            description: description.map(str::to_string),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL must parse")
}

#[allow(clippy::missing_const_for_fn)]
fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_model_key() -> String {
    DEFAULT_MODEL_KEY.to_string()
}

fn default_models() -> IndexMap<String, ModelConfig> {
    IndexMap::from([
        (
            "standard".to_string(),
            ModelConfig::new("openai/whisper-large-v3", Some("Whisper Large v3 - highest accuracy")),
        ),
        (
            "fast".to_string(),
            ModelConfig::new(
                "openai/whisper-large-v3-turbo",
                Some("Whisper Large v3 Turbo - faster, slightly less accurate"),
            ),
        ),
    ])
}
