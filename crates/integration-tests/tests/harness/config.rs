//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::path::Path;

use indexmap::IndexMap;
use secrecy::SecretString;
use scribe_config::{Config, CorsConfig, HealthConfig, ModelConfig, ServerConfig, TranscriptionConfig};

/// Token the builder configures unless told otherwise
pub const TEST_TOKEN: &str = "hf_test_token";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults and a test token
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                    ..ServerConfig::default()
                },
                transcription: TranscriptionConfig {
                    api_token: Some(SecretString::from(TEST_TOKEN)),
                    ..TranscriptionConfig::default()
                },
                telemetry: scribe_config::TelemetryConfig::default(),
            },
        }
    }

    /// Point the relay at a mock upstream
    pub fn with_upstream(mut self, base_url: &str) -> Self {
        self.config.transcription.base_url = base_url.parse().expect("valid URL");
        self
    }

    /// Remove the upstream credential
    pub fn without_token(mut self) -> Self {
        self.config.transcription.api_token = None;
        self
    }

    /// Set the upstream timeout
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.transcription.timeout_seconds = seconds;
        self
    }

    /// Replace the model table, listing order follows `models`
    pub fn with_models(mut self, models: &[(&str, &str, Option<&str>)], default_model: &str) -> Self {
        self.config.transcription.models = models
            .iter()
            .map(|(key, id, description)| ((*key).to_owned(), ModelConfig::new(*id, *description)))
            .collect::<IndexMap<_, _>>();
        self.config.transcription.default_model = default_model.to_owned();
        self
    }

    /// Stage uploads in `dir`
    pub fn with_staging_dir(mut self, dir: &Path) -> Self {
        self.config.server.upload.temp_dir = Some(dir.to_path_buf());
        self
    }

    /// Set the upload size limit
    pub fn with_max_upload_bytes(mut self, max_bytes: u64) -> Self {
        self.config.server.upload.max_bytes = max_bytes;
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = config;
        self
    }

    /// Set the health endpoint configuration
    pub fn with_health(mut self, config: HealthConfig) -> Self {
        self.config.server.health = config;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Config {
        self.config
    }
}
