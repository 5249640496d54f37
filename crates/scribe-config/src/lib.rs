#![allow(clippy::must_use_candidate)]

pub mod cors;
mod env;
pub mod health;
mod loader;
pub mod server;
pub mod telemetry;
pub mod transcription;
pub mod upload;

use serde::Deserialize;

pub use cors::*;
pub use health::*;
pub use loader::{ALLOWED_ORIGINS_ENV, API_TOKEN_ENV};
pub use server::*;
pub use telemetry::*;
pub use transcription::*;
pub use upload::*;

/// Top-level Scribe configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream transcription configuration
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
