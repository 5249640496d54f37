use std::path::PathBuf;

use serde::Deserialize;

/// Largest accepted upload (100 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 << 20;

/// Multipart field carrying the audio payload
pub const DEFAULT_UPLOAD_FIELD: &str = "audio";

/// Audio upload intake configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadConfig {
    /// Multipart field name carrying the file
    #[serde(default = "default_field_name")]
    pub field_name: String,
    /// Maximum accepted file size in bytes
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    /// Directory for in-flight uploads, the OS temp dir when unset
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            field_name: default_field_name(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            temp_dir: None,
        }
    }
}

impl UploadConfig {
    /// Directory where uploads are staged while a request is in flight
    pub fn staging_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

fn default_field_name() -> String {
    DEFAULT_UPLOAD_FIELD.to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}
