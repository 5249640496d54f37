use std::net::SocketAddr;

use serde::Deserialize;

use crate::{cors::CorsConfig, health::HealthConfig, upload::UploadConfig};

/// Port used when no listen address is configured
pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

impl ServerConfig {
    /// Configured listen address, or all interfaces on [`DEFAULT_PORT`]
    pub fn listen_address(&self) -> SocketAddr {
        self.listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))
    }
}
