use std::path::PathBuf;

use clap::Parser;

/// Scribe transcription relay
#[derive(Debug, Parser)]
#[command(name = "scribe", about = "Relay audio uploads to a hosted speech-to-text model")]
pub struct Args {
    /// Path to configuration file; built-in defaults are used when omitted
    #[arg(short, long, env = "SCRIBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "SCRIBE_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
