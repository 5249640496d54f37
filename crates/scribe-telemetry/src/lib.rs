//! Logging for Scribe
//!
//! Installs a `tracing-subscriber` registry that writes text or JSON lines to stdout

use scribe_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging from configuration
///
/// `RUST_LOG`, when set, takes precedence over the configured filter. An
/// unparsable filter falls back to `info`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: &TelemetryConfig) -> anyhow::Result<()> {
    let filter = build_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), &config.log_filter);

    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Text => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);

            registry.with(fmt_layer).try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true);

            registry.with(fmt_layer).try_init()?;
        }
    }

    Ok(())
}

fn build_filter(from_env: Option<&str>, configured: &str) -> EnvFilter {
    from_env
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(configured).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
