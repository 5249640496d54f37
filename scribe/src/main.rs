#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use args::Args;
use clap::Parser;
use scribe_config::{API_TOKEN_ENV, Config};
use scribe_server::Server;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load_or_default(args.config.as_deref())?;

    if let Some(listen) = args.listen {
        config.server.listen_address = Some(listen);
    }

    scribe_telemetry::init(&config.telemetry)?;

    let transcription = &config.transcription;
    tracing::info!(
        config_path = args.config.as_ref().map(|p| p.display().to_string()),
        listen_address = %config.server.listen_address(),
        base_url = %transcription.base_url,
        models = ?transcription.models.keys().collect::<Vec<_>>(),
        default_model = %transcription.default_model,
        credential_configured = transcription.api_token().is_some(),
        "starting scribe"
    );

    if transcription.api_token().is_none() {
        tracing::warn!(
            env = API_TOKEN_ENV,
            "no upstream API token configured; transcription requests will fail"
        );
    }

    let server = Server::new(&config)?;

    // Set up graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    server.serve(shutdown).await?;

    tracing::info!("scribe stopped");
    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
