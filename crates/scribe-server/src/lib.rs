mod cors;
mod fallback;
mod health;

use std::net::SocketAddr;

use axum::Router;
use scribe_config::Config;
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the transcription relay cannot be initialized
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let listen_address = config.server.listen_address();

        let relay = transcribe::build_server(config)?;

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        app = app.merge(transcribe::endpoint_router(&relay).with_state(relay));

        // Unknown paths and unsupported methods on known paths get the same JSON 404
        app = app
            .fallback(fallback::not_found)
            .method_not_allowed_fallback(fallback::not_found);

        // Apply middleware layers (innermost first)
        app = app.layer(TraceLayer::new_for_http());
        app = app.layer(cors::cors_layer(&config.server.cors));

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
