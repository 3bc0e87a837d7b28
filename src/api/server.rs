//! HTTP server lifecycle
//!
//! Binds the listener and serves a router until a stop signal arrives on
//! the broadcast channel.

use anyhow::{Context, Result};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Port to bind to; 0 picks a free port
    pub port: u16,
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// Serves the API, health and metrics routes on one listener
#[derive(Clone)]
pub struct HttpServer {
    config: HttpServerConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            shutdown_tx,
        }
    }

    pub fn config(&self) -> &HttpServerConfig {
        &self.config
    }

    /// Bind the configured address
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid HTTP server address")?;

        TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind HTTP server to {}", addr))
    }

    /// Serve `router` on `listener` until `stop` is called. The stop signal
    /// is subscribed before the future is returned, so a `stop` issued
    /// before the future is first polled is not lost.
    pub fn serve(
        &self,
        listener: TcpListener,
        router: Router,
    ) -> impl Future<Output = Result<()>> + Send + 'static {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        async move {
            let addr = listener.local_addr()?;
            info!("HTTP server listening on http://{}", addr);

            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                    info!("HTTP server shutdown signal received");
                })
                .await?;

            info!("HTTP server stopped");
            Ok(())
        }
    }

    /// Signal every running `serve` call to drain and return
    pub fn stop(&self) {
        info!("Stopping HTTP server...");

        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to HTTP server: {}", e);
        }
    }
}
