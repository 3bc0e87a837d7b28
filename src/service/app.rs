//! Main application state and service coordination
//!
//! This module contains the AppState that wires the store, rating
//! calculator, reconciliation service and metrics together and owns the
//! HTTP server lifecycle.

use crate::api::{self, HttpServer, HttpServerConfig};
use crate::config::AppConfig;
use crate::metrics::MetricsCollector;
use crate::rating::{OddsRatingCalculator, RatingCalculator};
use crate::reconcile::MatchService;
use crate::store::{InMemoryStore, MatchStore, SeedData};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("HTTP server error: {message}")]
    Server { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Persistence collaborator
    store: Arc<dyn MatchStore>,

    /// Match reconciliation service
    match_service: Arc<MatchService>,

    /// Metrics collector shared with the service
    metrics_collector: Arc<MetricsCollector>,

    /// HTTP server for API, health and metrics routes
    http_server: HttpServer,

    /// Running server task
    server_task: Mutex<Option<JoinHandle<()>>>,

    /// Service start time
    started_at: Instant,

    /// Service status
    is_running: Arc<RwLock<bool>>,
}

impl AppState {
    /// Initialize the application with an in-memory store, seeded from the
    /// configured file if any
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing touchline match rating service");

        let store = InMemoryStore::new();
        if let Some(path) = &config.storage.seed_file {
            info!("Loading reference data from {}", path.display());
            let seed = SeedData::from_file(path).map_err(|e| ServiceError::Initialization {
                message: format!("Failed to load seed data: {:#}", e),
            })?;
            store
                .load_seed(seed)
                .map_err(|e| ServiceError::Initialization {
                    message: format!("Failed to apply seed data: {}", e),
                })?;
        } else {
            warn!("No seed file configured - starting with an empty store");
        }

        Self::with_store(config, Arc::new(store))
    }

    /// Initialize the application around an existing store. The config is
    /// expected to be validated already.
    pub fn with_store(config: AppConfig, store: Arc<dyn MatchStore>) -> Result<Self, ServiceError> {
        let metrics_collector =
            Arc::new(
                MetricsCollector::new().map_err(|e| ServiceError::Initialization {
                    message: format!("Failed to create metrics collector: {}", e),
                })?,
            );

        let calculator: Arc<dyn RatingCalculator> =
            Arc::new(OddsRatingCalculator::from_settings(&config.rating));
        info!("Rating calculator: {}", calculator.config());

        let match_service = Arc::new(MatchService::new(
            store.clone(),
            calculator,
            config.rating.clone(),
            metrics_collector.clone(),
        ));

        let http_server = HttpServer::new(HttpServerConfig {
            port: config.service.http_port,
            host: config.service.host.clone(),
        });

        Ok(Self {
            config,
            store,
            match_service,
            metrics_collector,
            http_server,
            server_task: Mutex::new(None),
            started_at: Instant::now(),
            is_running: Arc::new(RwLock::new(false)),
        })
    }

    /// Bind the HTTP server and start serving in the background
    pub async fn start(self: &Arc<Self>) -> Result<SocketAddr, ServiceError> {
        info!("Starting touchline service");

        let listener = self
            .http_server
            .bind()
            .await
            .map_err(|e| ServiceError::Server {
                message: format!("{:#}", e),
            })?;
        let addr = listener.local_addr().map_err(|e| ServiceError::Server {
            message: e.to_string(),
        })?;

        self.set_running(true).await;

        let router = api::router(self.clone());
        let serving = self.http_server.serve(listener, router);
        let handle = tokio::spawn(async move {
            if let Err(e) = serving.await {
                error!("HTTP server failed: {}", e);
            }
        });
        *self.server_task.lock().await = Some(handle);

        info!("✅ Touchline service started on http://{}", addr);
        Ok(addr)
    }

    /// Stop accepting requests and wait for in-flight ones to finish
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of touchline service");

        self.set_running(false).await;
        self.http_server.stop();

        if let Some(handle) = self.server_task.lock().await.take() {
            handle.await.map_err(|e| ServiceError::Server {
                message: format!("Server task failed: {}", e),
            })?;
        }

        match self.store.health_check().await {
            Ok(stats) => info!("Final store statistics: {:?}", stats),
            Err(e) => warn!("Failed to read final store statistics: {}", e),
        }

        info!("✅ Touchline service shutdown completed");
        Ok(())
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    pub async fn set_running(&self, running: bool) {
        *self.is_running.write().await = running;
    }

    pub fn store(&self) -> Arc<dyn MatchStore> {
        self.store.clone()
    }

    pub fn match_service(&self) -> Arc<MatchService> {
        self.match_service.clone()
    }

    pub fn metrics_collector(&self) -> Arc<MetricsCollector> {
        self.metrics_collector.clone()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Whether internal error causes may be sent to clients
    pub fn expose_error_details(&self) -> bool {
        !self.config.is_production()
    }
}
