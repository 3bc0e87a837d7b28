//! Health checks
//!
//! Readiness and liveness checks plus a detailed report of each component
//! (service state, store, rating engine).

use crate::service::app::AppState;
use crate::types::Odds;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// A store ping slower than this reports the store as degraded
const SLOW_STORE_THRESHOLD: Duration = Duration::from_millis(500);

/// Health check status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "✅ healthy"),
            HealthStatus::Degraded => write!(f, "⚠️  degraded"),
            HealthStatus::Unhealthy => write!(f, "❌ unhealthy"),
        }
    }
}

impl HealthStatus {
    /// Numeric value exported as the health status gauge
    pub fn as_gauge(&self) -> u8 {
        match self {
            HealthStatus::Unhealthy => 0,
            HealthStatus::Degraded => 1,
            HealthStatus::Healthy => 2,
        }
    }

    /// The worse of two statuses
    fn combine(self, other: HealthStatus) -> HealthStatus {
        match (self, other) {
            (HealthStatus::Unhealthy, _) | (_, HealthStatus::Unhealthy) => HealthStatus::Unhealthy,
            (HealthStatus::Degraded, _) | (_, HealthStatus::Degraded) => HealthStatus::Degraded,
            _ => HealthStatus::Healthy,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall service status
    pub status: HealthStatus,
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Current timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Detailed component checks
    pub checks: Vec<ComponentCheck>,
    /// Service statistics
    pub stats: ServiceStats,
}

/// Individual component health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCheck {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional error message if unhealthy
    pub message: Option<String>,
    /// Check duration in milliseconds
    pub duration_ms: u64,
}

/// Service statistics for health reporting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceStats {
    pub matches: usize,
    pub players: usize,
    pub clubs: usize,
    pub national_teams: usize,
    pub uptime_seconds: u64,
}

impl HealthCheck {
    /// Perform a comprehensive health check of the service
    pub async fn check(app_state: Arc<AppState>) -> Result<Self> {
        let service_check = Self::check_service_running(&app_state).await;
        let store_check = Self::check_store(&app_state).await;
        let rating_check = Self::check_rating_engine(&app_state);

        let status = service_check
            .status
            .combine(store_check.status)
            .combine(rating_check.status);

        let collector = app_state.metrics_collector();
        collector.update_health_status(status.as_gauge());
        for check in [&service_check, &store_check, &rating_check] {
            collector.update_component_health(&check.name, check.status != HealthStatus::Unhealthy);
        }

        let stats = Self::gather_service_stats(&app_state).await;

        Ok(HealthCheck {
            status,
            service: app_state.config().service.name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now(),
            checks: vec![service_check, store_check, rating_check],
            stats,
        })
    }

    /// Simple liveness check - just verify service is running
    pub async fn liveness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        if app_state.is_running().await {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy)
        }
    }

    /// Readiness check - verify service can handle requests
    pub async fn readiness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        if !app_state.is_running().await {
            return Ok(HealthStatus::Unhealthy);
        }

        Ok(Self::check_store(&app_state).await.status)
    }

    async fn check_service_running(app_state: &AppState) -> ComponentCheck {
        let start = Instant::now();

        let (status, message) = if app_state.is_running().await {
            (HealthStatus::Healthy, None)
        } else {
            (
                HealthStatus::Unhealthy,
                Some("Service is not running".to_string()),
            )
        };

        ComponentCheck {
            name: "service_running".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Ping the store
    async fn check_store(app_state: &AppState) -> ComponentCheck {
        let start = Instant::now();

        let (status, message) = match app_state.store().health_check().await {
            Ok(_) if start.elapsed() > SLOW_STORE_THRESHOLD => (
                HealthStatus::Degraded,
                Some(format!("Store responded in {:?}", start.elapsed())),
            ),
            Ok(_) => (HealthStatus::Healthy, None),
            Err(e) => {
                error!("Store health check failed: {}", e);
                (
                    HealthStatus::Unhealthy,
                    Some(format!("Store check failed: {}", e)),
                )
            }
        };

        ComponentCheck {
            name: "store".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Rate a reference fixture and check the result is finite
    fn check_rating_engine(app_state: &AppState) -> ComponentCheck {
        let start = Instant::now();
        let odds = Odds {
            home_win: 0.4,
            draw: 0.3,
            away_win: 0.3,
        };
        let outcome = app_state
            .match_service()
            .calculator()
            .rate_match(&odds, 2, 1);

        let (status, message) =
            if outcome.home.rating_change.is_finite() && outcome.away.rating_change.is_finite() {
                (HealthStatus::Healthy, None)
            } else {
                (
                    HealthStatus::Unhealthy,
                    Some("Rating engine produced a non-finite delta".to_string()),
                )
            };

        ComponentCheck {
            name: "rating_engine".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    async fn gather_service_stats(app_state: &AppState) -> ServiceStats {
        let uptime_seconds = app_state.uptime().as_secs();

        match app_state.store().health_check().await {
            Ok(stats) => ServiceStats {
                matches: stats.matches,
                players: stats.players,
                clubs: stats.clubs,
                national_teams: stats.national_teams,
                uptime_seconds,
            },
            Err(e) => {
                debug!("Failed to get store stats for health check: {}", e);
                ServiceStats {
                    uptime_seconds,
                    ..ServiceStats::default()
                }
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize health check: {}", e))
    }
}
