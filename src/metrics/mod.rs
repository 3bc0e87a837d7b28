//! Metrics and monitoring for the touchline service
//!
//! Prometheus collectors for match submissions plus the operational
//! health and metrics endpoints.

pub mod collector;
pub mod health;

pub use collector::{MatchMetrics, MetricsCollector, MetricsTimer, PerformanceMetrics, ServiceMetrics};
pub use health::operational_routes;
