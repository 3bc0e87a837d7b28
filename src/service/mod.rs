//! Service layer for the touchline match rating service
//!
//! This module contains the main application state, service coordination
//! and health checks.

pub mod app;
pub mod health;

pub use app::{AppState, ServiceError};
pub use health::{HealthCheck, HealthStatus};
