//! Touchline - football match rating service
//!
//! This crate rates match results against bookmaker odds, keeps every
//! starting player's rating history consistent across creates and edits,
//! and serves it all over a JSON HTTP API.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod rating;
pub mod reconcile;
pub mod service;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{ErrorKind, MatchError, Result};
pub use types::*;

// Re-export key components
pub use rating::{OddsRatingCalculator, RatingCalculator};
pub use reconcile::MatchService;
pub use store::{InMemoryStore, MatchStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
