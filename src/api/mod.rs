//! HTTP API
//!
//! Match and player routes under `/api`, merged with the operational
//! endpoints and wrapped in CORS and request tracing layers.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ErrorBody};
pub use server::{HttpServer, HttpServerConfig};

use crate::metrics::health::operational_routes;
use crate::service::AppState;
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Routes under `/api/match`
fn match_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/matches", post(handlers::create_match))
        .route("/matches/{id}", get(handlers::get_match))
        .route("/edit-match/{match_id}", put(handlers::edit_match))
        .route(
            "/check-team-availability",
            get(handlers::check_team_availability),
        )
        .route("/get-all-matches", get(handlers::matches_for_team))
}

/// Routes under `/api/player`
fn player_routes() -> Router<Arc<AppState>> {
    Router::new().route("/{id}", get(handlers::get_player))
}

/// Build the complete application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api/match", match_routes())
        .nest("/api/player", player_routes())
        .merge(operational_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
