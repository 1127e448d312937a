//! API Routes
//!
//! Configures the Axum router with all admin endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{
    clear_all_handler, clear_tier_handler, health_handler, maintenance_handler, stats_handler,
    AppState,
};

/// Creates the admin router with all endpoints configured.
///
/// # Middleware
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/maintenance", post(maintenance_handler))
        .route("/tiers", delete(clear_all_handler))
        .route("/tiers/:name", delete(clear_tier_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
