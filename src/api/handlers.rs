//! API Handlers
//!
//! HTTP request handlers for each admin endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::Result;
use crate::models::{ClearResponse, HealthResponse};
use crate::observability::{MaintenanceReport, Observability, StatsSnapshot};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub observability: Arc<Observability>,
}

impl AppState {
    pub fn new(observability: Arc<Observability>) -> Self {
        Self { observability }
    }
}

/// Handler for GET /health
///
/// Returns 503 when the store probe fails.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = state.observability.health_check().await;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(HealthResponse::from_probe(healthy)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.observability.stats_snapshot().await)
}

/// Handler for POST /maintenance
pub async fn maintenance_handler(State(state): State<AppState>) -> Json<MaintenanceReport> {
    Json(state.observability.maintenance().await)
}

/// Handler for DELETE /tiers
pub async fn clear_all_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    state.observability.clear_tier(None).await?;
    Ok(Json(ClearResponse::new(None)))
}

/// Handler for DELETE /tiers/:name
pub async fn clear_tier_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ClearResponse>> {
    state.observability.clear_tier(Some(&name)).await?;
    Ok(Json(ClearResponse::new(Some(name))))
}
