//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,
    /// Result of the store probe made for this request
    pub pool_healthy: bool,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn from_probe(pool_healthy: bool) -> Self {
        Self {
            status: if pool_healthy { "healthy" } else { "unhealthy" }.to_string(),
            pool_healthy,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for DELETE /tiers and DELETE /tiers/:name
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    /// The cleared tier, absent when every tier was cleared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

impl ClearResponse {
    pub fn new(tier: Option<String>) -> Self {
        let message = match &tier {
            Some(name) => format!("Tier '{}' cleared", name),
            None => "All tiers cleared".to_string(),
        };
        Self { message, tier }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
