//! Error types for the caching layer
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the caching layer.
///
/// A cache miss is not an error and has no variant here: `get_or_compute`
/// proceeds to compute on a miss.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Rejected configuration (zero capacity, zero TTL, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No tier is registered under this name
    #[error("Unknown tier: {0}")]
    UnknownTier(String),

    /// The caller-supplied compute function failed.
    ///
    /// Every waiter on the same key receives the same `cause`.
    #[error("Compute failed for {tier}/{key}: {cause:#}")]
    ComputeFailed {
        tier: String,
        key: String,
        cause: Arc<anyhow::Error>,
    },

    /// Creating the shared store client failed
    #[error("Store connection failed: {0}")]
    ConnectFailed(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Returns the underlying compute failure, if this is one.
    pub fn compute_cause(&self) -> Option<&anyhow::Error> {
        match self {
            CacheError::ComputeFailed { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            CacheError::UnknownTier(_) => StatusCode::NOT_FOUND,
            CacheError::ComputeFailed { .. } => StatusCode::BAD_GATEWAY,
            CacheError::ConnectFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching layer.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_failed_message_includes_cause() {
        let err = CacheError::ComputeFailed {
            tier: "schema".to_string(),
            key: "sales".to_string(),
            cause: Arc::new(anyhow::anyhow!("connection reset")),
        };

        let msg = err.to_string();
        assert!(msg.contains("schema/sales"));
        assert!(msg.contains("connection reset"));
        assert_eq!(
            err.compute_cause().map(|c| c.to_string()),
            Some("connection reset".to_string())
        );
    }

    #[test]
    fn test_unknown_tier_maps_to_not_found() {
        let response = CacheError::UnknownTier("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_connect_failed_maps_to_unavailable() {
        let response = CacheError::ConnectFailed("refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
