//! Response models for the admin API
//!
//! Stats and maintenance bodies serialize the observability types directly;
//! this module holds the remaining DTOs.

pub mod responses;

// Re-export commonly used types
pub use responses::{ClearResponse, ErrorResponse, HealthResponse};
