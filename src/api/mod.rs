//! API Module
//!
//! HTTP handlers and routing for the operational admin surface.
//!
//! # Endpoints
//! - `GET /health` - Probe the backing store
//! - `GET /stats` - Tier and pool statistics
//! - `POST /maintenance` - Run a maintenance pass now
//! - `DELETE /tiers` - Clear every tier
//! - `DELETE /tiers/:name` - Clear one tier

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
