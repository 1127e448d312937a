//! Tiered Cache - multi-tier caching and store connection lifecycle
//!
//! Bounded (LRU), expiring (TTL) and hybrid tiers behind a single
//! `get_or_compute` entry point with per-key request deduplication, a shared
//! store client with lazy creation and health probing, and a periodic
//! maintenance task.

pub mod api;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod observability;
pub mod pool;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use context::CacheContext;
pub use error::{CacheError, Result};
pub use observability::Observability;
pub use tasks::spawn_maintenance_task;
