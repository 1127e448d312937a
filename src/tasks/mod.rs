//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the cache is live.
//!
//! # Tasks
//! - Maintenance: sweeps expired entries and probes the store at a fixed interval

mod maintenance;

pub use maintenance::{spawn_maintenance_task, MaintenanceTask};
