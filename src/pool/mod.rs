//! Pool Module
//!
//! Lifecycle management for the single shared client handle to the backing
//! store: lazy creation, warm-up, health probing, stats and shutdown.
//!
//! The store itself is opaque. It is reached only through [`StoreConnector`]
//! (create a client) and [`StoreClient`] (probe it).

mod connector;
mod manager;
mod tcp;

pub use connector::{PoolCounters, StoreClient, StoreConnector};
pub use manager::{ConnectionManager, HealthProbe, PoolStateKind, PoolStats};
pub use tcp::{TcpConnector, TcpStoreClient};
