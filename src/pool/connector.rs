//! Store connector traits
//!
//! The seam between the lifecycle manager and whatever driver backs the store.

use async_trait::async_trait;
use serde::Serialize;

/// Driver-reported pool occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolCounters {
    pub active: usize,
    pub idle: usize,
}

/// A live handle to the backing store.
#[async_trait]
pub trait StoreClient: Send + Sync + 'static {
    /// Issues the cheapest possible round trip to the store.
    async fn ping(&self) -> anyhow::Result<()>;

    /// Occupancy as reported by the driver, if it exposes any.
    ///
    /// Returning `None` makes the manager report zeroed, non-authoritative
    /// counters.
    fn pool_counters(&self) -> Option<PoolCounters> {
        None
    }

    /// Releases driver resources. Called once on shutdown.
    async fn close(&self) {}
}

/// Creates [`StoreClient`]s.
#[async_trait]
pub trait StoreConnector: Send + Sync + 'static {
    type Client: StoreClient;

    async fn connect(&self) -> anyhow::Result<Self::Client>;
}
