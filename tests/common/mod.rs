//! Shared test fixtures: an in-memory store connector with observable
//! counters.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tiered_cache::pool::{PoolCounters, StoreClient, StoreConnector};
use tiered_cache::Config;

#[derive(Default)]
pub struct StoreState {
    pub connects: AtomicUsize,
    pub pings: AtomicUsize,
    pub closes: AtomicUsize,
    pub down: AtomicBool,
}

impl StoreState {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

pub struct MemoryConnector(pub Arc<StoreState>);

pub struct MemoryClient(Arc<StoreState>);

#[async_trait]
impl StoreClient for MemoryClient {
    async fn ping(&self) -> anyhow::Result<()> {
        self.0.pings.fetch_add(1, Ordering::SeqCst);
        if self.0.down.load(Ordering::SeqCst) {
            anyhow::bail!("store unavailable");
        }
        Ok(())
    }

    fn pool_counters(&self) -> Option<PoolCounters> {
        Some(PoolCounters { active: 1, idle: 3 })
    }

    async fn close(&self) {
        self.0.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    type Client = MemoryClient;

    async fn connect(&self) -> anyhow::Result<MemoryClient> {
        if self.0.down.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }
        self.0.connects.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryClient(Arc::clone(&self.0)))
    }
}

pub fn memory_store() -> (MemoryConnector, Arc<StoreState>) {
    let state = Arc::new(StoreState::default());
    (MemoryConnector(Arc::clone(&state)), state)
}

/// Default configuration with small, test-friendly bounds.
pub fn test_config() -> Config {
    Config {
        hot_tier_capacity: 3,
        schema_tier_ttl: 600,
        query_tier_capacity: 10,
        query_tier_ttl: 300,
        maintenance_interval: 120,
        pool_capacity: 4,
        probe_timeout_ms: 1000,
        warm_up_on_start: false,
        ..Config::default()
    }
}
