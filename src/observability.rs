//! Observability Façade
//!
//! Aggregates tier and pool statistics and exposes the maintenance trigger to
//! the admin surface. It is value-type agnostic: tiers are reached through
//! [`TierAdmin`], the pool through [`HealthProbe`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::TierStats;
use crate::error::Result;
use crate::pool::{HealthProbe, PoolStats};

// == Tier Admin ==
/// Administrative operations over a set of tiers.
#[async_trait]
pub trait TierAdmin: Send + Sync {
    async fn tier_stats(&self) -> Vec<TierStats>;

    /// Clears the named tier, or all tiers when `tier` is None.
    async fn clear(&self, tier: Option<&str>) -> Result<()>;

    async fn maintenance(&self) -> MaintenanceReport;
}

// == Reports ==
#[derive(Debug, Clone, Serialize)]
pub struct TierSweep {
    pub tier: String,
    pub removed: usize,
}

/// Outcome of one maintenance pass.
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceReport {
    /// One entry per time-bounded tier
    pub swept: Vec<TierSweep>,
    pub removed_total: usize,
    pub pool_healthy: bool,
    pub elapsed_ms: u64,
    pub completed_at: DateTime<Utc>,
}

impl MaintenanceReport {
    pub fn new(swept: Vec<TierSweep>, pool_healthy: bool, elapsed: Duration) -> Self {
        Self {
            removed_total: swept.iter().map(|s| s.removed).sum(),
            swept,
            pool_healthy,
            elapsed_ms: elapsed.as_millis() as u64,
            completed_at: Utc::now(),
        }
    }
}

/// Combined view served by `GET /stats`.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub tiers: Vec<TierStats>,
    pub pool: PoolStats,
    pub generated_at: DateTime<Utc>,
}

// == Observability ==
#[derive(Clone)]
pub struct Observability {
    tiers: Arc<dyn TierAdmin>,
    pool: Arc<dyn HealthProbe>,
}

impl Observability {
    pub fn new(tiers: Arc<dyn TierAdmin>, pool: Arc<dyn HealthProbe>) -> Self {
        Self { tiers, pool }
    }

    pub async fn stats_snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            tiers: self.tiers.tier_stats().await,
            pool: self.pool.pool_stats().await,
            generated_at: Utc::now(),
        }
    }

    /// Runs one maintenance pass: expired-entry sweep, then health probe.
    pub async fn maintenance(&self) -> MaintenanceReport {
        self.tiers.maintenance().await
    }

    pub async fn clear_tier(&self, tier: Option<&str>) -> Result<()> {
        self.tiers.clear(tier).await
    }

    pub async fn health_check(&self) -> bool {
        self.pool.health_check().await
    }
}
