//! Tiered Cache Manager
//!
//! Composes the configured tiers and the request deduplicator into a single
//! `get_or_compute` entry point.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::cache::{RequestDeduplicator, Tier, TierConfig, TierStats};
use crate::error::{CacheError, Result};
use crate::observability::{MaintenanceReport, TierAdmin, TierSweep};
use crate::pool::HealthProbe;

// == Tiered Cache Manager ==
pub struct TieredCacheManager<V> {
    tiers: HashMap<String, Arc<Tier<V>>>,
    /// Tier names in configuration order, for stable reporting
    order: Vec<String>,
    dedup: RequestDeduplicator<(String, String), V>,
    probe: Arc<dyn HealthProbe>,
}

impl<V> TieredCacheManager<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Builds every tier up front. Tier names must be unique.
    pub fn new(configs: Vec<TierConfig>, probe: Arc<dyn HealthProbe>) -> Result<Self> {
        let mut tiers = HashMap::with_capacity(configs.len());
        let mut order = Vec::with_capacity(configs.len());

        for config in configs {
            if tiers.contains_key(&config.name) {
                return Err(CacheError::InvalidConfig(format!(
                    "Duplicate tier name: {}",
                    config.name
                )));
            }
            debug!(tier = %config.name, policy = %config.policy, "Configuring tier");
            order.push(config.name.clone());
            tiers.insert(config.name.clone(), Arc::new(Tier::new(config)?));
        }

        Ok(Self {
            tiers,
            order,
            dedup: RequestDeduplicator::new(),
            probe,
        })
    }

    // == Get Or Compute ==
    /// Returns the cached value for `key` in `tier`, computing it on a miss.
    ///
    /// Concurrent misses on the same `(tier, key)` share one invocation of
    /// `compute`. A successful result is stored before any waiter sees it; a
    /// failure is returned to every waiter and nothing is stored.
    pub async fn get_or_compute<F, Fut>(&self, tier: &str, key: &str, compute: F) -> Result<V>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let target = self.tier(tier)?;

        if let Some(value) = target.get(key).await {
            debug!(tier, key, "Cache hit");
            return Ok(value);
        }
        debug!(tier, key, "Cache miss");

        let outcome = self
            .dedup
            .run((tier.to_string(), key.to_string()), || {
                let target = Arc::clone(target);
                let key = key.to_string();
                let pending = compute();
                async move {
                    // A previous flight may have stored the value after our miss
                    if let Some(value) = target.recheck(&key).await {
                        return Ok(value);
                    }
                    let value = pending.await?;
                    target.insert(key, value.clone()).await;
                    Ok(value)
                }
            })
            .await;

        outcome.map_err(|cause| {
            warn!(tier, key, error = %cause, "Compute failed");
            CacheError::ComputeFailed {
                tier: tier.to_string(),
                key: key.to_string(),
                cause,
            }
        })
    }

    // == Clear ==
    /// Clears one tier, or every tier when `tier` is None.
    ///
    /// Computations already in flight still store their result when they
    /// finish.
    pub async fn clear_tier(&self, tier: Option<&str>) -> Result<()> {
        match tier {
            Some(name) => {
                self.tier(name)?.clear().await;
                info!(tier = name, "Tier cleared");
            }
            None => {
                for tier in self.ordered() {
                    tier.clear().await;
                }
                info!("All tiers cleared");
            }
        }
        Ok(())
    }

    // == Stats ==
    pub async fn stats_snapshot(&self) -> Vec<TierStats> {
        let mut stats = Vec::with_capacity(self.order.len());
        for tier in self.ordered() {
            stats.push(tier.stats().await);
        }
        stats
    }

    // == Maintenance ==
    /// Sweeps expired entries from every time-bounded tier, then probes the
    /// store.
    ///
    /// Each tier is locked only for its own sweep; the probe runs after all
    /// sweeps, outside any tier lock.
    pub async fn maintenance(&self) -> MaintenanceReport {
        let started = Instant::now();
        let mut swept = Vec::new();

        for tier in self.ordered() {
            if !tier.policy().is_time_bounded() {
                continue;
            }
            let removed = tier.cleanup().await;
            if removed > 0 {
                debug!(tier = tier.name(), removed, "Expired entries swept");
            }
            swept.push(TierSweep {
                tier: tier.name().to_string(),
                removed,
            });
        }

        let pool_healthy = self.probe.health_check().await;
        if !pool_healthy {
            warn!("Maintenance health probe reported the store unavailable");
        }

        let report = MaintenanceReport::new(swept, pool_healthy, started.elapsed());
        info!(
            removed = report.removed_total,
            pool_healthy,
            elapsed_ms = report.elapsed_ms,
            "Maintenance pass complete"
        );
        report
    }

    pub fn tier_names(&self) -> &[String] {
        &self.order
    }

    /// Keys with a computation currently in flight, across all tiers.
    pub async fn in_flight(&self) -> usize {
        self.dedup.in_flight().await
    }

    fn tier(&self, name: &str) -> Result<&Arc<Tier<V>>> {
        self.tiers
            .get(name)
            .ok_or_else(|| CacheError::UnknownTier(name.to_string()))
    }

    fn ordered(&self) -> impl Iterator<Item = &Arc<Tier<V>>> {
        self.order.iter().filter_map(|name| self.tiers.get(name))
    }
}

#[async_trait]
impl<V> TierAdmin for TieredCacheManager<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn tier_stats(&self) -> Vec<TierStats> {
        self.stats_snapshot().await
    }

    async fn clear(&self, tier: Option<&str>) -> Result<()> {
        self.clear_tier(tier).await
    }

    async fn maintenance(&self) -> MaintenanceReport {
        TieredCacheManager::maintenance(self).await
    }
}
