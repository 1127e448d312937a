//! Cache Context
//!
//! The explicit, process-wide object that owns the tiers, the store
//! connection and the maintenance task. Built once at startup, handed to
//! request handlers, and shut down by the host.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::cache::{TierStats, TieredCacheManager};
use crate::config::Config;
use crate::error::Result;
use crate::observability::{MaintenanceReport, Observability, StatsSnapshot, TierAdmin};
use crate::pool::{ConnectionManager, HealthProbe, StoreConnector};
use crate::tasks::{spawn_maintenance_task, MaintenanceTask};

pub struct CacheContext<V, C: StoreConnector> {
    tiers: Arc<TieredCacheManager<V>>,
    pool: Arc<ConnectionManager<C>>,
    observability: Arc<Observability>,
    maintenance: Mutex<Option<MaintenanceTask>>,
}

impl<V, C> CacheContext<V, C>
where
    V: Clone + Send + Sync + 'static,
    C: StoreConnector,
{
    // == Init ==
    /// Builds the tiers and the (not yet connected) pool, optionally warms the
    /// store, and starts the maintenance task.
    pub async fn init(config: &Config, connector: C) -> Result<Self> {
        config.validate()?;

        let pool = Arc::new(ConnectionManager::new(
            connector,
            config.pool_capacity,
            config.probe_timeout(),
        ));
        let probe: Arc<dyn HealthProbe> = pool.clone();
        let tiers = Arc::new(TieredCacheManager::new(config.tier_configs(), probe.clone())?);
        let admin: Arc<dyn TierAdmin> = tiers.clone();
        let observability = Arc::new(Observability::new(admin, probe));

        if config.warm_up_on_start {
            pool.warm_up().await;
        }

        let task = spawn_maintenance_task(observability.clone(), config.maintenance_interval());
        info!(
            tiers = ?tiers.tier_names(),
            maintenance_interval_secs = config.maintenance_interval,
            "Cache context initialized"
        );

        Ok(Self {
            tiers,
            pool,
            observability,
            maintenance: Mutex::new(Some(task)),
        })
    }

    pub async fn get_or_compute<F, Fut>(&self, tier: &str, key: &str, compute: F) -> Result<V>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        self.tiers.get_or_compute(tier, key, compute).await
    }

    pub async fn clear_tier(&self, tier: Option<&str>) -> Result<()> {
        self.tiers.clear_tier(tier).await
    }

    pub async fn stats_snapshot(&self) -> StatsSnapshot {
        self.observability.stats_snapshot().await
    }

    pub async fn tier_stats(&self) -> Vec<TierStats> {
        self.tiers.stats_snapshot().await
    }

    /// Runs a maintenance pass now, independent of the schedule.
    pub async fn maintenance(&self) -> MaintenanceReport {
        self.observability.maintenance().await
    }

    pub async fn acquire(&self) -> Result<Arc<C::Client>> {
        self.pool.acquire().await
    }

    pub async fn health_check(&self) -> bool {
        self.pool.health_check().await
    }

    /// Shared handle for the admin surface.
    pub fn observability(&self) -> Arc<Observability> {
        Arc::clone(&self.observability)
    }

    // == Shutdown ==
    /// Stops the maintenance task and releases the store client.
    ///
    /// Safe to call more than once.
    pub async fn shutdown(&self) {
        let task = self.maintenance.lock().await.take();
        if let Some(task) = task {
            task.stop().await;
        }
        self.pool.shutdown().await;
        info!("Cache context shut down");
    }
}
