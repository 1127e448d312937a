//! Maintenance Task
//!
//! Background task that periodically sweeps expired entries and probes the
//! backing store. Started and stopped explicitly by the owner of the cache
//! context.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::observability::Observability;

/// Handle to a running maintenance task.
pub struct MaintenanceTask {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl MaintenanceTask {
    /// Signals the task to stop and waits for it to finish.
    ///
    /// A pass already in progress completes first.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Maintenance task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawns a task that runs [`Observability::maintenance`] every `period`.
///
/// The first pass runs one full period after spawning. Missed ticks are
/// skipped rather than bunched up.
///
/// # Example
/// ```ignore
/// let task = spawn_maintenance_task(observability.clone(), Duration::from_secs(120));
/// // Later, during shutdown:
/// task.stop().await;
/// ```
pub fn spawn_maintenance_task(
    observability: Arc<Observability>,
    period: Duration,
) -> MaintenanceTask {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(interval_secs = period.as_secs(), "Maintenance task started");

        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let report = observability.maintenance().await;
                    debug!(
                        removed = report.removed_total,
                        pool_healthy = report.pool_healthy,
                        "Scheduled maintenance finished"
                    );
                }
            }
        }

        info!("Maintenance task stopped");
    });

    MaintenanceTask {
        shutdown_tx,
        handle,
    }
}
