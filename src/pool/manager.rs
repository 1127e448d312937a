//! Connection Lifecycle Manager
//!
//! Owns the one shared store client and its state machine:
//!
//! ```text
//! Uninitialized --(acquire | warm_up | health_check)--> Ready
//! Uninitialized | Ready --(shutdown)--> Closed --(acquire | warm_up)--> Ready
//! ```
//!
//! `Closed` is the uninitialized state reached through shutdown. It differs
//! only in that `health_check` reports `false` instead of reconnecting, so a
//! shut-down pool stays down until its owner asks for a client again.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::error::{CacheError, Result};
use crate::pool::{PoolCounters, StoreClient, StoreConnector};

// == Pool State ==
enum PoolState<T> {
    Uninitialized,
    Ready {
        client: Arc<T>,
        created_at: DateTime<Utc>,
    },
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolStateKind {
    Uninitialized,
    Ready,
    Closed,
}

impl<T> PoolState<T> {
    fn kind(&self) -> PoolStateKind {
        match self {
            PoolState::Uninitialized => PoolStateKind::Uninitialized,
            PoolState::Ready { .. } => PoolStateKind::Ready,
            PoolState::Closed => PoolStateKind::Closed,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct HealthRecord {
    healthy: bool,
    checked_at: DateTime<Utc>,
}

// == Pool Stats ==
/// Pool snapshot for the admin surface.
///
/// `approximate_active` and `approximate_idle` are best effort: they come from
/// the driver when it reports occupancy and are zero otherwise. They must not
/// be used for capacity decisions.
#[derive(Debug, Clone, Serialize)]
pub struct PoolStats {
    pub capacity: usize,
    pub healthy: bool,
    pub approximate_active: usize,
    pub approximate_idle: usize,
    pub state: PoolStateKind,
    pub created_at: Option<DateTime<Utc>>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

// == Health Probe ==
/// What maintenance and the admin surface need from the pool.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Never fails; any problem reads as `false`.
    async fn health_check(&self) -> bool;

    async fn pool_stats(&self) -> PoolStats;
}

// == Connection Manager ==
pub struct ConnectionManager<C: StoreConnector> {
    connector: C,
    capacity: usize,
    /// Bounds both client creation and each probe
    probe_timeout: Duration,
    /// Only ever held briefly, never across a store call
    state: Mutex<PoolState<C::Client>>,
    /// Held across client creation so concurrent first callers create one client
    creating: Mutex<()>,
    last_health: RwLock<Option<HealthRecord>>,
}

impl<C: StoreConnector> ConnectionManager<C> {
    /// Creates a manager in the uninitialized state. Nothing is connected yet.
    pub fn new(connector: C, capacity: usize, probe_timeout: Duration) -> Self {
        Self {
            connector,
            capacity,
            probe_timeout,
            state: Mutex::new(PoolState::Uninitialized),
            creating: Mutex::new(()),
            last_health: RwLock::new(None),
        }
    }

    // == Acquire ==
    /// Returns the shared client, creating it first if there is none.
    pub async fn acquire(&self) -> Result<Arc<C::Client>> {
        match self.ensure_client(true).await? {
            Some(client) => Ok(client),
            None => Err(CacheError::Internal(
                "store client unavailable after reopen".to_string(),
            )),
        }
    }

    // == Warm Up ==
    /// Creates the client if needed and probes it once.
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn warm_up(&self) {
        let client = match self.acquire().await {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Store warm-up failed to create client");
                return;
            }
        };

        if self.probe(&client).await {
            info!("Store warm-up complete");
        } else {
            warn!("Store warm-up probe failed");
        }
    }

    // == Health Check ==
    /// Probes the store, creating the client first when uninitialized.
    ///
    /// Returns `false` on any failure, and without reconnecting after shutdown.
    pub async fn health_check(&self) -> bool {
        let client = match self.ensure_client(false).await {
            Ok(Some(client)) => client,
            Ok(None) => {
                debug!("Health check on closed pool");
                self.record_health(false).await;
                return false;
            }
            Err(e) => {
                warn!(error = %e, "Health check could not create store client");
                self.record_health(false).await;
                return false;
            }
        };

        self.probe(&client).await
    }

    // == Stats ==
    pub async fn stats_snapshot(&self) -> PoolStats {
        let (state, created_at, counters) = {
            let state = self.state.lock().await;
            match &*state {
                PoolState::Ready { client, created_at } => (
                    state.kind(),
                    Some(*created_at),
                    client.pool_counters().unwrap_or_default(),
                ),
                other => (other.kind(), None, PoolCounters::default()),
            }
        };
        let last_health = *self.last_health.read().await;

        PoolStats {
            capacity: self.capacity,
            healthy: state == PoolStateKind::Ready
                && last_health.map(|h| h.healthy).unwrap_or(false),
            approximate_active: counters.active,
            approximate_idle: counters.idle,
            state,
            created_at,
            last_checked_at: last_health.map(|h| h.checked_at),
        }
    }

    // == Shutdown ==
    /// Releases the shared client. Repeated calls are no-ops.
    ///
    /// The last health record belongs to the released client and is dropped
    /// with it.
    pub async fn shutdown(&self) {
        let previous = std::mem::replace(&mut *self.state.lock().await, PoolState::Closed);
        *self.last_health.write().await = None;

        match previous {
            PoolState::Ready { client, .. } => {
                client.close().await;
                info!("Store client released");
            }
            _ => debug!("Pool shutdown requested while not ready"),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the current client, connecting if allowed.
    ///
    /// `reopen` permits leaving the closed state; `Ok(None)` means the pool
    /// is closed and reopening was not permitted.
    async fn ensure_client(&self, reopen: bool) -> Result<Option<Arc<C::Client>>> {
        if let Some(found) = self.current_client(reopen).await {
            return Ok(found);
        }

        let _creating = self.creating.lock().await;
        // Another caller may have created the client while we waited
        if let Some(found) = self.current_client(reopen).await {
            return Ok(found);
        }

        let connecting = tokio::time::timeout(self.probe_timeout, self.connector.connect());
        let client = match connecting.await {
            Ok(Ok(client)) => Arc::new(client),
            Ok(Err(e)) => return Err(CacheError::ConnectFailed(format!("{:#}", e))),
            Err(_) => {
                return Err(CacheError::ConnectFailed(format!(
                    "connecting to store timed out after {}ms",
                    self.probe_timeout.as_millis()
                )))
            }
        };

        {
            let mut state = self.state.lock().await;
            if matches!(*state, PoolState::Closed) && !reopen {
                // Shut down while connecting
                drop(state);
                client.close().await;
                return Ok(None);
            }
            *state = PoolState::Ready {
                client: Arc::clone(&client),
                created_at: Utc::now(),
            };
        }
        *self.last_health.write().await = None;
        info!(capacity = self.capacity, "Store client created");

        Ok(Some(client))
    }

    /// `Some` when the state alone settles the request: the ready client, or
    /// `None` for a closed pool that may not be reopened.
    async fn current_client(&self, reopen: bool) -> Option<Option<Arc<C::Client>>> {
        match &*self.state.lock().await {
            PoolState::Ready { client, .. } => Some(Some(Arc::clone(client))),
            PoolState::Closed if !reopen => Some(None),
            _ => None,
        }
    }

    /// Pings outside the state lock, bounded by the probe timeout.
    async fn probe(&self, client: &C::Client) -> bool {
        let healthy = match tokio::time::timeout(self.probe_timeout, client.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(error = ?e, "Store probe failed");
                false
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.probe_timeout.as_millis() as u64,
                    "Store probe timed out"
                );
                false
            }
        };

        self.record_health(healthy).await;
        healthy
    }

    async fn record_health(&self, healthy: bool) {
        *self.last_health.write().await = Some(HealthRecord {
            healthy,
            checked_at: Utc::now(),
        });
    }
}

#[async_trait]
impl<C: StoreConnector> HealthProbe for ConnectionManager<C> {
    async fn health_check(&self) -> bool {
        ConnectionManager::health_check(self).await
    }

    async fn pool_stats(&self) -> PoolStats {
        self.stats_snapshot().await
    }
}
