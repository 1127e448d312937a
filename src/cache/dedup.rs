//! Request Deduplication Module
//!
//! Coalesces concurrent requests for the same key into a single computation.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Settled result shared by every waiter on one key.
pub type Outcome<V> = std::result::Result<V, Arc<anyhow::Error>>;

type Flight<V> = Shared<BoxFuture<'static, Outcome<V>>>;

struct Registration<V> {
    id: u64,
    flight: Flight<V>,
}

// == Request Deduplicator ==
/// Singleflight registry: at most one in-flight computation per key.
///
/// The computation is spawned onto the runtime, so it runs to completion even
/// if every caller waiting on it is cancelled. It removes its own registration
/// before publishing its outcome, which means a caller that has observed the
/// outcome always starts a fresh computation on its next call.
pub struct RequestDeduplicator<K, V> {
    in_flight: Arc<Mutex<HashMap<K, Registration<V>>>>,
    next_id: AtomicU64,
}

impl<K, V> RequestDeduplicator<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + std::fmt::Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    // == Run ==
    /// Runs `make` for `key` unless a computation for `key` is already in
    /// flight, in which case its outcome is awaited instead and `make` is
    /// never called.
    ///
    /// Failures are shared with every waiter and never retained: once the
    /// computation settles the key is free again.
    pub async fn run<F, Fut>(&self, key: K, make: F) -> Outcome<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let flight = {
            let mut in_flight = self.in_flight.lock().await;
            match in_flight.get(&key) {
                Some(registration) => {
                    debug!(key = ?key, "Joining in-flight computation");
                    registration.flight.clone()
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let flight = self.launch(key.clone(), id, make());
                    in_flight.insert(
                        key,
                        Registration {
                            id,
                            flight: flight.clone(),
                        },
                    );
                    flight
                }
            }
        };

        flight.await
    }

    /// Number of keys with a computation currently in flight.
    pub async fn in_flight(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    fn launch<Fut>(&self, key: K, id: u64, compute: Fut) -> Flight<V>
    where
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let registry = Arc::clone(&self.in_flight);

        let task = tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(compute).catch_unwind().await {
                Ok(result) => result.map_err(Arc::new),
                Err(_) => {
                    warn!(key = ?key, "Computation panicked");
                    Err(Arc::new(anyhow::anyhow!("computation panicked")))
                }
            };

            let mut in_flight = registry.lock().await;
            if in_flight.get(&key).map(|r| r.id) == Some(id) {
                in_flight.remove(&key);
            }
            outcome
        });

        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => Err(Arc::new(anyhow::anyhow!("computation aborted: {}", e))),
            }
        }
        .boxed()
        .shared()
    }
}

impl<K, V> Default for RequestDeduplicator<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + std::fmt::Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
