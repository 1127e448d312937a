//! Tier Module
//!
//! A named cache partition with its own policy and its own lock.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::cache::{CacheStats, LruCache, TtlCache};
use crate::error::Result;

// == Tier Policy ==
/// How a tier bounds its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierPolicy {
    /// At most `capacity` entries, least recently used evicted first
    Bounded { capacity: usize },
    /// Entries valid for `ttl` after insertion, no count bound
    Expiring { ttl: Duration },
    /// Both a count bound and a validity window
    Hybrid { capacity: usize, ttl: Duration },
}

impl TierPolicy {
    pub fn capacity(&self) -> Option<usize> {
        match self {
            TierPolicy::Bounded { capacity } | TierPolicy::Hybrid { capacity, .. } => {
                Some(*capacity)
            }
            TierPolicy::Expiring { .. } => None,
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        match self {
            TierPolicy::Expiring { ttl } | TierPolicy::Hybrid { ttl, .. } => Some(*ttl),
            TierPolicy::Bounded { .. } => None,
        }
    }

    /// Whether maintenance has anything to sweep in this tier.
    pub fn is_time_bounded(&self) -> bool {
        self.ttl().is_some()
    }
}

impl fmt::Display for TierPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierPolicy::Bounded { capacity } => write!(f, "lru(capacity={})", capacity),
            TierPolicy::Expiring { ttl } => write!(f, "ttl({}ms)", ttl.as_millis()),
            TierPolicy::Hybrid { capacity, ttl } => {
                write!(f, "lru(capacity={})+ttl({}ms)", capacity, ttl.as_millis())
            }
        }
    }
}

// == Tier Config ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierConfig {
    pub name: String,
    pub policy: TierPolicy,
}

impl TierConfig {
    pub fn bounded(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            policy: TierPolicy::Bounded { capacity },
        }
    }

    pub fn expiring(name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            name: name.into(),
            policy: TierPolicy::Expiring { ttl },
        }
    }

    pub fn hybrid(name: impl Into<String>, capacity: usize, ttl: Duration) -> Self {
        Self {
            name: name.into(),
            policy: TierPolicy::Hybrid { capacity, ttl },
        }
    }
}

// == Tier Stats ==
/// Point-in-time view of one tier.
#[derive(Debug, Clone, Serialize)]
pub struct TierStats {
    pub name: String,
    pub size: usize,
    /// Human-readable bound, e.g. `lru(capacity=100)` or `ttl(600000ms)`
    pub capacity_or_ttl: String,
    pub capacity: Option<usize>,
    pub ttl_ms: Option<u64>,
    #[serde(flatten)]
    pub counters: CacheStats,
    pub hit_rate: f64,
}

// == Backing Store ==
enum Lookup<V> {
    Hit(V),
    Miss,
    Expired,
}

/// The cache(s) behind a tier.
///
/// A hybrid tier keeps values in the LRU and mirrors each key's expiry in a
/// `TtlCache<String, ()>`; a key is live only while present in both.
#[derive(Debug)]
enum Backing<V> {
    Bounded(LruCache<String, V>),
    Expiring(TtlCache<String, V>),
    Hybrid {
        values: LruCache<String, V>,
        expiry: TtlCache<String, ()>,
    },
}

impl<V: Clone> Backing<V> {
    fn new(policy: TierPolicy) -> Result<Self> {
        Ok(match policy {
            TierPolicy::Bounded { capacity } => Backing::Bounded(LruCache::new(capacity)?),
            TierPolicy::Expiring { ttl } => Backing::Expiring(TtlCache::new(ttl)?),
            TierPolicy::Hybrid { capacity, ttl } => Backing::Hybrid {
                values: LruCache::new(capacity)?,
                expiry: TtlCache::new(ttl)?,
            },
        })
    }

    fn lookup(&mut self, key: &str) -> Lookup<V> {
        match self {
            Backing::Bounded(lru) => match lru.get(key) {
                Some(value) => Lookup::Hit(value.clone()),
                None => Lookup::Miss,
            },
            Backing::Expiring(ttl) => {
                let before = ttl.len();
                if let Some(value) = ttl.get(key).cloned() {
                    return Lookup::Hit(value);
                }
                if ttl.len() < before {
                    Lookup::Expired
                } else {
                    Lookup::Miss
                }
            }
            Backing::Hybrid { values, expiry } => {
                let before = expiry.len();
                if !expiry.has(key) {
                    values.remove(key);
                    return if expiry.len() < before {
                        Lookup::Expired
                    } else {
                        Lookup::Miss
                    };
                }
                match values.get(key) {
                    Some(value) => Lookup::Hit(value.clone()),
                    None => {
                        expiry.remove(key);
                        Lookup::Miss
                    }
                }
            }
        }
    }

    /// Stores a value, returning true if an LRU eviction made room for it.
    fn store(&mut self, key: String, value: V) -> bool {
        match self {
            Backing::Bounded(lru) => lru.set(key, value).is_some(),
            Backing::Expiring(ttl) => {
                ttl.set(key, value, None);
                false
            }
            Backing::Hybrid { values, expiry } => {
                expiry.set(key.clone(), (), None);
                match values.set(key, value) {
                    Some((evicted, _)) => {
                        expiry.remove(&evicted);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    fn sweep(&mut self) -> usize {
        match self {
            Backing::Bounded(_) => 0,
            Backing::Expiring(ttl) => ttl.cleanup(),
            Backing::Hybrid { values, expiry } => {
                let expired = expiry.drain_expired();
                for key in &expired {
                    values.remove(key);
                }
                expired.len()
            }
        }
    }

    fn clear(&mut self) {
        match self {
            Backing::Bounded(lru) => lru.clear(),
            Backing::Expiring(ttl) => ttl.clear(),
            Backing::Hybrid { values, expiry } => {
                values.clear();
                expiry.clear();
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            Backing::Bounded(lru) => lru.len(),
            Backing::Expiring(ttl) => ttl.len(),
            Backing::Hybrid { values, .. } => values.len(),
        }
    }
}

#[derive(Debug)]
struct TierState<V> {
    backing: Backing<V>,
    stats: CacheStats,
}

// == Tier ==
/// One named partition. Every operation runs inside the tier's own
/// critical section and never awaits anything while holding it.
#[derive(Debug)]
pub struct Tier<V> {
    name: String,
    policy: TierPolicy,
    state: Mutex<TierState<V>>,
}

impl<V: Clone> Tier<V> {
    pub fn new(config: TierConfig) -> Result<Self> {
        Ok(Self {
            state: Mutex::new(TierState {
                backing: Backing::new(config.policy)?,
                stats: CacheStats::new(),
            }),
            name: config.name,
            policy: config.policy,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> TierPolicy {
        self.policy
    }

    // == Get ==
    /// Returns a live value, promoting it where the policy tracks recency.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.fetch(key, true).await
    }

    /// Second look after a recorded miss. Neither a hit nor a miss here is
    /// counted, since the caller's lookup was already counted once.
    pub async fn recheck(&self, key: &str) -> Option<V> {
        self.fetch(key, false).await
    }

    async fn fetch(&self, key: &str, count_lookup: bool) -> Option<V> {
        let mut state = self.state.lock().await;
        match state.backing.lookup(key) {
            Lookup::Hit(value) => {
                if count_lookup {
                    state.stats.record_hit();
                }
                Some(value)
            }
            Lookup::Expired => {
                state.stats.record_expirations(1);
                if count_lookup {
                    state.stats.record_miss();
                }
                None
            }
            Lookup::Miss => {
                if count_lookup {
                    state.stats.record_miss();
                }
                None
            }
        }
    }

    // == Insert ==
    pub async fn insert(&self, key: String, value: V) {
        let mut state = self.state.lock().await;
        if state.backing.store(key, value) {
            state.stats.record_eviction();
        }
    }

    // == Cleanup ==
    /// Sweeps expired entries. Always 0 for a purely count-bounded tier.
    pub async fn cleanup(&self) -> usize {
        let mut state = self.state.lock().await;
        let removed = state.backing.sweep();
        state.stats.record_expirations(removed);
        removed
    }

    /// Drops every entry. Counters are kept.
    pub async fn clear(&self) {
        self.state.lock().await.backing.clear();
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.backing.len()
    }

    pub async fn stats(&self) -> TierStats {
        let state = self.state.lock().await;
        TierStats {
            name: self.name.clone(),
            size: state.backing.len(),
            capacity_or_ttl: self.policy.to_string(),
            capacity: self.policy.capacity(),
            ttl_ms: self.policy.ttl().map(|ttl| ttl.as_millis() as u64),
            hit_rate: state.stats.hit_rate(),
            counters: state.stats.clone(),
        }
    }
}
