//! TTL Cache Module
//!
//! Unbounded store where every entry carries an absolute expiry.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

// == TTL Cache ==
/// Time-bounded cache with lazy deletion on access and an explicit sweep.
///
/// There is no capacity bound; memory is reclaimed by `get`/`has` on expired
/// keys and by periodic `cleanup()`.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    default_ttl: Duration,
}

impl<K: Eq + Hash + Clone, V> TtlCache<K, V> {
    // == Constructor ==
    /// Creates an empty cache. A zero default TTL is a configuration error.
    pub fn new(default_ttl: Duration) -> Result<Self> {
        if default_ttl.is_zero() {
            return Err(CacheError::InvalidConfig(
                "TTL must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            entries: HashMap::new(),
            default_ttl,
        })
    }

    // == Get ==
    /// Returns the value if present and not expired.
    ///
    /// An expired entry found here is deleted.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + Hash,
    {
        if self.evict_if_expired(key) {
            return None;
        }
        self.entries.get(key).map(|entry| &entry.value)
    }

    // == Set ==
    /// Stores `value`, expiring after `ttl` or the default TTL.
    ///
    /// Overwriting a key resets its expiry.
    pub fn set(&mut self, key: K, value: V, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        self.entries.insert(key, CacheEntry::new(value, Some(ttl)));
    }

    // == Has ==
    /// Checks for a live entry, deleting it if it has expired.
    pub fn has<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + Hash,
    {
        !self.evict_if_expired(key) && self.entries.contains_key(key)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + Hash,
    {
        self.entries.remove(key).map(|entry| entry.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn cleanup(&mut self) -> usize {
        self.drain_expired().len()
    }

    /// Removes all expired entries and returns their keys.
    pub fn drain_expired(&mut self) -> Vec<K> {
        let now = Instant::now();
        let expired: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns true if an expired entry for `key` was found and removed.
    fn evict_if_expired<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + Hash,
    {
        let expired = self
            .entries
            .get(key)
            .map(CacheEntry::is_expired)
            .unwrap_or(false);

        if expired {
            self.entries.remove(key);
        }
        expired
    }
}
