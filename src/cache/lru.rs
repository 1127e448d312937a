//! LRU Cache Module
//!
//! Fixed-capacity store with least-recently-used eviction and no notion of time.

use std::borrow::Borrow;
use std::hash::Hash;

use linked_hash_map::LinkedHashMap;

use crate::error::{CacheError, Result};

// == LRU Cache ==
/// Count-bounded cache evicting the least recently used key on overflow.
///
/// Recency order lives in a `LinkedHashMap`:
/// - Front = Least recently used
/// - Back = Most recently used
///
/// Both `get` hits and `set` count as a use.
#[derive(Debug)]
pub struct LruCache<K: Eq + Hash, V> {
    entries: LinkedHashMap<K, V>,
    capacity: usize,
}

impl<K: Eq + Hash, V> LruCache<K, V> {
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// A capacity of zero is a configuration error.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "LRU capacity must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            entries: LinkedHashMap::new(),
            capacity,
        })
    }

    // == Get ==
    /// Returns the value for `key` and promotes it to most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + Hash,
    {
        self.entries.get_refresh(key).map(|value| &*value)
    }

    // == Set ==
    /// Stores `value` under `key`, promoting it to most recently used.
    ///
    /// If the key is new and the cache is full, the least recently used entry
    /// is evicted first and returned.
    pub fn set(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.entries.remove(&key).is_some() {
            self.entries.insert(key, value);
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };

        self.entries.insert(key, value);
        evicted
    }

    // == Has ==
    /// Checks presence without touching recency order.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + Hash,
    {
        self.entries.contains_key(key)
    }

    // == Remove ==
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + Hash,
    {
        self.entries.remove(key)
    }

    // == Peek Oldest ==
    /// Returns the key that would be evicted next.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.entries.front().map(|(key, _)| key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
