//! Cache Module
//!
//! Provides the LRU and TTL caches, named tiers built from them, singleflight
//! deduplication and the tiered manager that ties these together.

mod dedup;
mod entry;
mod lru;
mod manager;
mod stats;
mod tier;
mod ttl;


// Re-export public types
pub use dedup::{Outcome, RequestDeduplicator};
pub use entry::CacheEntry;
pub use lru::LruCache;
pub use manager::TieredCacheManager;
pub use stats::CacheStats;
pub use tier::{Tier, TierConfig, TierPolicy, TierStats};
pub use ttl::TtlCache;

// == Standard Tier Names ==
/// Count-bounded tier for frequently used, fully computed results
pub const HOT_TIER: &str = "hot";

/// Time-bounded tier for discovered schema metadata
pub const SCHEMA_TIER: &str = "schema";

/// Hybrid tier for general query results
pub const QUERY_TIER: &str = "query";
