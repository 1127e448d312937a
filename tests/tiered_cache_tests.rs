//! Integration Tests for the cache context
//!
//! Drives `CacheContext` end to end over an in-memory store connector.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tiered_cache::cache::{HOT_TIER, QUERY_TIER, SCHEMA_TIER};
use tiered_cache::pool::PoolStateKind;
use tiered_cache::{CacheContext, CacheError};
use tokio_test::{assert_err, assert_ok};

use common::{memory_store, test_config, MemoryConnector, StoreState};

// == Helper Functions ==

async fn create_context() -> (CacheContext<Value, MemoryConnector>, Arc<StoreState>) {
    let (connector, store) = memory_store();
    let context = CacheContext::init(&test_config(), connector).await.unwrap();
    (context, store)
}

async fn counted(
    context: &CacheContext<Value, MemoryConnector>,
    tier: &str,
    key: &str,
    calls: &Arc<AtomicUsize>,
    value: Value,
) -> tiered_cache::Result<Value> {
    let calls = Arc::clone(calls);
    context
        .get_or_compute(tier, key, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(value)
        })
        .await
}

// == Deduplication ==

#[tokio::test]
async fn test_concurrent_misses_compute_once() {
    let (context, _) = create_context().await;
    let calls = Arc::new(AtomicUsize::new(0));

    let (a, b, c, d) = tokio::join!(
        counted(&context, SCHEMA_TIER, "sales", &calls, json!(["id", "amount"])),
        counted(&context, SCHEMA_TIER, "sales", &calls, json!(["id", "amount"])),
        counted(&context, SCHEMA_TIER, "sales", &calls, json!(["id", "amount"])),
        counted(&context, SCHEMA_TIER, "sales", &calls, json!(["id", "amount"])),
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let a = a.unwrap();
    assert_eq!(a, b.unwrap());
    assert_eq!(a, c.unwrap());
    assert_eq!(a, d.unwrap());

    context.shutdown().await;
}

#[tokio::test]
async fn test_failure_is_shared_then_retried() {
    let (context, _) = create_context().await;
    let calls = Arc::new(AtomicUsize::new(0));

    let failing = || {
        let calls = Arc::clone(&calls);
        context.get_or_compute(QUERY_TIER, "report", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Err(anyhow::anyhow!("query timed out"))
        })
    };

    let (first, second) = tokio::join!(failing(), failing());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let first = first.unwrap_err();
    let second = second.unwrap_err();
    assert!(matches!(first, CacheError::ComputeFailed { .. }));
    assert!(std::ptr::eq(
        first.compute_cause().unwrap(),
        second.compute_cause().unwrap()
    ));

    // Nothing was stored, so the next call computes again
    let retry = counted(&context, QUERY_TIER, "report", &calls, json!({"rows": 2})).await;
    assert_eq!(retry.unwrap(), json!({"rows": 2}));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    context.shutdown().await;
}

// == Tier Isolation ==

#[tokio::test]
async fn test_clear_tier_leaves_other_tiers_intact() {
    let (context, _) = create_context().await;
    let calls = Arc::new(AtomicUsize::new(0));

    counted(&context, HOT_TIER, "k", &calls, json!(1)).await.unwrap();
    counted(&context, SCHEMA_TIER, "k", &calls, json!(2)).await.unwrap();

    context.clear_tier(Some(SCHEMA_TIER)).await.unwrap();

    let hot = counted(&context, HOT_TIER, "k", &calls, json!(99)).await.unwrap();
    assert_eq!(hot, json!(1));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let schema = counted(&context, SCHEMA_TIER, "k", &calls, json!(3)).await.unwrap();
    assert_eq!(schema, json!(3));
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    context.shutdown().await;
}

#[tokio::test]
async fn test_unknown_tier_is_rejected() {
    let (context, _) = create_context().await;
    let calls = Arc::new(AtomicUsize::new(0));

    let result = counted(&context, "cold", "k", &calls, json!(1)).await;
    assert!(matches!(result, Err(CacheError::UnknownTier(name)) if name == "cold"));
    assert_err!(context.clear_tier(Some("cold")).await);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    context.shutdown().await;
}

#[tokio::test]
async fn test_hot_tier_evicts_least_recently_used() {
    let (context, _) = create_context().await;
    let calls = Arc::new(AtomicUsize::new(0));

    // test_config caps the hot tier at three entries
    for key in ["a", "b", "c"] {
        counted(&context, HOT_TIER, key, &calls, json!(key)).await.unwrap();
    }
    counted(&context, HOT_TIER, "a", &calls, json!("a")).await.unwrap();
    counted(&context, HOT_TIER, "d", &calls, json!("d")).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 4);

    counted(&context, HOT_TIER, "a", &calls, json!("a")).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 4, "promoted key should survive");

    counted(&context, HOT_TIER, "b", &calls, json!("b")).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 5, "oldest key should be evicted");

    let hot = &context.tier_stats().await[0];
    assert_eq!(hot.name, HOT_TIER);
    assert_eq!(hot.size, 3);
    assert!(hot.counters.evictions >= 2);

    context.shutdown().await;
}

// == Expiry ==

#[tokio::test(start_paused = true)]
async fn test_schema_entry_expires_after_ttl() {
    let (context, _) = create_context().await;
    let calls = Arc::new(AtomicUsize::new(0));
    let columns = json!(["id", "region", "amount"]);

    let first = counted(&context, SCHEMA_TIER, "sales", &calls, columns.clone())
        .await
        .unwrap();
    assert_eq!(first.as_array().map(Vec::len), Some(3));

    tokio::time::advance(Duration::from_secs(1)).await;
    let second = counted(&context, SCHEMA_TIER, "sales", &calls, json!([]))
        .await
        .unwrap();
    assert_eq!(second, columns);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_secs(600)).await;
    counted(&context, SCHEMA_TIER, "sales", &calls, columns.clone())
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    context.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_manual_maintenance_sweeps_expired_entries() {
    let (context, _) = create_context().await;
    let calls = Arc::new(AtomicUsize::new(0));

    counted(&context, SCHEMA_TIER, "a", &calls, json!(1)).await.unwrap();
    counted(&context, QUERY_TIER, "b", &calls, json!(2)).await.unwrap();

    // Past the query TTL (300s) but inside the schema TTL (600s)
    tokio::time::advance(Duration::from_secs(301)).await;
    let report = context.maintenance().await;

    assert!(report.pool_healthy);
    let swept: Vec<_> = report
        .swept
        .iter()
        .map(|s| (s.tier.as_str(), s.removed))
        .collect();
    assert!(swept.contains(&(SCHEMA_TIER, 0)));
    assert!(swept.iter().any(|(tier, _)| *tier == QUERY_TIER));

    let stats = context.tier_stats().await;
    let query = stats.iter().find(|t| t.name == QUERY_TIER).unwrap();
    assert_eq!(query.size, 0);
    let schema = stats.iter().find(|t| t.name == SCHEMA_TIER).unwrap();
    assert_eq!(schema.size, 1);

    context.shutdown().await;
}

// == Connection Lifecycle ==

#[tokio::test]
async fn test_health_check_false_after_shutdown_true_after_acquire() {
    let (context, store) = create_context().await;

    assert!(context.health_check().await);
    assert_eq!(store.connects(), 1);

    context.shutdown().await;
    assert!(!context.health_check().await);
    assert_eq!(store.closes(), 1);

    assert_ok!(context.acquire().await);
    assert!(context.health_check().await);
    assert_eq!(store.connects(), 2);

    context.shutdown().await;
}

#[tokio::test]
async fn test_warm_up_connects_during_init() {
    let (connector, store) = memory_store();
    let mut config = test_config();
    config.warm_up_on_start = true;

    let context: CacheContext<Value, _> = CacheContext::init(&config, connector).await.unwrap();
    assert_eq!(store.connects(), 1);

    let snapshot = context.stats_snapshot().await;
    assert_eq!(snapshot.pool.state, PoolStateKind::Ready);
    assert!(snapshot.pool.healthy);
    assert_eq!(snapshot.pool.capacity, 4);
    assert_eq!(snapshot.pool.approximate_idle, 3);

    context.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_store_does_not_block_init() {
    let (connector, store) = memory_store();
    store.set_down(true);
    let mut config = test_config();
    config.warm_up_on_start = true;

    let context: CacheContext<Value, _> = CacheContext::init(&config, connector).await.unwrap();
    assert!(!context.health_check().await);
    assert!(matches!(
        context.acquire().await,
        Err(CacheError::ConnectFailed(_))
    ));

    store.set_down(false);
    assert!(context.health_check().await);

    context.shutdown().await;
}

#[tokio::test]
async fn test_init_rejects_invalid_config() {
    let (connector, _) = memory_store();
    let mut config = test_config();
    config.hot_tier_capacity = 0;

    let result = CacheContext::<Value, _>::init(&config, connector).await;
    assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_shutdown_is_idempotent() {
    let (context, store) = create_context().await;

    assert_ok!(context.acquire().await);
    context.shutdown().await;
    context.shutdown().await;

    assert_eq!(store.closes(), 1);
}
