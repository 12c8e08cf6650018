use std::time::Duration;

use seqkit::cache::ValueCache;
use seqkit::error::{SeqError, SeqResult};
use tokio_test::{assert_err, assert_ok};

#[test]
fn test_computes_once() {
    let mut cache = ValueCache::new();
    let mut calls = 0;

    let first = *cache.get_or_compute(|| {
        calls += 1;
        42
    });
    let second = *cache.get_or_compute(|| {
        calls += 1;
        0
    });

    assert_eq!((first, second), (42, 42));
    assert_eq!(calls, 1);
    assert_eq!((cache.hits(), cache.misses()), (1, 1));
}

#[test]
fn test_failed_computation_leaves_cache_empty() {
    let mut cache: ValueCache<String> = ValueCache::default();

    let failed: SeqResult<&String> = cache.get_or_try_compute(|| Err(SeqError::EmptySequence));
    assert_err!(failed);
    assert!(!cache.is_cached());

    let value = assert_ok!(cache.get_or_try_compute(|| Ok::<_, SeqError>("ready".to_string())));
    assert_eq!(value, "ready");
    assert!(cache.is_cached());
}

#[test]
fn test_invalidate() {
    let mut cache = ValueCache::with_value(7);
    assert_eq!(*cache.get_or_compute(|| 0), 7);
    assert_eq!(cache.invalidate(), Some(7));
    assert_eq!(*cache.get_or_compute(|| 8), 8);
}

#[tokio::test]
async fn test_async_hit_does_not_run_computation() {
    let mut cache = ValueCache::new();

    let value = *cache
        .get_or_compute_async(|| async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            "expensive"
        })
        .await;
    assert_eq!(value, "expensive");

    let cached = *cache
        .get_or_compute_async(|| async { panic!("cache hit must not recompute") })
        .await;
    assert_eq!(cached, "expensive");
    assert_eq!(cache.hits(), 1);
}
