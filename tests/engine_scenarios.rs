//! End-to-end engine behavior against a scripted fetcher.

mod common;

use batchfetch_core::cache::CacheProvider;
use batchfetch_core::config::BackoffConfig;
use batchfetch_core::engine::{EngineOptions, FetchEngine};
use common::{ids, StubBehavior, StubFetcher};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn options() -> EngineOptions {
    EngineOptions {
        window_size: 5,
        cache_ttl: Duration::from_secs(60),
        request_timeout: Duration::from_secs(5),
        backoff: BackoffConfig::default(),
    }
}

fn engine(stub: &Arc<StubFetcher>, cache: CacheProvider, options: EngineOptions) -> FetchEngine {
    FetchEngine::new(stub.clone(), cache, options).unwrap()
}

#[tokio::test]
async fn test_duplicate_within_window_is_fetched_once() {
    let stub = StubFetcher::new().into_shared();
    let engine = engine(&stub, CacheProvider::disabled(), options());

    let output = engine.run(&ids(&["a", "b", "a", "c", "d", "e", "f"])).await;
    let metadata = &output.metadata;

    assert_eq!(metadata.duplicate_ids_count, 1);
    assert_eq!(metadata.unique_duplicate_ids, vec!["a"]);
    assert_eq!(metadata.number_of_successful_ids, 6);
    assert_eq!(metadata.successful_ids.len(), 6);
    assert_eq!(metadata.number_of_failed_ids, 0);
    assert_eq!(output.results.len(), 6);
    assert_eq!(stub.call_count(), 6);
    assert!(metadata.is_balanced());
}

#[tokio::test]
async fn test_repeats_across_windows_are_not_duplicates() {
    let stub = StubFetcher::new().into_shared();
    let engine = engine(
        &stub,
        CacheProvider::disabled(),
        EngineOptions {
            window_size: 2,
            ..options()
        },
    );

    // "a" appears in window 0 and again in window 1; the disabled cache cannot help
    let output = engine.run(&ids(&["a", "b", "a", "c"])).await;
    assert_eq!(output.metadata.duplicate_ids_count, 0);
    assert_eq!(output.metadata.number_of_successful_ids, 4);
    assert_eq!(output.results.len(), 3);
    assert!(output.metadata.is_balanced());
}

#[cfg(feature = "cache-moka")]
#[tokio::test]
async fn test_prepopulated_cache_skips_fetch() {
    let cache = CacheProvider::in_memory(64);
    cache
        .set("x", "cached-x", Duration::from_secs(60))
        .await
        .unwrap();

    let stub = StubFetcher::new().into_shared();
    let engine = engine(&stub, cache, options());

    let output = engine.run(&ids(&["x"])).await;
    assert_eq!(stub.call_count(), 0);
    assert_eq!(output.metadata.cache_hits, 1);
    assert_eq!(output.metadata.number_of_api_calls, 0);
    assert_eq!(output.results.len(), 1);
    assert_eq!(output.results["x"], "cached-x");
    assert!(output.metadata.is_balanced());
}

#[cfg(feature = "cache-moka")]
#[tokio::test]
async fn test_second_run_is_served_from_cache() {
    let cache = CacheProvider::in_memory(64);
    let stub = StubFetcher::new().into_shared();
    let engine = engine(&stub, cache, options());
    let input = ids(&["p", "q", "r", "s", "t", "u", "v"]);

    let first = engine.run(&input).await;
    assert_eq!(stub.call_count(), 7);
    assert_eq!(first.metadata.cache_hits, 0);

    let second = engine.run(&input).await;
    assert_eq!(stub.call_count(), 7, "second run must not fetch");
    assert_eq!(second.metadata.cache_hits, 7);
    assert_eq!(second.metadata.number_of_successful_ids, 0);
    assert_eq!(second.results, first.results);
    assert!(second.metadata.is_balanced());
}

#[cfg(feature = "cache-moka")]
#[tokio::test]
async fn test_expired_entry_is_fetched_again() {
    let cache = CacheProvider::in_memory(64);
    let stub = StubFetcher::new().into_shared();
    let engine = engine(
        &stub,
        cache,
        EngineOptions {
            cache_ttl: Duration::from_millis(50),
            ..options()
        },
    );

    let first = engine.run(&ids(&["x"])).await;
    assert_eq!(first.metadata.number_of_successful_ids, 1);

    tokio::time::sleep(Duration::from_millis(300)).await;

    let second = engine.run(&ids(&["x"])).await;
    assert_eq!(second.metadata.cache_hits, 0, "entry outlived its TTL");
    assert_eq!(second.metadata.number_of_api_calls, 1);
    assert_eq!(stub.call_count(), 2);
    assert!(second.metadata.is_balanced());
}

#[cfg(feature = "cache-moka")]
#[tokio::test]
async fn test_cache_hit_is_not_counted_as_duplicate() {
    let cache = CacheProvider::in_memory(64);
    cache
        .set("a", "cached-a", Duration::from_secs(60))
        .await
        .unwrap();

    let stub = StubFetcher::new().into_shared();
    let engine = engine(&stub, cache, options());

    let output = engine.run(&ids(&["a", "a", "b"])).await;
    assert_eq!(output.metadata.duplicate_ids_count, 1);
    assert_eq!(output.metadata.cache_hits, 1);
    assert_eq!(output.metadata.number_of_successful_ids, 1);
    assert!(output.metadata.is_balanced());
}

#[tokio::test]
async fn test_in_flight_never_exceeds_window_size() {
    let stub = StubFetcher::new()
        .with_latency(Duration::from_millis(20))
        .into_shared();
    let engine = engine(&stub, CacheProvider::disabled(), options());

    let input: Vec<String> = (0..23).map(|i| format!("id-{i}")).collect();
    let output = engine.run(&input).await;

    assert_eq!(stub.call_count(), 23);
    assert!(stub.max_in_flight() <= 5, "saw {}", stub.max_in_flight());
    assert!(stub.max_in_flight() >= 2, "window should run concurrently");
    assert_eq!(output.results.len(), 23);
}

#[tokio::test]
async fn test_rate_limited_subset_is_counted() {
    let limited = ["b", "d", "g"];
    let stub = StubFetcher::new().rate_limiting(&limited).into_shared();
    let engine = engine(&stub, CacheProvider::disabled(), options());

    let output = engine
        .run(&ids(&["a", "b", "c", "d", "e", "f", "g", "h"]))
        .await;
    let metadata = &output.metadata;

    assert_eq!(metadata.count_429, limited.len());
    for id in limited {
        assert!(metadata.failed_ids.contains(&id.to_string()), "{id} not failed");
        assert!(!output.results.contains_key(id));
    }
    assert_eq!(metadata.number_of_failed_ids, 3);
    assert_eq!(metadata.number_of_successful_ids, 5);
    assert_eq!(metadata.number_of_api_calls, 8);
    assert!(metadata.is_balanced());
}

#[cfg(feature = "cache-moka")]
#[tokio::test]
async fn test_failures_never_reach_cache_or_results() {
    let cache = CacheProvider::in_memory(64);
    let stub = StubFetcher::new()
        .with_behavior("bad", StubBehavior::Fail(500))
        .with_behavior("limited", StubBehavior::RateLimited)
        .into_shared();
    let engine = engine(&stub, cache.clone(), options());

    let output = engine.run(&ids(&["good", "bad", "limited"])).await;

    assert_eq!(output.results.len(), 1);
    assert_eq!(
        cache.get("good").await.unwrap(),
        Some(StubFetcher::expected_payload("good"))
    );
    assert_eq!(cache.get("bad").await.unwrap(), None);
    assert_eq!(cache.get("limited").await.unwrap(), None);

    // Failed identifiers are retried live on the next run
    let second = engine.run(&ids(&["good", "bad", "limited"])).await;
    assert_eq!(second.metadata.cache_hits, 1);
    assert_eq!(stub.call_count(), 5);
}

#[tokio::test]
async fn test_hung_and_panicking_fetches_are_accounted() {
    let stub = StubFetcher::new()
        .with_behavior("hang", StubBehavior::Hang)
        .with_behavior("boom", StubBehavior::Panic)
        .into_shared();
    let engine = engine(
        &stub,
        CacheProvider::disabled(),
        EngineOptions {
            request_timeout: Duration::from_millis(100),
            ..options()
        },
    );

    let started = Instant::now();
    let output = engine.run(&ids(&["ok", "hang", "boom", "fine"])).await;

    assert!(started.elapsed() < Duration::from_secs(10));
    let metadata = &output.metadata;
    assert_eq!(metadata.number_of_failed_ids, 2);
    assert!(metadata.failed_ids.contains(&"hang".to_string()));
    assert!(metadata.failed_ids.contains(&"boom".to_string()));
    assert_eq!(metadata.count_429, 0);
    assert_eq!(output.results.len(), 2);
    assert!(metadata.is_balanced());
}

#[tokio::test]
async fn test_backoff_pauses_after_rate_limited_window() {
    let stub = StubFetcher::new().rate_limiting(&["a"]).into_shared();
    let engine = engine(
        &stub,
        CacheProvider::disabled(),
        EngineOptions {
            window_size: 1,
            backoff: BackoffConfig {
                enabled: true,
                min_delay_ms: 100,
                max_delay_ms: 100,
                factor: 1.0,
                max_times: 4,
            },
            ..options()
        },
    );

    let started = Instant::now();
    let output = engine.run(&ids(&["a", "b", "c"])).await;

    // Only the window after "a" pauses
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(100), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(2_000), "elapsed {elapsed:?}");
    assert_eq!(output.metadata.count_429, 1);
    assert_eq!(output.metadata.number_of_successful_ids, 2);
}
