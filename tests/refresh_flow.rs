//! Integration tests for the freshness layer
//!
//! Exercises the cache, the file-backed store and the refresh orchestrator
//! together, the way the application wires them up, with a scripted fetcher
//! standing in for the network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tempfile::TempDir;

use matchday::cache::{cache_key, CacheManager};
use matchday::cancel::CancelToken;
use matchday::fixtures::{FetchError, FetchFixtures, Fixture};
use matchday::refresh::{FixturesOrchestrator, RefreshConfig, ResolveOptions};
use matchday::store::{FileStore, KeyValueStore};

const URL: &str = "https://fixtures.test/v1/fixtures";

fn fixture(id: &str) -> Fixture {
    Fixture {
        id: id.to_string(),
        home_team: format!("Home {}", id),
        away_team: format!("Away {}", id),
        kickoff: "2026-08-08T19:30:00Z".parse().unwrap(),
        competition: Some("Test League".to_string()),
        venue: None,
        status: Default::default(),
        home_score: None,
        away_score: None,
    }
}

/// Fetcher that pops scripted results and counts calls.
struct ScriptedFetcher {
    results: Mutex<VecDeque<Result<Vec<Fixture>, FetchError>>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    fn new(results: Vec<Result<Vec<Fixture>, FetchError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FetchFixtures for ScriptedFetcher {
    fn fetch(
        &self,
        _url: &str,
        _token: CancelToken,
    ) -> BoxFuture<'static, Result<Vec<Fixture>, FetchError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self
            .results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        async move { result }.boxed()
    }
}

#[tokio::test]
async fn test_full_flow_network_then_cache_on_disk() {
    let temp_dir = TempDir::new().expect("temp dir");
    let store = Arc::new(FileStore::with_dir(temp_dir.path().to_path_buf()));
    let cache = CacheManager::new(store.clone());
    let fetcher = Arc::new(ScriptedFetcher::new(vec![Ok(vec![
        fixture("a"),
        fixture("b"),
    ])]));

    let orchestrator =
        FixturesOrchestrator::new(RefreshConfig::new(URL), cache, fetcher.clone());
    orchestrator.resolve(ResolveOptions::default()).await;

    let state = orchestrator.snapshot();
    assert_eq!(state.fixtures.len(), 2);
    assert!(state.error.is_none());
    assert_eq!(fetcher.calls(), 1);

    // The entry landed in the on-disk store under the URL-derived key.
    let raw = store
        .get(&cache_key(URL))
        .expect("store read")
        .expect("entry present");
    assert!(raw.contains("Home a"));
    assert!(raw.contains("ttl_ms"));
}

#[tokio::test]
async fn test_cache_survives_within_a_session_and_feeds_swr() {
    let temp_dir = TempDir::new().expect("temp dir");
    let store = Arc::new(FileStore::with_dir(temp_dir.path().to_path_buf()));
    let cache = CacheManager::new(store.clone());

    // First orchestrator fetches from the network and populates the cache.
    let first_fetcher = Arc::new(ScriptedFetcher::new(vec![Ok(vec![fixture("a")])]));
    let first = FixturesOrchestrator::new(
        RefreshConfig::new(URL),
        cache.clone(),
        first_fetcher.clone(),
    );
    first.resolve(ResolveOptions::default()).await;
    assert_eq!(first_fetcher.calls(), 1);

    // A second orchestrator in the same session adopts the cached list
    // immediately, then revalidates once in the background.
    let second_fetcher = Arc::new(ScriptedFetcher::new(vec![Ok(vec![
        fixture("a"),
        fixture("b"),
    ])]));
    let second =
        FixturesOrchestrator::new(RefreshConfig::new(URL), cache, second_fetcher.clone());
    second.resolve(ResolveOptions::default()).await;

    let state = second.snapshot();
    assert_eq!(state.fixtures.len(), 1, "cached list adopted synchronously");
    assert!(!state.is_loading);

    tokio::time::sleep(Duration::from_millis(100)).await;
    let state = second.snapshot();
    assert_eq!(state.fixtures.len(), 2, "background correction applied");
    assert_eq!(second_fetcher.calls(), 1);
}

#[tokio::test]
async fn test_new_session_sweeps_the_disk_cache() {
    let temp_dir = TempDir::new().expect("temp dir");
    let store = Arc::new(FileStore::with_dir(temp_dir.path().to_path_buf()));

    let first_session = CacheManager::new(store.clone());
    first_session.write(&cache_key(URL), &vec![fixture("a")], Duration::from_secs(3600));
    assert!(first_session
        .read::<Vec<Fixture>>(&cache_key(URL))
        .is_some());

    // A fresh CacheManager over the same directory models a new process
    // start; predecessor entries must not be readable.
    let second_session = CacheManager::new(store);
    assert!(second_session
        .read::<Vec<Fixture>>(&cache_key(URL))
        .is_none());
}

#[tokio::test]
async fn test_failed_refresh_keeps_cached_data_on_screen() {
    let temp_dir = TempDir::new().expect("temp dir");
    let store = Arc::new(FileStore::with_dir(temp_dir.path().to_path_buf()));
    let cache = CacheManager::new(store);
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        Ok(vec![fixture("a")]),
        Err(FetchError::Status(502)),
    ]));

    let orchestrator = FixturesOrchestrator::new(RefreshConfig::new(URL), cache, fetcher);
    orchestrator.resolve(ResolveOptions::default()).await;
    orchestrator
        .resolve(ResolveOptions::forced_background())
        .await;

    let state = orchestrator.snapshot();
    assert_eq!(state.fixtures.len(), 1, "previous fixtures retained");
    assert!(state.error.expect("error set").contains("502"));
}
