//! Stale-while-revalidate refresh orchestration
//!
//! The orchestrator composes the TTL cache with a fixtures fetcher. A
//! resolution first tries the cache and adopts a hit immediately, then
//! silently corrects it with a forced background fetch; misses go straight
//! to the network. Revalidation is also driven by a recurring timer and by
//! terminal focus, both feeding the same `resolve` entry point. Within one
//! orchestrator at most one request is ever in flight: starting a new one
//! cancels the pending one, and a sequence number guarantees that a
//! superseded request's settlement is discarded instead of applied.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use crate::cache::{cache_key, CacheManager};
use crate::cancel::{cancel_pair, CancelHandle};
use crate::fixtures::{FetchFixtures, Fixture};

/// Default period for timer- and focus-driven revalidation
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Default time-to-live for cached fixture lists
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Configuration for the refresh orchestrator
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Fixtures endpoint URL
    pub url: String,
    /// Period between forced background revalidations
    pub interval: Duration,
    /// Time-to-live applied to cache entries written on successful fetches
    pub cache_ttl: Duration,
}

impl RefreshConfig {
    /// Creates a config for `url` with default interval and TTL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            interval: DEFAULT_REFRESH_INTERVAL,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Snapshot of the orchestrator's state, published to consumers on change.
#[derive(Debug, Clone, Default)]
pub struct FixturesState {
    /// Current fixture list, in server order. A failed refresh never blanks
    /// a previously shown list.
    pub fixtures: Vec<Fixture>,
    /// True only during the very first foreground resolution, before any
    /// data has ever been shown
    pub is_loading: bool,
    /// True while a background revalidation is in flight
    pub is_refreshing: bool,
    /// Last fetch failure, cleared at the start of every attempt
    pub error: Option<String>,
    /// Time of the most recent successful resolution (cache or network)
    pub last_fetched: Option<DateTime<Utc>>,
}

/// How a single resolution should behave
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Skip the cache and go straight to the network
    pub force_fresh: bool,
    /// Report progress through `is_refreshing` instead of `is_loading`
    pub background: bool,
}

impl ResolveOptions {
    /// The revalidation shape used by the timer, focus handling and the
    /// stale-while-revalidate leg.
    pub fn forced_background() -> Self {
        Self {
            force_fresh: true,
            background: true,
        }
    }
}

/// Mutable core guarded by one mutex: the published state plus the request
/// bookkeeping that orders resolutions.
struct ResolveState {
    state: FixturesState,
    /// Monotonic id of the newest request; settlements from older ids are
    /// discarded (last writer wins)
    seq: u64,
    /// Cancel handle for the request currently in flight, if any
    in_flight: Option<CancelHandle>,
    /// Whether any resolution has ever succeeded
    has_resolved: bool,
    torn_down: bool,
}

struct Inner {
    config: RefreshConfig,
    cache: CacheManager,
    fetcher: Arc<dyn FetchFixtures>,
    resolve_state: Mutex<ResolveState>,
    state_tx: watch::Sender<FixturesState>,
    shutdown_tx: watch::Sender<bool>,
}

/// Stale-while-revalidate orchestrator for one fixtures endpoint.
///
/// Clones share the same instance; consumers read state through
/// `subscribe`/`snapshot` and trigger work through `refresh`/`on_visible`.
/// No other mutation path is exposed.
#[derive(Clone)]
pub struct FixturesOrchestrator {
    inner: Arc<Inner>,
}

impl FixturesOrchestrator {
    /// Creates an orchestrator without starting any background activity.
    /// Most callers want [`FixturesOrchestrator::spawn`] instead.
    pub fn new(config: RefreshConfig, cache: CacheManager, fetcher: Arc<dyn FetchFixtures>) -> Self {
        let (state_tx, _) = watch::channel(FixturesState::default());
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                config,
                cache,
                fetcher,
                resolve_state: Mutex::new(ResolveState {
                    state: FixturesState::default(),
                    seq: 0,
                    in_flight: None,
                    has_resolved: false,
                    torn_down: false,
                }),
                state_tx,
                shutdown_tx,
            }),
        }
    }

    /// Creates an orchestrator, runs an immediate initial resolution, and
    /// starts the recurring revalidation timer.
    ///
    /// The timer always resolves with `force_fresh`, bypassing the cache, so
    /// the displayed data converges on the server even if focus-driven
    /// refresh never fires. It stops when `shutdown` is called.
    pub fn spawn(
        config: RefreshConfig,
        cache: CacheManager,
        fetcher: Arc<dyn FetchFixtures>,
    ) -> Self {
        let orchestrator = Self::new(config, cache, fetcher);

        let initial = orchestrator.clone();
        tokio::spawn(async move {
            initial.resolve(ResolveOptions::default()).await;
        });

        let periodic = orchestrator.clone();
        let mut shutdown_rx = orchestrator.inner.shutdown_tx.subscribe();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(periodic.inner.config.interval);
            // Skip the immediate first tick; the initial resolution covers it.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        debug!("Timer-driven revalidation");
                        periodic.resolve(ResolveOptions::forced_background()).await;
                    }
                    _ = shutdown_rx.changed() => {
                        break;
                    }
                }
            }
        });

        orchestrator
    }

    /// Resolves the fixture list according to `opts`.
    ///
    /// Cache-preferring resolutions adopt a valid cached list immediately
    /// and then queue one detached forced background resolution to correct
    /// it. Otherwise the previous in-flight request is cancelled and a new
    /// network request is awaited; only the newest request's settlement is
    /// ever applied to state.
    pub async fn resolve(&self, opts: ResolveOptions) {
        if self.lock_state().torn_down {
            return;
        }

        if !opts.force_fresh && self.adopt_cached() {
            // Stale-while-revalidate: the consumer already sees the cached
            // list; a silent correction lands shortly after. A forced
            // resolution never consults the cache, so the network leg is
            // entered directly.
            let follow_up = self.clone();
            tokio::spawn(async move {
                follow_up
                    .resolve_network(ResolveOptions::forced_background())
                    .await;
            });
            return;
        }

        self.resolve_network(opts).await;
    }

    /// Attempts to serve the current URL from cache. Returns true on hit.
    fn adopt_cached(&self) -> bool {
        let key = cache_key(&self.inner.config.url);
        let Some(fixtures) = self.inner.cache.read::<Vec<Fixture>>(&key) else {
            return false;
        };

        debug!(count = fixtures.len(), "Adopted cached fixtures");
        let mut guard = self.lock_state();
        if guard.torn_down {
            return true;
        }
        guard.state.fixtures = fixtures;
        guard.state.is_loading = false;
        guard.state.error = None;
        guard.state.last_fetched = Some(Utc::now());
        guard.has_resolved = true;
        self.publish(&guard);
        true
    }

    /// Runs the network leg of a resolution.
    async fn resolve_network(&self, opts: ResolveOptions) {
        let (handle, token) = cancel_pair();

        let my_seq = {
            let mut guard = self.lock_state();
            if guard.torn_down {
                return;
            }
            guard.seq += 1;
            // A newer request supersedes whatever is still pending.
            if let Some(previous) = guard.in_flight.replace(handle) {
                previous.cancel();
            }
            guard.state.error = None;
            if opts.background {
                guard.state.is_refreshing = true;
            } else if !guard.has_resolved {
                guard.state.is_loading = true;
            }
            self.publish(&guard);
            guard.seq
        };

        let result = self
            .inner
            .fetcher
            .fetch(&self.inner.config.url, token)
            .await;

        let mut guard = self.lock_state();
        if guard.torn_down || guard.seq != my_seq {
            // Superseded while in flight; a newer request owns the state now.
            return;
        }
        guard.in_flight = None;

        match result {
            Ok(fixtures) => {
                debug!(count = fixtures.len(), "Fetched fixtures");
                let key = cache_key(&self.inner.config.url);
                self.inner
                    .cache
                    .write(&key, &fixtures, self.inner.config.cache_ttl);
                guard.state.fixtures = fixtures;
                guard.state.last_fetched = Some(Utc::now());
                guard.state.error = None;
                guard.has_resolved = true;
            }
            Err(err) if err.is_cancelled() => {
                // Expected control flow; nothing to report and no flags to
                // flip, those belong to the request that replaced us.
                return;
            }
            Err(err) => {
                debug!(error = %err, "Fixtures fetch failed");
                guard.state.error = Some(err.to_string());
            }
        }

        guard.state.is_loading = false;
        guard.state.is_refreshing = false;
        self.publish(&guard);
    }

    /// Manual refresh entry point for consumers.
    ///
    /// `force` runs a forced background resolution; otherwise a normal
    /// cache-preferring resolution is used. Detached either way so it can be
    /// called from synchronous input handling.
    pub fn refresh(&self, force: bool) {
        let opts = if force {
            ResolveOptions::forced_background()
        } else {
            ResolveOptions::default()
        };
        let this = self.clone();
        tokio::spawn(async move {
            this.resolve(opts).await;
        });
    }

    /// Signal that the host terminal became visible or focused again.
    ///
    /// Triggers a forced background resolution only if at least one refresh
    /// period has elapsed since the last successful resolution, so a focus
    /// change right after a timer tick does not fetch twice.
    pub fn on_visible(&self) {
        let due = {
            let guard = self.lock_state();
            if guard.torn_down {
                return;
            }
            match guard.state.last_fetched {
                Some(at) => Utc::now()
                    .signed_duration_since(at)
                    .to_std()
                    .map(|elapsed| elapsed >= self.inner.config.interval)
                    .unwrap_or(false),
                None => true,
            }
        };

        if due {
            debug!("Focus-driven revalidation");
            let this = self.clone();
            tokio::spawn(async move {
                this.resolve(ResolveOptions::forced_background()).await;
            });
        }
    }

    /// Subscribes to state snapshots. The receiver holds the latest state
    /// immediately.
    pub fn subscribe(&self) -> watch::Receiver<FixturesState> {
        self.inner.state_tx.subscribe()
    }

    /// Returns the current state snapshot.
    pub fn snapshot(&self) -> FixturesState {
        self.inner.state_tx.borrow().clone()
    }

    /// Tears the orchestrator down: cancels any in-flight request, stops the
    /// timer task, and prevents every later resolution from mutating state.
    pub fn shutdown(&self) {
        let mut guard = self.lock_state();
        guard.torn_down = true;
        if let Some(handle) = guard.in_flight.take() {
            handle.cancel();
        }
        drop(guard);
        let _ = self.inner.shutdown_tx.send(true);
    }

    fn lock_state(&self) -> MutexGuard<'_, ResolveState> {
        // Lock poisoning cannot happen: no code path panics while holding it.
        self.inner
            .resolve_state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, guard: &MutexGuard<'_, ResolveState>) {
        // send_replace stores the snapshot even when nobody subscribes.
        self.inner.state_tx.send_replace(guard.state.clone());
    }
}
