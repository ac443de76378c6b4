//! Caching layer for computed isochrones.
//!
//! Nearby origins and similar budgets produce nearly identical isochrones,
//! so the key is coarsened: coordinates are rounded to a fixed number of
//! decimal places and budgets to the nearest bucket. The walking limit is
//! part of the key (to the metre) so two limits never share an entry.
//!
//! Every entry is computed with its key's budget rather than the budget of
//! whichever request filled it, so a hit never depends on request order.
//!
//! A cached `NoResult` is stored like any other outcome: a hit on it is
//! distinct from a miss.
//!
//! Eviction is FIFO by default: once full, the entry inserted longest ago is
//! dropped, whether or not it has been read since. An LRU store backed by
//! moka is available through [`CachePolicy::Lru`].

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use moka::policy::EvictionPolicy;
use moka::sync::Cache as MokaCache;
use serde::Serialize;
use tracing::debug;

use crate::isochrone::{IsochroneOutcome, Origin};

/// Which entry to drop when the cache is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Drop the oldest inserted entry.
    #[default]
    Fifo,
    /// Drop the least recently used entry.
    Lru,
}

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Decimal places kept from latitude and longitude.
    pub coord_precision: u32,

    /// Budget bucket size in seconds.
    pub budget_granularity_secs: u32,

    /// Maximum number of cached entries.
    pub max_capacity: usize,

    /// Eviction policy once `max_capacity` is reached.
    pub policy: CachePolicy,
}

impl CacheConfig {
    /// Returns a copy using the given eviction policy.
    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns a copy with the given capacity.
    pub fn with_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            coord_precision: 3,
            budget_granularity_secs: 900, // 15 minutes
            max_capacity: 256,
            policy: CachePolicy::Fifo,
        }
    }
}

/// Cache key: (rounded lat, rounded lon, rounded budget, walk limit in metres).
///
/// Coordinates are stored as scaled integers so the key is `Eq + Hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    lat: i64,
    lon: i64,
    budget_sec: u32,
    walk_m: u32,
}

impl CacheKey {
    /// Build the key for a request under `config`.
    pub fn new(origin: Origin, budget_sec: u32, walk_limit_m: f64, config: &CacheConfig) -> Self {
        let scale = 10f64.powi(config.coord_precision as i32);
        Self {
            lat: (origin.lat * scale).round() as i64,
            lon: (origin.lon * scale).round() as i64,
            budget_sec: round_budget(budget_sec, config.budget_granularity_secs),
            walk_m: walk_limit_m.round().clamp(0.0, f64::from(u32::MAX)) as u32,
        }
    }

    /// The budget every request with this key is answered for (seconds).
    pub fn budget_sec(&self) -> u32 {
        self.budget_sec
    }
}

/// Round a budget to the nearest multiple of the granularity.
///
/// Budgets that would round down to zero are kept exact, so short queries
/// still get an answer; they cannot collide with a rounded budget, which is
/// always at least one granularity step. A granularity of zero disables
/// rounding.
fn round_budget(budget_sec: u32, granularity_secs: u32) -> u32 {
    if granularity_secs == 0 {
        return budget_sec;
    }
    let bucket = budget_sec.saturating_add(granularity_secs / 2) / granularity_secs;
    match bucket.saturating_mul(granularity_secs) {
        0 => budget_sec,
        rounded => rounded,
    }
}

/// Storage backend for cached outcomes.
///
/// Implementations are shared between request handlers and must do their
/// own locking.
pub trait IsochroneStore: Send + Sync {
    /// Look up an entry.
    fn get(&self, key: &CacheKey) -> Option<IsochroneOutcome>;

    /// Insert or replace an entry, evicting if over capacity.
    fn insert(&self, key: CacheKey, outcome: IsochroneOutcome);

    /// Number of stored entries.
    fn len(&self) -> usize;

    /// Check whether the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
struct FifoInner {
    entries: HashMap<CacheKey, IsochroneOutcome>,
    order: VecDeque<CacheKey>,
}

/// Bounded store evicting the oldest inserted entry.
pub struct FifoStore {
    inner: RwLock<FifoInner>,
    capacity: usize,
}

impl FifoStore {
    /// Create an empty store holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(FifoInner::default()),
            capacity,
        }
    }
}

impl IsochroneStore for FifoStore {
    fn get(&self, key: &CacheKey) -> Option<IsochroneOutcome> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.entries.get(key).cloned()
    }

    fn insert(&self, key: CacheKey, outcome: IsochroneOutcome) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        // Replacing keeps the original insertion position
        if inner.entries.insert(key, outcome).is_some() {
            return;
        }
        inner.order.push_back(key);

        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }
    }

    fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.entries.len()
    }
}

/// Bounded store evicting the least recently used entry.
pub struct LruStore {
    entries: MokaCache<CacheKey, IsochroneOutcome>,
}

impl LruStore {
    /// Create an empty store holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        let entries = MokaCache::builder()
            .max_capacity(capacity as u64)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self { entries }
    }
}

impl IsochroneStore for LruStore {
    fn get(&self, key: &CacheKey) -> Option<IsochroneOutcome> {
        self.entries.get(key)
    }

    fn insert(&self, key: CacheKey, outcome: IsochroneOutcome) {
        self.entries.insert(key, outcome);
    }

    fn len(&self) -> usize {
        // Moka applies evictions lazily
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }
}

/// Hit/miss counters and current size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Isochrone cache: key derivation over an injected store.
pub struct IsochroneCache {
    store: Arc<dyn IsochroneStore>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl IsochroneCache {
    /// Create a cache whose store follows `config.policy`.
    pub fn new(config: &CacheConfig) -> Self {
        let store: Arc<dyn IsochroneStore> = match config.policy {
            CachePolicy::Fifo => Arc::new(FifoStore::new(config.max_capacity)),
            CachePolicy::Lru => Arc::new(LruStore::new(config.max_capacity)),
        };
        Self::with_store(config, store)
    }

    /// Create a cache over an existing store.
    pub fn with_store(config: &CacheConfig, store: Arc<dyn IsochroneStore>) -> Self {
        Self {
            store,
            config: config.clone(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Compute the key for a request.
    pub fn key(&self, origin: Origin, budget_sec: u32, walk_limit_m: f64) -> CacheKey {
        CacheKey::new(origin, budget_sec, walk_limit_m, &self.config)
    }

    /// Get a cached outcome.
    pub fn get(&self, key: &CacheKey) -> Option<IsochroneOutcome> {
        let found = self.store.get(key);
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(?key, "Isochrone cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(?key, "Isochrone cache miss");
        }
        found
    }

    /// Insert an outcome into the cache.
    pub fn insert(&self, key: CacheKey, outcome: IsochroneOutcome) {
        self.store.insert(key, outcome);
    }

    /// Return the cached outcome for `key`, computing and storing it on a miss.
    ///
    /// Concurrent misses on the same key may both compute; the later insert
    /// wins.
    pub fn get_or_compute(
        &self,
        key: CacheKey,
        compute: impl FnOnce() -> IsochroneOutcome,
    ) -> IsochroneOutcome {
        if let Some(cached) = self.get(&key) {
            return cached;
        }
        let outcome = compute();
        self.insert(key, outcome.clone());
        outcome
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.store.len(),
        }
    }
}
