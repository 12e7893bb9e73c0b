//! Response cache
//!
//! TTL + LRU memoization of assembled results, keyed by normalized input.
//! The cache is the only shared mutable state in the orchestrator; a
//! single `parking_lot::Mutex` guards the LRU map. Lookups and writes are
//! best-effort by construction: no method can fail, so cache trouble can
//! never fail the surrounding request.

use crate::config::CacheSettings;
use crate::core::types::{TaskKind, Usage};
use crate::utils::error::{OrchestratorError, Result};
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Cache key derived from normalized input and discriminating options
///
/// A pure function of (task, target language, lowercase-trimmed sanitized
/// text): two requests that should produce the same output always collide
/// on the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    task: TaskKind,
    lang: Option<String>,
    text_hash: u64,
}

impl CacheKey {
    pub fn derive(task: TaskKind, lang: Option<&str>, sanitized_text: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;

        let mut hasher = DefaultHasher::new();
        sanitized_text.trim().to_lowercase().hash(&mut hasher);
        Self {
            task,
            lang: lang.map(|l| l.to_ascii_lowercase()),
            text_hash: hasher.finish(),
        }
    }
}

/// Value memoized per key: the raw winning text plus accounting
///
/// Structured assembly is deterministic, so it is re-run on each hit
/// rather than stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedGeneration {
    pub text: String,
    pub model: String,
    pub usage: Usage,
}

struct Entry {
    value: CachedGeneration,
    expires_at: Instant,
}

impl Entry {
    fn new(value: CachedGeneration, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Lock-free hit/miss counters, snapshotted for the health endpoint
#[derive(Debug, Default)]
struct AtomicCacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

/// TTL + LRU response cache
pub struct ResponseCache {
    inner: Mutex<LruCache<CacheKey, Entry>>,
    ttl: Duration,
    capacity: usize,
    stats: AtomicCacheStats,
}

impl ResponseCache {
    pub fn new(settings: &CacheSettings) -> Result<Self> {
        let capacity = NonZeroUsize::new(settings.max_entries).ok_or_else(|| {
            OrchestratorError::config("cache.max_entries must be greater than 0")
        })?;
        Ok(Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl: Duration::from_secs(settings.ttl_secs),
            capacity: capacity.get(),
            stats: AtomicCacheStats::default(),
        })
    }

    /// Look up a fresh entry, refreshing its recency on hit
    pub fn get(&self, key: &CacheKey) -> Option<CachedGeneration> {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.get(key) {
            if !entry.is_expired() {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!(?key, "cache hit");
                return Some(entry.value.clone());
            }
            inner.pop(key);
            self.stats.expirations.fetch_add(1, Ordering::Relaxed);
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert or overwrite; the least-recently-used entry is evicted on overflow
    pub fn put(&self, key: CacheKey, value: CachedGeneration) {
        let entry = Entry::new(value, self.ttl);
        let mut inner = self.inner.lock();
        if inner.len() == self.capacity && !inner.contains(&key) {
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
        }
        inner.put(key, entry);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            evictions: self.stats.evictions.load(Ordering::Relaxed),
            expirations: self.stats.expirations.load(Ordering::Relaxed),
        }
    }
}
