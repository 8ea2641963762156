//! In-memory TTL cache for service responses, backed by `DashMap`.

use std::fmt;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Identifies one cacheable response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Countries,
    Insights,
    /// Geography files are keyed by their absolute URL.
    Geography(String),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Countries => write!(f, "countries"),
            CacheKey::Insights => write!(f, "insights"),
            CacheKey::Geography(url) => write!(f, "geography:{}", url),
        }
    }
}

struct CacheEntry {
    body: String,
    expires_at: Instant,
}

/// Thread-safe response cache with time-to-live expiration.
///
/// Values are stored as serialized JSON. Expired entries are evicted lazily
/// on the next lookup of the same key.
pub struct ResponseCache {
    store: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached body for `key`, or `None` if missing or expired.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        let entry = self.store.get(key)?;
        if Instant::now() > entry.expires_at {
            drop(entry);
            self.store.remove(key);
            tracing::debug!("Cache entry '{}' expired", key);
            return None;
        }
        Some(entry.body.clone())
    }

    pub fn set(&self, key: CacheKey, body: String) {
        self.store.insert(
            key,
            CacheEntry {
                body,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn invalidate(&self, key: &CacheKey) {
        self.store.remove(key);
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
