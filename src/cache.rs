//! Key-value cache in front of upstream fetches.
//!
//! Keys are the exact upstream URLs; values are the raw response bodies.
//! Content behind a gist or raw-file URL never changes once created, so
//! entries have no expiry and are never invalidated. The in-process store
//! still evicts least-recently-used entries to stay within its bounds; an
//! evicted entry is simply fetched again.

use async_trait::async_trait;
use lru::LruCache;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the stored body for `key`, if any.
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String);
}

/// Builds the cache selected by `config`: none, Redis, or the in-process store.
pub async fn from_config(config: &Config) -> Result<Option<Arc<dyn CacheStore>>> {
    if !config.enable_cache {
        return Ok(None);
    }

    let cache: Arc<dyn CacheStore> = match &config.redis_url {
        Some(url) => {
            info!("Caching gist and raw-content responses in Redis");
            Arc::new(RedisCache::connect(url).await?)
        }
        None => {
            info!(
                "Caching gist and raw-content responses in memory (max {} entries, {} bytes)",
                config.cache_max_entries, config.cache_max_bytes
            );
            Arc::new(MemoryCache::with_limits(config.cache_max_entries, config.cache_max_bytes))
        }
    };
    Ok(Some(cache))
}

/// In-process LRU cache bounded by entry count and total body size.
pub struct MemoryCache {
    inner: Mutex<Bounded>,
}

struct Bounded {
    entries: LruCache<String, String>,
    bytes: usize,
    max_bytes: usize,
}

impl Default for MemoryCache {
    fn default() -> Self {
        let defaults = Config::default();
        Self::with_limits(defaults.cache_max_entries, defaults.cache_max_bytes)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(max_entries: usize, max_bytes: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Bounded {
                entries: LruCache::new(capacity),
                bytes: 0,
                max_bytes,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Total size of the stored bodies.
    pub fn bytes(&self) -> usize {
        self.lock().bytes
    }

    // Values are write-once per URL, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, Bounded> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    async fn set(&self, key: &str, value: String) {
        let mut inner = self.lock();
        let size = value.len();
        if size > inner.max_bytes {
            debug!("Not caching {} ({} bytes exceeds the cache size)", key, size);
            return;
        }

        // push hands back either the replaced value or the evicted LRU entry
        if let Some((_, old)) = inner.entries.push(key.to_string(), value) {
            inner.bytes = inner.bytes.saturating_sub(old.len());
        }
        inner.bytes += size;

        while inner.bytes > inner.max_bytes {
            match inner.entries.pop_lru() {
                Some((_, old)) => inner.bytes = inner.bytes.saturating_sub(old.len()),
                None => break,
            }
        }
    }
}

/// Cache kept in Redis, shared by every server process pointing at it.
///
/// Redis failures are logged and read as misses; the search then goes upstream.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| AppError::Config(format!("Invalid Redis URL: {}", e)))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Config(format!("Failed to connect to Redis: {}", e)))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        let result: RedisResult<Option<String>> = conn.get(key).await;
        result.unwrap_or_else(|e| {
            warn!("Redis GET {} failed: {}", key, e);
            None
        })
    }

    async fn set(&self, key: &str, value: String) {
        let mut conn = self.conn.clone();
        let result: RedisResult<()> = conn.set(key, value).await;
        if let Err(e) = result {
            warn!("Redis SET {} failed: {}", key, e);
        }
    }
}
