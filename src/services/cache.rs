use std::time::Duration;

use crate::models::SequenceWindow;

/// In-process cache of fetched reference windows
///
/// Windows are immutable reference data, so a hit is always safe to reuse
/// until the entry's TTL expires.
#[derive(Clone)]
pub struct WindowCache {
    inner: moka::future::Cache<String, SequenceWindow>,
}

impl WindowCache {
    /// Create a cache holding at most `max_entries` windows
    pub fn new(max_entries: u64, ttl_secs: u64) -> Self {
        let inner = moka::future::CacheBuilder::new(max_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { inner }
    }

    pub async fn get(&self, key: &str) -> Option<SequenceWindow> {
        let hit = self.inner.get(key).await;
        if hit.is_some() {
            tracing::trace!("Window cache hit: {}", key);
        }
        hit
    }

    pub async fn insert(&self, key: String, window: SequenceWindow) {
        self.inner.insert(key, window).await;
    }

    pub async fn invalidate(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a sequence window
    pub fn window(genome: &str, chromosome: &str, start: u64, end: u64) -> String {
        format!("window:{}:{}:{}-{}", genome, chromosome, start, end)
    }
}
