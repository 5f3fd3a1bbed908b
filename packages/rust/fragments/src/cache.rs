//! Session-scoped fragment cache.
//!
//! Keys are absolute fragment URLs. Entries are never evicted; the fragment
//! set is small and fixed. Only successful fetches are stored.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;

/// In-memory map from absolute fragment URL to fetched text.
#[derive(Debug, Default)]
pub struct FragmentCache {
    entries: Mutex<HashMap<String, String>>,
    /// One gate per URL so concurrent loads of the same fragment fetch once.
    gates: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl FragmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached text for `url`, if a previous fetch succeeded.
    pub async fn get(&self, url: &str) -> Option<String> {
        self.entries.lock().await.get(url).cloned()
    }

    pub async fn insert(&self, url: &str, text: String) {
        self.entries.lock().await.insert(url.to_string(), text);
    }

    /// Number of cached fragments.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Loads served from the cache.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Loads that went to the network.
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// The per-URL gate serializing network fetches of one fragment.
    pub(crate) async fn gate(&self, url: &str) -> Arc<Mutex<()>> {
        self.gates
            .lock()
            .await
            .entry(url.to_string())
            .or_default()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_get() {
        let cache = FragmentCache::new();
        assert!(cache.is_empty().await);
        assert_eq!(cache.get("https://x/a.md").await, None);

        cache.insert("https://x/a.md", "# A".into()).await;
        assert_eq!(cache.get("https://x/a.md").await.as_deref(), Some("# A"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn same_url_shares_one_gate() {
        let cache = FragmentCache::new();
        let a = cache.gate("https://x/a.md").await;
        let b = cache.gate("https://x/a.md").await;
        let c = cache.gate("https://x/c.md").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn hit_counter_is_separate_from_misses() {
        let cache = FragmentCache::new();
        cache.record_hit();
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 0);
    }
}
