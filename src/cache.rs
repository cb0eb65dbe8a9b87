//! Rendered page cache with time-based and on-demand regeneration.
//!
//! Entries are keyed by request path. A gallery selection is its own entry,
//! `<path>?imagen=<asset>`, and is dropped whenever `<path>` is regenerated.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct CachedPage {
    pub html: Arc<str>,
    pub etag: String,
    pub generated_at: Instant,
}

impl CachedPage {
    pub fn new(html: String) -> Self {
        let etag = etag_for(&html);
        Self {
            html: Arc::from(html),
            etag,
            generated_at: Instant::now(),
        }
    }

    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.generated_at)
    }
}

/// Strong ETag: quoted hex SHA-256 of the body.
pub fn etag_for(html: &str) -> String {
    let digest = Sha256::digest(html.as_bytes());
    format!("\"{}\"", hex::encode(digest))
}

pub struct PageCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedPage>>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The entry for `key` if it is younger than the TTL.
    pub fn get_fresh(&self, key: &str) -> Option<CachedPage> {
        self.get_fresh_at(key, Instant::now())
    }

    pub fn get_fresh_at(&self, key: &str, now: Instant) -> Option<CachedPage> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|page| page.age_at(now) < self.ttl)
            .cloned()
    }

    /// Any entry for `key`, fresh or not.
    pub fn get(&self, key: &str) -> Option<CachedPage> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, html: String) -> CachedPage {
        let page = CachedPage::new(html);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.into(), page.clone());
        page
    }

    /// Drops `path` and every query variant of it. Returns how many entries went away.
    pub fn remove_path(&self, path: &str) -> usize {
        let variant_prefix = format!("{}?", path);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|key, _| key != path && !key.starts_with(&variant_prefix));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
