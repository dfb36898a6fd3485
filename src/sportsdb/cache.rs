//! In-process response cache for upstream fetches.
//!
//! Each fetch carries [`CacheOptions`]: a revalidate window (ISR-style, an
//! entry is served until it is older than the window), a cache mode (static
//! or always-fresh) and invalidation tags. Entries are keyed by full URL and
//! only successful responses are stored. Expired entries are pruned on every
//! insert and the map never holds more than its capacity; when full, the
//! oldest entry is evicted.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Keep until invalidated (static pages)
    ForceCache,
    /// Always go upstream, never store
    NoStore,
}

/// Per-call caching hints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheOptions {
    pub revalidate: Option<Duration>,
    pub mode: Option<CacheMode>,
    pub tags: Vec<String>,
}

impl CacheOptions {
    pub fn revalidate(window: Duration) -> Self {
        CacheOptions {
            revalidate: Some(window),
            ..Default::default()
        }
    }

    pub fn force_cache() -> Self {
        CacheOptions {
            mode: Some(CacheMode::ForceCache),
            ..Default::default()
        }
    }

    pub fn no_store() -> Self {
        CacheOptions {
            mode: Some(CacheMode::NoStore),
            ..Default::default()
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    fn policy(&self) -> Policy {
        match (self.mode, self.revalidate) {
            (Some(CacheMode::NoStore), _) => Policy::Bypass,
            (_, Some(window)) => Policy::Ttl(window),
            _ => Policy::Static,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Policy {
    Bypass,
    Ttl(Duration),
    Static,
}

struct Entry {
    body: Value,
    stored_at: Instant,
    ttl: Option<Duration>,
    tags: Vec<String>,
}

impl Entry {
    fn is_fresh(&self) -> bool {
        self.ttl.map_or(true, |ttl| self.stored_at.elapsed() < ttl)
    }
}

pub const DEFAULT_MAX_ENTRIES: usize = 2048;

#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    max_entries: usize,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }
}

impl ResponseCache {
    pub fn with_capacity(max_entries: usize) -> Self {
        ResponseCache {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_entries: max_entries.max(1),
        }
    }

    /// Cached body for `url` if the options allow serving one and it is fresh.
    pub async fn get(&self, url: &str, options: &CacheOptions) -> Option<Value> {
        if options.policy() == Policy::Bypass {
            return None;
        }
        let entries = self.entries.read().await;
        let entry = entries.get(url)?;
        if entry.is_fresh() {
            debug!("cache hit: {}", url);
            Some(entry.body.clone())
        } else {
            debug!("cache stale: {}", url);
            None
        }
    }

    pub async fn put(&self, url: &str, body: &Value, options: &CacheOptions) {
        let ttl = match options.policy() {
            Policy::Bypass => return,
            Policy::Ttl(window) => Some(window),
            Policy::Static => None,
        };
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.is_fresh());
        if !entries.contains_key(url) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.stored_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                debug!("cache full, evicting {}", oldest);
                entries.remove(&oldest);
            }
        }
        entries.insert(
            url.to_string(),
            Entry {
                body: body.clone(),
                stored_at: Instant::now(),
                ttl,
                tags: options.tags.clone(),
            },
        );
    }

    /// Drop every entry carrying `tag`. Returns how many were removed.
    pub async fn invalidate_tag(&self, tag: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| !e.tags.iter().any(|t| t == tag));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
