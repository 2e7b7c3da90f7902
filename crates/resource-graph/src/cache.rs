//! # Graph Cache
//!
//! The [`Cache`] collaborator memoizes whole assembled graphs. The engine only ever
//! reads and writes the entire result of a build under the key carried by the root
//! [`DataFunction`](crate::DataFunction); it never caches individual nodes or
//! relationships. A change anywhere in a cached graph means invalidating the whole entry.

use crate::error::SourceError;
use crate::function::CacheKey;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Payload family stored under a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CacheKind {
    #[default]
    Json,
    Data,
}

/// External store for serialized graphs.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Whether caching is currently switched on.
    fn use_caching(&self) -> bool;

    async fn read(&self, key: &CacheKey, kind: CacheKind) -> Result<Option<String>, SourceError>;

    async fn save(&self, key: &CacheKey, blob: String, kind: CacheKind) -> Result<(), SourceError>;
}

/// In-process [`Cache`] backed by a map, with read and save counters.
///
/// Useful for single-process deployments and for asserting cache behaviour in tests.
#[derive(Debug, Default)]
pub struct MemoryCache {
    enabled: bool,
    entries: RwLock<HashMap<(CacheKey, CacheKind), String>>,
    reads: AtomicUsize,
    saves: AtomicUsize,
}

impl MemoryCache {
    /// An enabled, empty cache.
    pub fn new() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// A cache that reports `use_caching() == false`, so builds bypass it.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Number of `read` calls served so far, hits and misses alike.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drops the entry stored under `key`, returning whether one existed.
    pub async fn invalidate(&self, key: &CacheKey, kind: CacheKind) -> bool {
        self.entries
            .write()
            .await
            .remove(&(key.clone(), kind))
            .is_some()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    fn use_caching(&self) -> bool {
        self.enabled
    }

    async fn read(&self, key: &CacheKey, kind: CacheKind) -> Result<Option<String>, SourceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let entry = self.entries.read().await.get(&(key.clone(), kind)).cloned();
        debug!(%key, hit = entry.is_some(), "Cache read");
        Ok(entry)
    }

    async fn save(&self, key: &CacheKey, blob: String, kind: CacheKind) -> Result<(), SourceError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        debug!(%key, bytes = blob.len(), "Cache save");
        self.entries.write().await.insert((key.clone(), kind), blob);
        Ok(())
    }
}
