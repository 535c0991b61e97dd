//! Keyed response cache shared by the screens.
//!
//! Values are stored type-erased under a [`QueryKey`]; a read downcasts back
//! to the caller's type. Invalidation marks entries stale by key prefix so the
//! next [`QueryCache::fetch`] goes to the network again. Concurrent fetches of
//! one key are not deduplicated: whichever completes last owns the entry.

use crate::errors::Result;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Hierarchical cache key, e.g. `["schedule", "2024-09-02"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(root: impl Into<String>) -> Self {
        Self(vec![root.into()])
    }

    /// Append one segment.
    pub fn with(mut self, part: impl ToString) -> Self {
        self.0.push(part.to_string());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

impl From<&str> for QueryKey {
    fn from(root: &str) -> Self {
        Self::new(root)
    }
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    stale: bool,
}

#[derive(Clone, Default)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<QueryKey, Entry>>>,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries.read().len())
            .finish()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, stale or not.
    pub fn get<T: Clone + Send + Sync + 'static>(&self, key: &QueryKey) -> Option<T> {
        self.entries
            .read()
            .get(key)
            .and_then(|entry| entry.value.downcast_ref::<T>())
            .cloned()
    }

    pub fn set<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) {
        self.entries.write().insert(
            key,
            Entry {
                value: Arc::new(value),
                stale: false,
            },
        );
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries.read().get(key).is_none_or(|entry| entry.stale)
    }

    /// Return the fresh cached value or run `fetcher` and cache its result.
    ///
    /// Errors are returned without touching the entry.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !self.is_stale(&key) {
            if let Some(value) = self.get::<T>(&key) {
                tracing::trace!(%key, "query cache hit");
                return Ok(value);
            }
        }

        tracing::debug!(%key, "fetching query");
        let value = fetcher().await?;
        self.set(key, value.clone());
        Ok(value)
    }

    /// Mark every entry under `prefix` stale. Returns how many were marked.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.entries.write();
        let mut marked = 0;
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.stale = true;
                marked += 1;
            }
        }
        tracing::debug!(%prefix, marked, "invalidated queries");
        marked
    }

    pub fn remove(&self, key: &QueryKey) {
        self.entries.write().remove(key);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
