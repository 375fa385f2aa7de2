//! Read-mostly cache filled lazily under a single lock.
//!
//! Lookups take the shared lock. A miss releases it, builds the value
//! without holding any lock, then takes the exclusive lock and checks again
//! before inserting, so a key never holds more than one value and every
//! caller racing on the same key gets the same `Arc`.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::RwLock;
use tracing::debug;

pub struct LazyCache<K, V> {
    entries: RwLock<HashMap<K, Arc<V>>>,
    /// Bumped by every `clear`, under the write lock
    generation: AtomicU64,
    builds: AtomicUsize,
}

impl<K, V> Default for LazyCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
            builds: AtomicUsize::new(0),
        }
    }
}

impl<K, V> LazyCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Returns the cached value for `key`, building it on a miss.
    ///
    /// A value whose build started before a `clear` is handed back to its
    /// caller but not inserted.
    pub async fn get_or_try_build<F, Fut, E>(&self, key: &K, build: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let generation = {
            let entries = self.entries.read().await;
            if let Some(value) = entries.get(key) {
                return Ok(Arc::clone(value));
            }
            self.generation.load(Ordering::Acquire)
        };

        let built = Arc::new(build().await?);
        self.builds.fetch_add(1, Ordering::Relaxed);

        let mut entries = self.entries.write().await;
        if let Some(existing) = entries.get(key) {
            debug!(?key, "Discarding value built concurrently with another caller");
            return Ok(Arc::clone(existing));
        }
        if self.generation.load(Ordering::Acquire) != generation {
            debug!(?key, "Cache invalidated during build, not inserting");
            return Ok(built);
        }

        entries.insert(key.clone(), Arc::clone(&built));
        Ok(built)
    }

    /// Drops every entry; later lookups rebuild.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Number of values built so far, including discarded ones
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}
