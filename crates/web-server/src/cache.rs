// In crates/web-server/src/cache.rs

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A bounded, insertion-ordered cache of finished backtest responses.
///
/// Cloning is cheap and every clone shares the same entries. When full, the
/// oldest entry is evicted first. Re-inserting an existing key replaces the
/// value and makes it the newest.
#[derive(Debug)]
pub struct ResultCache<V> {
    inner: Arc<Mutex<CacheInner<V>>>,
}

#[derive(Debug)]
struct CacheInner<V> {
    capacity: usize,
    entries: HashMap<String, V>,
    // Oldest first.
    order: VecDeque<String>,
}

impl<V> Clone for ResultCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Clone> ResultCache<V> {
    /// Creates a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(CacheInner {
                capacity,
                entries: HashMap::with_capacity(capacity),
                order: VecDeque::with_capacity(capacity),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner<V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.lock().entries.get(key).cloned()
    }

    /// The most recently inserted entry.
    pub fn latest(&self) -> Option<V> {
        let inner = self.lock();
        inner.order.back().and_then(|key| inner.entries.get(key)).cloned()
    }

    pub fn insert(&self, key: String, value: V) {
        let mut inner = self.lock();
        if inner.entries.contains_key(&key) {
            inner.order.retain(|k| k != &key);
        }
        while inner.order.len() >= inner.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                    tracing::debug!(run_key = %oldest, "Evicted cached result.");
                }
                None => break,
            }
        }
        inner.order.push_back(key.clone());
        inner.entries.insert(key, value);
    }

    /// Removes one entry. Returns whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        let mut inner = self.lock();
        let removed = inner.entries.remove(key).is_some();
        if removed {
            inner.order.retain(|k| k != key);
        }
        removed
    }

    /// Drops every entry and returns how many there were.
    pub fn clear(&self) -> usize {
        let mut inner = self.lock();
        let count = inner.entries.len();
        inner.entries.clear();
        inner.order.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
