use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per key, created on demand and dropped once unused.
pub struct KeyedLocks<K: Eq + Hash + Clone> {
    locks: Arc<DashMap<K, Arc<Mutex<()>>>>,
}

pub struct KeyedGuard<K: Eq + Hash + Clone> {
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<DashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Waits until the key is free.
    pub async fn lock(&self, key: K) -> KeyedGuard<K> {
        let mutex = self.mutex_for(&key);
        let guard = mutex.lock_owned().await;
        self.guard(key, guard)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    fn mutex_for(&self, key: &K) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn guard(&self, key: K, guard: OwnedMutexGuard<()>) -> KeyedGuard<K> {
        KeyedGuard {
            key,
            guard: Some(guard),
            locks: self.locks.clone(),
        }
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> Drop for KeyedGuard<K> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map still references the mutex: nobody holds or awaits it.
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
