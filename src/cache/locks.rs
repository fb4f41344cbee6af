//! Per-key lock table.
//!
//! Mutations of the same key must not interleave, but a single global lock
//! would serialize unrelated keys. The registry hands out one async mutex per
//! key and reference counts the entries: once nobody holds or waits for a
//! key's lock, the entry is removed, so the table only ever contains keys
//! that are in use right now.
//!
//! All clones of an entry's `Arc` are taken while the table lock is held, so
//! checking `Arc::strong_count` under that same lock is race-free.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type KeyLock = Arc<AsyncMutex<()>>;

/// Table of per-key async locks, owned by one cache instance.
#[derive(Debug, Default)]
pub struct LockRegistry {
    table: Mutex<HashMap<String, KeyLock>>,
}

impl LockRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    ///
    /// Concurrent callers with the same key share a single lock and are
    /// served one at a time; callers with different keys never block each
    /// other. The lock is released when the returned guard is dropped.
    pub async fn acquire(&self, key: &str) -> KeyGuard<'_> {
        let lock = {
            let mut table = self.table.lock();
            match table.get(key) {
                Some(lock) => lock.clone(),
                None => {
                    let lock = KeyLock::default();
                    table.insert(key.to_owned(), lock.clone());
                    lock
                }
            }
        };

        // Created before awaiting so a dropped acquire still releases the entry
        let lease = Lease {
            registry: self,
            key: key.to_owned(),
            lock: Some(lock.clone()),
        };
        let guard = lock.lock_owned().await;

        KeyGuard {
            _guard: guard,
            lease,
        }
    }

    /// Number of keys currently held or awaited.
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    /// Whether no key is currently held or awaited.
    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }

    /// Whether `key` currently has an entry.
    pub fn contains(&self, key: &str) -> bool {
        self.table.lock().contains_key(key)
    }

    fn release(&self, key: &str, lock: KeyLock) {
        let mut table = self.table.lock();
        drop(lock);
        if table
            .get(key)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            table.remove(key);
        }
    }
}

/// One caller's reference to a key's lock, held from lookup until release.
struct Lease<'a> {
    registry: &'a LockRegistry,
    key: String,
    lock: Option<KeyLock>,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        if let Some(lock) = self.lock.take() {
            self.registry.release(&self.key, lock);
        }
    }
}

/// Exclusive access to one key. Dropping it unlocks the key.
#[must_use = "the key is unlocked as soon as the guard is dropped"]
pub struct KeyGuard<'a> {
    // Field order matters: the mutex guard is released before the lease
    _guard: OwnedMutexGuard<()>,
    lease: Lease<'a>,
}

impl KeyGuard<'_> {
    /// The key this guard protects.
    pub fn key(&self) -> &str {
        &self.lease.key
    }
}

impl fmt::Debug for KeyGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyGuard").field("key", &self.key()).finish()
    }
}
