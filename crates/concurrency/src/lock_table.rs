//! Per-key lock table
//!
//! Hands out one reentrant lock per key. Callers that touch the same logical
//! resource (one chunk) serialize on the same lock; different keys never
//! contend beyond the brief table lookup.
//!
//! The table only holds weak references. When the last [`Arc<KeyLock>`] for a
//! key is dropped, the lock removes its own entry.

use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};
use rustc_hash::FxHashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use tracing::trace;

// =============================================================================
// KeyLock
// =============================================================================

/// Reentrant lock bound to one key
pub struct KeyLock<K: Hash + Eq> {
    key: K,
    mutex: ReentrantMutex<()>,
    table: Weak<TableInner<K>>,
}

impl<K: Hash + Eq> KeyLock<K> {
    /// Key this lock guards
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Block until the lock is held; the owning thread may lock again
    pub fn lock(&self) -> ReentrantMutexGuard<'_, ()> {
        self.mutex.lock()
    }

    /// Take the lock if no other thread holds it
    pub fn try_lock(&self) -> Option<ReentrantMutexGuard<'_, ()>> {
        self.mutex.try_lock()
    }

    /// Whether any thread holds the lock
    pub fn is_locked(&self) -> bool {
        self.mutex.is_locked()
    }
}

impl<K: Hash + Eq + fmt::Debug> fmt::Debug for KeyLock<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyLock")
            .field("key", &self.key)
            .field("locked", &self.mutex.is_locked())
            .finish()
    }
}

impl<K: Hash + Eq> Drop for KeyLock<K> {
    fn drop(&mut self) {
        let Some(table) = self.table.upgrade() else {
            return;
        };
        let mut entries = table.entries.lock();
        // A concurrent `get` may already have replaced the dead entry.
        let ours = entries
            .get(&self.key)
            .is_some_and(|weak| std::ptr::eq(weak.as_ptr(), self));
        if ours {
            entries.remove(&self.key);
            trace!(target: "chunkform::locks", remaining = entries.len(), "Key lock reclaimed");
        }
    }
}

// =============================================================================
// KeyLockTable
// =============================================================================

struct TableInner<K: Hash + Eq> {
    entries: Mutex<FxHashMap<K, Weak<KeyLock<K>>>>,
}

/// Table of per-key locks
///
/// Cloning the table shares the same entries.
///
/// ```rust
/// use chunkform_concurrency::KeyLockTable;
/// use std::sync::Arc;
///
/// let table = KeyLockTable::new();
/// let a = table.get(&(3, -7));
/// let b = table.get(&(3, -7));
/// assert!(Arc::ptr_eq(&a, &b));
/// drop((a, b));
/// assert_eq!(table.len(), 0);
/// ```
pub struct KeyLockTable<K: Hash + Eq> {
    inner: Arc<TableInner<K>>,
}

impl<K: Hash + Eq + Clone> KeyLockTable<K> {
    /// Create an empty table
    pub fn new() -> Self {
        KeyLockTable {
            inner: Arc::new(TableInner {
                entries: Mutex::new(FxHashMap::default()),
            }),
        }
    }

    /// Lock for `key`, created on first request
    ///
    /// Concurrent first requests for the same key receive the same instance.
    pub fn get(&self, key: &K) -> Arc<KeyLock<K>> {
        let mut entries = self.inner.entries.lock();
        if let Some(existing) = entries.get(key).and_then(Weak::upgrade) {
            return existing;
        }
        let lock = Arc::new(KeyLock {
            key: key.clone(),
            mutex: ReentrantMutex::new(()),
            table: Arc::downgrade(&self.inner),
        });
        entries.insert(key.clone(), Arc::downgrade(&lock));
        trace!(target: "chunkform::locks", live = entries.len(), "Key lock created");
        lock
    }

    /// Number of keys with a live lock
    pub fn len(&self) -> usize {
        self.inner
            .entries
            .lock()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Whether no key has a live lock
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entries whose lock is gone, returning how many were removed
    pub fn purge(&self) -> usize {
        let mut entries = self.inner.entries.lock();
        let before = entries.len();
        entries.retain(|_, weak| weak.strong_count() > 0);
        before - entries.len()
    }
}

impl<K: Hash + Eq + Clone> Default for KeyLockTable<K> {
    fn default() -> Self {
        KeyLockTable::new()
    }
}

impl<K: Hash + Eq> Clone for KeyLockTable<K> {
    fn clone(&self) -> Self {
        KeyLockTable {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Hash + Eq> fmt::Debug for KeyLockTable<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyLockTable")
            .field("entries", &self.inner.entries.lock().len())
            .finish()
    }
}
