//! A cache with room for exactly one key.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::CacheStrategy;

/// A cache holding at most one `(key, entry)` pair.
///
/// Requesting the cached key returns the existing entry. Requesting any other
/// key discards the current entry and installs a freshly generated one, so no
/// history beyond the last key is retained. Discarded entries are simply
/// dropped; there is no release hook.
///
/// Intended for workloads where a single key is hot at a time, such as the
/// most recently used configuration.
///
/// # Examples
///
/// ```rust
/// use memokit::cache::{CacheStrategy, SingleElementCache};
///
/// let cache = SingleElementCache::new();
///
/// assert_eq!(*cache.get_or_create("dev", || 1), 1);
/// assert_eq!(*cache.get_or_create("dev", || 2), 1);
/// assert_eq!(*cache.get_or_create("prod", || 3), 3);
/// assert_eq!(cache.current_key(), Some("prod"));
/// ```
pub struct SingleElementCache<K, D> {
    slot: Mutex<Option<(K, Arc<D>)>>,
}

impl<K, D> SingleElementCache<K, D> {
    /// Creates an empty cache.
    #[inline]
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Returns `true` if no key has been cached, or the cache was cleared.
    pub fn is_empty(&self) -> bool {
        self.slot.lock().is_none()
    }

    /// Drops the cached entry, if any.
    pub fn clear(&self) {
        let previous = self.slot.lock().take();
        drop(previous);
    }
}

impl<K: Clone, D> SingleElementCache<K, D> {
    /// Returns a copy of the currently cached key.
    pub fn current_key(&self) -> Option<K> {
        self.slot.lock().as_ref().map(|(key, _)| key.clone())
    }
}

impl<K: Eq, D> CacheStrategy<K, D> for SingleElementCache<K, D> {
    fn get_or_create<G>(&self, key: K, generator: G) -> Arc<D>
    where
        G: FnOnce() -> D,
    {
        let mut slot = self.slot.lock();
        if let Some((cached_key, entry)) = slot.as_ref()
            && *cached_key == key
        {
            return Arc::clone(entry);
        }

        let entry = Arc::new(generator());
        let previous = slot.replace((key, Arc::clone(&entry)));
        drop(slot);

        tracing::trace!(
            replaced = previous.is_some(),
            "filled single-element cache slot"
        );
        // The evicted entry is released outside the lock.
        drop(previous);
        entry
    }
}

impl<K, D> Default for SingleElementCache<K, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, D> fmt::Debug for SingleElementCache<K, D> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.lock();
        formatter
            .debug_struct("SingleElementCache")
            .field("key", &slot.as_ref().map(|(key, _)| key))
            .finish_non_exhaustive()
    }
}
