//! A monotonically growing cache: one slot per distinct key, never evicted.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{CacheStrategy, DefaultHashBuilder};

/// An unbounded keyed cache of shared entry handles.
///
/// Once a key has an entry, that entry is never replaced or removed, so the
/// generator runs at most once per distinct key. Lookups take a read lock;
/// a miss re-checks under the write lock before inserting, so two threads
/// racing on the same unseen key still produce a single entry.
///
/// # Type Parameters
///
/// * `K` - The key type
/// * `D` - The entry type, usually [`Deferred`](crate::control::Deferred)
/// * `S` - The hash builder (defaults to [`DefaultHashBuilder`])
///
/// # Examples
///
/// ```rust
/// use memokit::cache::{CacheStrategy, UnboundedCache};
/// use memokit::control::Deferred;
///
/// let cache: UnboundedCache<u32, Deferred<u32>> = UnboundedCache::new();
///
/// let entry = cache.get_or_create(3, || Deferred::boxed(|| 3 * 2));
/// assert_eq!(*entry.force(), 6);
/// assert!(cache.contains_key(&3));
/// assert_eq!(cache.len(), 1);
/// ```
pub struct UnboundedCache<K, D, S = DefaultHashBuilder> {
    entries: RwLock<HashMap<K, Arc<D>, S>>,
}

impl<K, D> UnboundedCache<K, D> {
    /// Creates an empty cache using the default hash builder.
    #[inline]
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates an empty cache with room for at least `capacity` keys.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity_and_hasher(
                capacity,
                DefaultHashBuilder::default(),
            )),
        }
    }
}

impl<K, D, S> UnboundedCache<K, D, S> {
    /// Creates an empty cache that hashes keys with `hasher`.
    #[inline]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_hasher(hasher)),
        }
    }

    /// Returns the number of cached keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no key has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K, D, S> UnboundedCache<K, D, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Returns `true` if an entry exists for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.read().contains_key(key)
    }
}

impl<K, D, S> CacheStrategy<K, D> for UnboundedCache<K, D, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn get_or_create<G>(&self, key: K, generator: G) -> Arc<D>
    where
        G: FnOnce() -> D,
    {
        if let Some(entry) = self.entries.read().get(&key) {
            return Arc::clone(entry);
        }

        let mut entries = self.entries.write();
        // Another thread may have inserted between the two locks.
        if let Some(entry) = entries.get(&key) {
            return Arc::clone(entry);
        }

        let entry = Arc::new(generator());
        entries.insert(key, Arc::clone(&entry));
        tracing::trace!(entries = entries.len(), "inserted memoization slot");
        entry
    }
}

impl<K, D, S: Default> Default for UnboundedCache<K, D, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, D, S> fmt::Debug for UnboundedCache<K, D, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("UnboundedCache")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
