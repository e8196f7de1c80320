//! The storage seam shared by every memoizing combinator.

use std::sync::Arc;

/// A keyed store of shared entry handles.
///
/// A strategy decides which entries survive; the combinators built on top of
/// it only ever ask for "the entry for this key, creating it if needed".
///
/// `get_or_create` must hold its internal lock only for the lookup and
/// insertion. The generator is expected to be cheap (it usually just wraps a
/// closure in a [`Deferred`](crate::control::Deferred)); the returned handle
/// is forced by the caller after the lock has been released.
///
/// # Examples
///
/// ```rust
/// use memokit::cache::{CacheStrategy, UnboundedCache};
///
/// let cache: UnboundedCache<&str, i32> = UnboundedCache::new();
/// let first = cache.get_or_create("answer", || 42);
/// let second = cache.get_or_create("answer", || 0);
///
/// assert_eq!(*first, 42);
/// assert_eq!(*second, 42);
/// ```
pub trait CacheStrategy<K, D> {
    /// Returns the entry cached for `key`, calling `generator` to create and
    /// store a new one when the strategy holds none.
    fn get_or_create<G>(&self, key: K, generator: G) -> Arc<D>
    where
        G: FnOnce() -> D;
}
