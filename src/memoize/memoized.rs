//! Memoization keyed directly by the function's argument.

use std::fmt;
use std::hash::Hash;

use super::ContramapMemoized;
use crate::cache::{CacheStrategy, SingleElementCache, UnboundedCache};
use crate::control::Deferred;

/// A memoized unary function whose argument is its own cache key.
///
/// This is a [`ContramapMemoized`] whose key function clones the argument.
///
/// # Examples
///
/// ```rust
/// use memokit::memoize::Memoized;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let calls_clone = Arc::clone(&calls);
/// let double = Memoized::new(move |value: i32| {
///     calls_clone.fetch_add(1, Ordering::SeqCst);
///     value * 2
/// });
///
/// assert_eq!(double.call(3), 6);
/// assert_eq!(double.call(3), 6);
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
///
/// assert_eq!(double.call(4), 8);
/// assert_eq!(calls.load(Ordering::SeqCst), 2);
/// ```
pub struct Memoized<K, T, F, C = UnboundedCache<K, Deferred<T>>> {
    inner: ContramapMemoized<K, K, T, fn(&K) -> K, F, C>,
}

impl<K, T, F> Memoized<K, T, F>
where
    K: Hash + Eq + Clone,
    F: Fn(K) -> T,
{
    /// Wraps `function` with an unbounded cache.
    pub fn new(function: F) -> Self {
        Self::with_cache(function, UnboundedCache::new())
    }
}

impl<K, T, F> Memoized<K, T, F, SingleElementCache<K, Deferred<T>>>
where
    K: Eq + Clone,
    F: Fn(K) -> T,
{
    /// Wraps `function` with a cache that only remembers the latest key.
    pub fn latest(function: F) -> Self {
        Self::with_cache(function, SingleElementCache::new())
    }
}

impl<K, T, F, C> Memoized<K, T, F, C> {
    /// Wraps `function` with the given cache strategy.
    pub fn with_cache(function: F, cache: C) -> Self
    where
        K: Clone,
        F: Fn(K) -> T,
        C: CacheStrategy<K, Deferred<T>>,
    {
        let key_function: fn(&K) -> K = K::clone;
        Self {
            inner: ContramapMemoized::with_cache(key_function, function, cache),
        }
    }

    /// Returns the cache strategy backing this function.
    pub fn cache(&self) -> &C {
        self.inner.cache()
    }
}

impl<K, T, F, C> Memoized<K, T, F, C>
where
    K: Clone + Send + 'static,
    T: Clone + 'static,
    F: Fn(K) -> T + Send + Sync + 'static,
    C: CacheStrategy<K, Deferred<T>>,
{
    /// Calls the memoized function.
    ///
    /// # Panics
    ///
    /// Panics if the wrapped function panics for this key, now or on an
    /// earlier call.
    pub fn call(&self, key: K) -> T {
        self.inner.call(key)
    }

    /// Converts into a plain closure with the wrapped function's signature.
    pub fn into_fn(self) -> impl Fn(K) -> T {
        move |key| self.call(key)
    }
}

impl<K, T, F, C: fmt::Debug> fmt::Debug for Memoized<K, T, F, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Memoized")
            .field("cache", self.cache())
            .finish_non_exhaustive()
    }
}
