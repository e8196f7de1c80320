//! Memoizing combinators.
//!
//! Each combinator wraps a unary function so that it runs at most once per
//! cache key, even when called concurrently from many threads. Cache state
//! belongs to the wrapper: two wrappers built around the same function share
//! nothing.
//!
//! - [`memoize`]: the argument is the key; unbounded cache
//! - [`memoize_latest`]: the argument is the key; only the latest key is kept
//! - [`contramap_memoize`]: the key is derived from the argument
//! - [`cache_callback`]: key function and cache strategy both supplied
//! - [`single_element_cache`]: a bare one-slot cache for hand-rolled use
//!
//! # Examples
//!
//! ```rust
//! use memokit::memoize::memoize;
//!
//! let square = memoize(|value: u64| value * value);
//!
//! assert_eq!(square(12), 144);
//! assert_eq!(square(12), 144); // served from the cache
//! ```

mod contramap;
mod memoized;

use std::hash::Hash;

pub use contramap::{ContramapMemoize, ContramapMemoized};
pub use memoized::Memoized;

use crate::cache::{CacheStrategy, SingleElementCache};
use crate::control::Deferred;

/// Memoizes `function`, using its argument as the cache key.
///
/// The returned closure calls `function` at most once per distinct argument
/// and returns a clone of the cached result on every call.
///
/// # Panics
///
/// The returned closure panics if `function` panics for that argument. The
/// failure is cached: `function` is not called again for that argument.
///
/// # Examples
///
/// ```rust
/// use memokit::memoize::memoize;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let calls_clone = Arc::clone(&calls);
/// let double = memoize(move |value: i32| {
///     calls_clone.fetch_add(1, Ordering::SeqCst);
///     value * 2
/// });
///
/// assert_eq!(double(3), 6);
/// assert_eq!(double(3), 6);
/// assert_eq!(double(4), 8);
/// assert_eq!(calls.load(Ordering::SeqCst), 2);
/// ```
pub fn memoize<K, T, F>(function: F) -> impl Fn(K) -> T
where
    K: Hash + Eq + Clone + Send + 'static,
    T: Clone + 'static,
    F: Fn(K) -> T + Send + Sync + 'static,
{
    Memoized::new(function).into_fn()
}

/// Memoizes `function` with a single-element cache.
///
/// Only the most recent argument is remembered: calling with a different
/// argument evicts the previous result.
///
/// # Examples
///
/// ```rust
/// use memokit::memoize::memoize_latest;
///
/// let describe = memoize_latest(|profile: String| format!("profile {profile}"));
///
/// assert_eq!(describe("dev".to_string()), "profile dev");
/// assert_eq!(describe("prod".to_string()), "profile prod");
/// ```
pub fn memoize_latest<K, T, F>(function: F) -> impl Fn(K) -> T
where
    K: Eq + Clone + Send + 'static,
    T: Clone + 'static,
    F: Fn(K) -> T + Send + Sync + 'static,
{
    Memoized::latest(function).into_fn()
}

/// Fixes the key function used to memoize other functions.
///
/// The result can [`wrap`](ContramapMemoize::wrap) any number of functions
/// taking `A`; each wrap gets its own unbounded cache keyed by
/// `key_function(&input)`.
///
/// # Examples
///
/// ```rust
/// use memokit::memoize::contramap_memoize;
///
/// struct User {
///     id: u32,
///     name: String,
/// }
///
/// let by_id = contramap_memoize(|user: &User| user.id);
/// let greet = by_id.wrap(|user: User| format!("hello {}", user.name)).into_fn();
///
/// assert_eq!(greet(User { id: 1, name: "ada".into() }), "hello ada");
/// // Same id, so the cached greeting is returned.
/// assert_eq!(greet(User { id: 1, name: "grace".into() }), "hello ada");
/// ```
pub const fn contramap_memoize<KF: Clone>(key_function: KF) -> ContramapMemoize<KF> {
    ContramapMemoize::new(key_function)
}

/// Creates an empty [`SingleElementCache`].
///
/// The caller supplies both the key and a generator for a fresh entry on each
/// lookup; the entry is forced after the cache lock has been released.
///
/// # Examples
///
/// ```rust
/// use memokit::cache::CacheStrategy;
/// use memokit::control::Deferred;
/// use memokit::memoize::single_element_cache;
///
/// let cache = single_element_cache();
///
/// let config = cache.get_or_create("staging", || Deferred::boxed(|| "loaded staging"));
/// assert_eq!(*config.force(), "loaded staging");
/// ```
pub fn single_element_cache<K, D>() -> SingleElementCache<K, D> {
    SingleElementCache::new()
}

/// Memoizes `function` with an explicit key function and cache strategy.
///
/// [`memoize`], [`memoize_latest`] and [`contramap_memoize`] are all special
/// cases of this combinator.
///
/// # Examples
///
/// ```rust
/// use memokit::cache::SingleElementCache;
/// use memokit::memoize::cache_callback;
///
/// let parse = cache_callback(
///     |text: &String| text.trim().to_string(),
///     SingleElementCache::new(),
///     |text: String| text.trim().parse::<i64>().unwrap_or_default(),
/// );
///
/// assert_eq!(parse.call(" 42 ".to_string()), 42);
/// assert_eq!(parse.cache().current_key(), Some("42".to_string()));
/// ```
pub fn cache_callback<A, K, T, KF, F, C>(
    key_function: KF,
    cache: C,
    function: F,
) -> ContramapMemoized<A, K, T, KF, F, C>
where
    KF: Fn(&A) -> K,
    F: Fn(A) -> T,
    C: CacheStrategy<K, Deferred<T>>,
{
    ContramapMemoized::with_cache(key_function, function, cache)
}
