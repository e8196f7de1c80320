//! Memoization keyed by a value derived from the input.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::cache::{CacheStrategy, UnboundedCache};
use crate::control::Deferred;

/// A memoized function whose cache key is derived from its input.
///
/// The key function maps each input `A` to a key `K`; inputs with equal keys
/// share one cached result. This makes it possible to memoize functions whose
/// natural argument is not hashable, or carries fields irrelevant to the
/// result.
///
/// Every call looks up (or creates) the key's [`Deferred`] entry in the cache
/// strategy `C`, then forces it after the cache lock has been released. The
/// wrapped function therefore runs at most once per key for as long as the
/// strategy keeps the entry.
///
/// # Type Parameters
///
/// * `A` - The input type
/// * `K` - The cache key type
/// * `T` - The result type
/// * `KF` - The key function, `Fn(&A) -> K`
/// * `F` - The wrapped function, `Fn(A) -> T`
/// * `C` - The cache strategy (defaults to [`UnboundedCache`])
///
/// # Panics
///
/// A panic in the wrapped function propagates to the caller that triggered
/// it. The entry stays poisoned: later calls with the same key panic as well
/// and never re-run the function.
///
/// # Examples
///
/// ```rust
/// use memokit::memoize::ContramapMemoized;
///
/// #[derive(Clone)]
/// struct Request {
///     path: String,
///     attempt: u32,
/// }
///
/// let fetch = ContramapMemoized::new(
///     |request: &Request| request.path.clone(),
///     |request: Request| format!("contents of {}", request.path),
/// );
///
/// let first = fetch.call(Request { path: "/a".into(), attempt: 1 });
/// let second = fetch.call(Request { path: "/a".into(), attempt: 2 });
/// assert_eq!(first, second);
/// assert_eq!(fetch.cache().len(), 1);
/// ```
pub struct ContramapMemoized<A, K, T, KF, F, C = UnboundedCache<K, Deferred<T>>> {
    key_function: KF,
    function: Arc<F>,
    cache: C,
    _signature: PhantomData<fn(A) -> (K, T)>,
}

impl<A, K, T, KF, F> ContramapMemoized<A, K, T, KF, F>
where
    K: Hash + Eq,
    KF: Fn(&A) -> K,
    F: Fn(A) -> T,
{
    /// Wraps `function` with an unbounded cache keyed by `key_function`.
    pub fn new(key_function: KF, function: F) -> Self {
        Self::with_cache(key_function, function, UnboundedCache::new())
    }
}

impl<A, K, T, KF, F, C> ContramapMemoized<A, K, T, KF, F, C> {
    /// Wraps `function` with the given cache strategy.
    pub fn with_cache(key_function: KF, function: F, cache: C) -> Self
    where
        KF: Fn(&A) -> K,
        F: Fn(A) -> T,
        C: CacheStrategy<K, Deferred<T>>,
    {
        Self {
            key_function,
            function: Arc::new(function),
            cache,
            _signature: PhantomData,
        }
    }

    /// Returns the cache strategy backing this function.
    pub fn cache(&self) -> &C {
        &self.cache
    }
}

impl<A, K, T, KF, F, C> ContramapMemoized<A, K, T, KF, F, C>
where
    A: Send + 'static,
    T: Clone + 'static,
    KF: Fn(&A) -> K,
    F: Fn(A) -> T + Send + Sync + 'static,
    C: CacheStrategy<K, Deferred<T>>,
{
    /// Calls the memoized function.
    ///
    /// # Panics
    ///
    /// Panics if the wrapped function panics for this key, now or on an
    /// earlier call.
    pub fn call(&self, input: A) -> T {
        let key = (self.key_function)(&input);
        let function = Arc::clone(&self.function);
        let entry = self
            .cache
            .get_or_create(key, move || Deferred::boxed(move || function(input)));
        entry.force().clone()
    }

    /// Converts into a plain closure with the wrapped function's signature.
    pub fn into_fn(self) -> impl Fn(A) -> T {
        move |input| self.call(input)
    }
}

impl<A, K, T, KF, F, C: fmt::Debug> fmt::Debug for ContramapMemoized<A, K, T, KF, F, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ContramapMemoized")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// A key function waiting for the functions it will memoize.
///
/// Created by [`contramap_memoize`](super::contramap_memoize). Each call to
/// [`wrap`](Self::wrap) produces an independent memoized function with its
/// own cache, so one key function can be reused across many functions.
///
/// # Examples
///
/// ```rust
/// use memokit::memoize::contramap_memoize;
///
/// let by_length = contramap_memoize(|word: &String| word.len());
///
/// let upper = by_length.wrap(|word: String| word.to_uppercase());
/// let reversed = by_length.wrap(|word: String| word.chars().rev().collect::<String>());
///
/// assert_eq!(upper.call("abc".to_string()), "ABC");
/// // Same length, same key: the cached result is returned.
/// assert_eq!(upper.call("xyz".to_string()), "ABC");
/// assert_eq!(reversed.call("xyz".to_string()), "zyx");
/// ```
#[derive(Debug, Clone)]
pub struct ContramapMemoize<KF> {
    key_function: KF,
}

impl<KF: Clone> ContramapMemoize<KF> {
    pub(super) const fn new(key_function: KF) -> Self {
        Self { key_function }
    }

    /// Memoizes `function` with a fresh unbounded cache.
    pub fn wrap<A, K, T, F>(&self, function: F) -> ContramapMemoized<A, K, T, KF, F>
    where
        K: Hash + Eq,
        KF: Fn(&A) -> K,
        F: Fn(A) -> T,
    {
        ContramapMemoized::new(self.key_function.clone(), function)
    }

    /// Memoizes `function` with the given cache strategy.
    pub fn wrap_with_cache<A, K, T, F, C>(
        &self,
        function: F,
        cache: C,
    ) -> ContramapMemoized<A, K, T, KF, F, C>
    where
        KF: Fn(&A) -> K,
        F: Fn(A) -> T,
        C: CacheStrategy<K, Deferred<T>>,
    {
        ContramapMemoized::with_cache(self.key_function.clone(), function, cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SingleElementCache;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    struct Point {
        x: i32,
        y: i32,
        label: &'static str,
    }

    #[rstest]
    fn test_inputs_with_equal_keys_share_result() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let memoized = ContramapMemoized::new(
            |point: &Point| (point.x, point.y),
            move |point: Point| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                format!("{}@{},{}", point.label, point.x, point.y)
            },
        );

        let first = memoized.call(Point { x: 1, y: 2, label: "first" });
        let second = memoized.call(Point { x: 1, y: 2, label: "second" });

        assert_eq!(first, "first@1,2");
        assert_eq!(second, "first@1,2");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn test_distinct_keys_computed_separately() {
        let memoized = ContramapMemoized::new(|point: &Point| point.x, |point: Point| point.x * 10);

        assert_eq!(memoized.call(Point { x: 1, y: 0, label: "" }), 10);
        assert_eq!(memoized.call(Point { x: 2, y: 0, label: "" }), 20);
        assert_eq!(memoized.cache().len(), 2);
    }

    #[rstest]
    fn test_with_single_element_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let memoized = ContramapMemoized::with_cache(
            |value: &i32| *value,
            move |value: i32| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                value + 1
            },
            SingleElementCache::new(),
        );

        assert_eq!(memoized.call(1), 2);
        assert_eq!(memoized.call(1), 2);
        assert_eq!(memoized.call(5), 6);
        assert_eq!(memoized.call(1), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(memoized.cache().current_key(), Some(1));
    }

    #[rstest]
    fn test_into_fn_keeps_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let function = ContramapMemoized::new(
            |text: &String| text.to_lowercase(),
            move |text: String| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                text.len()
            },
        )
        .into_fn();

        assert_eq!(function("Hello".to_string()), 5);
        assert_eq!(function("HELLO".to_string()), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn test_wrap_produces_independent_caches() {
        let memoize_by_identity = ContramapMemoize::new(|value: &u8| *value);

        let doubled = memoize_by_identity.wrap(|value: u8| u16::from(value) * 2);
        let squared = memoize_by_identity.wrap(|value: u8| u16::from(value) * u16::from(value));

        assert_eq!(doubled.call(4), 8);
        assert_eq!(squared.call(4), 16);
        assert_eq!(doubled.cache().len(), 1);
        assert_eq!(squared.cache().len(), 1);
    }
}
