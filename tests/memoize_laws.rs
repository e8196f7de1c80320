#![cfg(feature = "memoize")]
//! Property-based tests for the memoization laws.

use memokit::cache::{CacheStrategy, SingleElementCache};
use memokit::memoize::{Memoized, memoize};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

fn counted<F>(function: F) -> (Arc<Mutex<HashMap<i16, usize>>>, impl Fn(i16) -> i64 + Send + Sync + 'static)
where
    F: Fn(i16) -> i64 + Send + Sync + 'static,
{
    let calls = Arc::new(Mutex::new(HashMap::new()));
    let calls_clone = Arc::clone(&calls);
    let wrapped = move |key: i16| {
        *calls_clone.lock().unwrap().entry(key).or_insert(0) += 1;
        function(key)
    };
    (calls, wrapped)
}

// =============================================================================
// Idempotence Law
// =============================================================================

proptest! {
    /// Idempotence: the memoized wrapper returns f(k) on every call
    #[test]
    fn prop_memoize_idempotence(key in any::<i16>(), repeats in 1usize..10) {
        let function = |value: i16| i64::from(value) * 3 - 1;
        let memoized = memoize(function);

        for _ in 0..repeats {
            prop_assert_eq!(memoized(key), function(key));
        }
    }
}

// =============================================================================
// At-Most-Once Law
// =============================================================================

proptest! {
    /// Every distinct key in any call sequence is computed exactly once
    #[test]
    fn prop_memoize_at_most_once(keys in prop::collection::vec(any::<i16>(), 0..64)) {
        let (calls, function) = counted(i64::from);
        let memoized = Memoized::new(function);

        for &key in &keys {
            prop_assert_eq!(memoized.call(key), i64::from(key));
        }

        let distinct: HashSet<i16> = keys.iter().copied().collect();
        let calls = calls.lock().unwrap();
        prop_assert_eq!(calls.len(), distinct.len());
        prop_assert!(calls.values().all(|&count| count == 1));
        prop_assert_eq!(memoized.cache().len(), distinct.len());
    }
}

// =============================================================================
// Key Isolation Law
// =============================================================================

proptest! {
    /// Calling with k1 never computes any other key
    #[test]
    fn prop_memoize_key_isolation(k1 in any::<i16>(), k2 in any::<i16>()) {
        prop_assume!(k1 != k2);
        let (calls, function) = counted(i64::from);
        let memoized = Memoized::new(function);

        let _ = memoized.call(k1);

        let calls = calls.lock().unwrap();
        prop_assert_eq!(calls.get(&k1).copied(), Some(1));
        prop_assert_eq!(calls.get(&k2).copied(), None);
    }
}

// =============================================================================
// Single-Element Laws
// =============================================================================

proptest! {
    /// The generator runs once per change of key, and the slot tracks the last key
    #[test]
    fn prop_single_element_generates_per_key_change(keys in prop::collection::vec(0u8..4, 1..64)) {
        let cache: SingleElementCache<u8, u8> = SingleElementCache::new();
        let mut generated = 0usize;

        for &key in &keys {
            let entry = cache.get_or_create(key, || {
                generated += 1;
                key
            });
            prop_assert_eq!(*entry, key);
        }

        let expected = 1 + keys.windows(2).filter(|pair| pair[0] != pair[1]).count();
        prop_assert_eq!(generated, expected);
        prop_assert_eq!(cache.current_key(), keys.last().copied());
    }
}
