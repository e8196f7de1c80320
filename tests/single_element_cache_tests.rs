#![cfg(feature = "cache")]

use memokit::cache::{CacheStrategy, SingleElementCache};
use memokit::control::Deferred;
use rstest::rstest;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

fn counting_generator(
    counter: &Arc<AtomicUsize>,
    value: &'static str,
) -> impl FnOnce() -> Deferred<&'static str> {
    let counter = Arc::clone(counter);
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Deferred::boxed(move || value)
    }
}

// =============================================================================
// Hit and Replacement
// =============================================================================

#[rstest]
fn single_element_cache_same_key_generates_once() {
    let cache = SingleElementCache::new();
    let generated = Arc::new(AtomicUsize::new(0));

    let first = cache.get_or_create("k1", counting_generator(&generated, "one"));
    let second = cache.get_or_create("k1", counting_generator(&generated, "other"));

    assert_eq!(*first.force(), "one");
    assert_eq!(*second.force(), "one");
    assert_eq!(generated.load(Ordering::SeqCst), 1);
}

#[rstest]
fn single_element_cache_replaces_on_new_key() {
    let cache = SingleElementCache::new();
    let generated = Arc::new(AtomicUsize::new(0));

    let _ = cache.get_or_create("k1", counting_generator(&generated, "one"));
    let second = cache.get_or_create("k2", counting_generator(&generated, "two"));

    assert_eq!(generated.load(Ordering::SeqCst), 2);
    assert_eq!(cache.current_key(), Some("k2"));
    assert_eq!(*second.force(), "two");
}

#[rstest]
fn single_element_cache_retains_no_history() {
    let cache = SingleElementCache::new();
    let generated = Arc::new(AtomicUsize::new(0));

    let first = cache.get_or_create("k1", counting_generator(&generated, "one"));
    let _ = first.force();
    let _ = cache.get_or_create("k2", counting_generator(&generated, "two"));
    let again = cache.get_or_create("k1", counting_generator(&generated, "one again"));

    assert_eq!(generated.load(Ordering::SeqCst), 3);
    assert!(!Arc::ptr_eq(&first, &again));
    assert_eq!(*again.force(), "one again");
}

#[rstest]
fn single_element_cache_handle_outlives_eviction() {
    let cache = SingleElementCache::new();
    let generated = Arc::new(AtomicUsize::new(0));

    let held = cache.get_or_create(1, counting_generator(&generated, "held"));
    let _ = cache.get_or_create(2, counting_generator(&generated, "newer"));

    assert_eq!(*held.force(), "held");
}

#[rstest]
fn single_element_cache_generator_does_not_force() {
    let cache = SingleElementCache::new();
    let forced = Arc::new(AtomicUsize::new(0));
    let forced_clone = Arc::clone(&forced);

    let handle = cache.get_or_create(1, move || {
        Deferred::boxed(move || {
            forced_clone.fetch_add(1, Ordering::SeqCst);
            10
        })
    });

    assert_eq!(forced.load(Ordering::SeqCst), 0);
    assert_eq!(*handle.force(), 10);
    assert_eq!(forced.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Concurrent Access
// =============================================================================

#[rstest]
fn single_element_cache_concurrent_same_key() {
    let cache = Arc::new(SingleElementCache::new());
    let generated = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let generated = Arc::clone(&generated);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let entry = cache.get_or_create("hot", counting_generator(&generated, "value"));
                *entry.force()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "value");
    }
    assert_eq!(generated.load(Ordering::SeqCst), 1);
}
