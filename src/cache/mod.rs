//! Keyed caches of shared entry handles.
//!
//! - [`CacheStrategy`]: the "get or create the entry for this key" seam
//! - [`UnboundedCache`]: one slot per distinct key, never evicted
//! - [`SingleElementCache`]: one slot in total, replaced on a key change
//!
//! Both strategies hold their lock only while looking up or inserting an
//! entry. The entries themselves, usually
//! [`Deferred`](crate::control::Deferred) values, are forced by the caller
//! after the lock is released, so a slow computation for one key never
//! blocks lookups of another.
//!
//! # Hashing
//!
//! [`DefaultHashBuilder`] is selected by feature flags:
//!
//! - `fxhash`: `rustc_hash::FxBuildHasher`
//! - `ahash`: `ahash::RandomState` (ignored when `fxhash` is also enabled)
//! - neither: `std::collections::hash_map::RandomState`

mod single_element;
mod strategy;
mod unbounded;

pub use single_element::SingleElementCache;
pub use strategy::CacheStrategy;
pub use unbounded::UnboundedCache;

/// The hash builder [`UnboundedCache::new`] uses.
#[cfg(feature = "fxhash")]
pub type DefaultHashBuilder = rustc_hash::FxBuildHasher;

/// The hash builder [`UnboundedCache::new`] uses.
#[cfg(all(feature = "ahash", not(feature = "fxhash")))]
pub type DefaultHashBuilder = ahash::RandomState;

/// The hash builder [`UnboundedCache::new`] uses.
#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
pub type DefaultHashBuilder = std::collections::hash_map::RandomState;
