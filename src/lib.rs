//! # memokit
//!
//! Thread-safe memoizing combinators for Rust.
//!
//! ## Overview
//!
//! Wrap a unary function so it runs at most once per cache key, even under
//! concurrent first-time access from many threads. The library includes:
//!
//! - **Deferred values**: a lazy-once cell whose outcome, value or panic, is
//!   computed once and shared by every caller
//! - **Caches**: an unbounded cache that never evicts, and a single-element
//!   cache that keeps only the latest key
//! - **Memoizing combinators**: `memoize`, `memoize_latest`,
//!   `contramap_memoize` and `cache_callback`
//!
//! Cache locks are held only long enough to find or register a key's entry.
//! The entry is forced afterwards, so expensive computations for different
//! keys never serialize against each other.
//!
//! ## Feature Flags
//!
//! - `control`: [`Deferred`](control::Deferred)
//! - `cache`: cache strategies
//! - `memoize`: memoizing combinators
//! - `fxhash` / `ahash`: faster default hash builder for the unbounded cache
//! - `full`: Enable all modules
//!
//! ## Example
//!
//! ```rust
//! use memokit::prelude::*;
//!
//! let double = memoize(|value: i32| value * 2);
//! assert_eq!(double(3), 6);
//! assert_eq!(double(3), 6);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use memokit::prelude::*;
/// ```
pub mod prelude {

    #[cfg(feature = "control")]
    pub use crate::control::*;

    #[cfg(feature = "cache")]
    pub use crate::cache::*;

    #[cfg(feature = "memoize")]
    pub use crate::memoize::*;
}

#[cfg(feature = "control")]
pub mod control;

#[cfg(feature = "cache")]
pub mod cache;

#[cfg(feature = "memoize")]
pub mod memoize;
