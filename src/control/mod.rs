//! Control structures for deferred evaluation.
//!
//! - [`Deferred`]: a thread-safe lazy-once value. Its initializer runs at
//!   most once; the outcome, value or panic, is shared by every caller.
//!
//! `Deferred` is the building block the memoizing caches store per key.
//!
//! # Examples
//!
//! ```rust
//! use memokit::control::Deferred;
//!
//! let deferred = Deferred::new(|| {
//!     println!("Computing...");
//!     42
//! });
//! // "Computing..." is not printed yet
//!
//! let value = deferred.force();
//! // Now "Computing..." is printed and value is 42
//! assert_eq!(*value, 42);
//! ```

mod deferred;

pub use deferred::{Deferred, DeferredPoisonedError, Thunk};
