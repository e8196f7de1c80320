//! Thread-safe deferred computation with memoization.
//!
//! This module provides the `Deferred<T, F>` type, a lazily evaluated value
//! that may be forced from many threads at once. The initializer runs at most
//! once and its outcome, a value or a panic, is cached for every later access.
//!
//! # Failure Semantics
//!
//! A `Deferred` whose initializer panics becomes **poisoned**:
//!
//! - The thread that ran the initializer observes the original panic unchanged
//! - Every other `force()`, concurrent or later, panics with a message naming
//!   the original failure
//! - [`Deferred::try_force`] reports the poisoned state as a
//!   [`DeferredPoisonedError`]
//! - The initializer is never invoked a second time
//!
//! # Re-entry Warning
//!
//! Forcing a `Deferred` from within its own initializer on the same thread
//! blocks forever. Threads waiting on an in-flight initialization are parked
//! rather than spinning, so long-running initializers are fine.
//!
//! # Examples
//!
//! ```rust
//! use memokit::control::Deferred;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let deferred = Arc::new(Deferred::new(|| {
//!     println!("Computing...");
//!     42
//! }));
//!
//! let handles: Vec<_> = (0..10).map(|_| {
//!     let deferred = Arc::clone(&deferred);
//!     thread::spawn(move || *deferred.force())
//! }).collect();
//!
//! // All threads get the same value, and "Computing..." is printed once
//! for handle in handles {
//!     assert_eq!(handle.join().unwrap(), 42);
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::sync::OnceLock;

use parking_lot::Mutex;

/// A type-erased, sendable initializer.
///
/// Caches store handles as `Deferred<T, Thunk<T>>` so that entries built
/// from different closures share one type.
pub type Thunk<T> = Box<dyn FnOnce() -> T + Send>;

const CONSUMED_MESSAGE: &str = "initializer already consumed";

/// Error returned when a `Deferred` value cannot produce its value.
///
/// This error is returned by [`Deferred::try_force`] and
/// [`Deferred::into_inner`] when the initializer panicked. It carries the
/// message of the original panic.
///
/// Note: [`Deferred::force`] panics instead of returning this error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredPoisonedError {
    message: String,
}

impl DeferredPoisonedError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the message of the panic that poisoned the value.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DeferredPoisonedError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "Deferred: initialization panicked: {}",
            self.message
        )
    }
}

impl std::error::Error for DeferredPoisonedError {}

enum Outcome<T> {
    Ready(T),
    Poisoned(DeferredPoisonedError),
}

/// A thread-safe lazily evaluated value with memoization.
///
/// `Deferred<T, F>` defers computation until the value is first accessed via
/// `force()`. Once computed, the value is cached and subsequent calls return
/// it without recomputation. If several threads force an unevaluated value at
/// the same time, exactly one runs the initializer and the others block until
/// it finishes.
///
/// # Type Parameters
///
/// * `T` - The type of the computed value
/// * `F` - The type of the initialization function (defaults to [`Thunk<T>`])
///
/// # Thread Safety
///
/// `Deferred` is `Send + Sync` when `T: Send + Sync` and `F: Send`. No
/// `unsafe` code is involved: the outcome lives in a [`OnceLock`] and the
/// initializer sits behind a [`parking_lot::Mutex`] until it is taken.
///
/// # Examples
///
/// ```rust
/// use memokit::control::Deferred;
///
/// let deferred = Deferred::new(|| expensive_computation());
///
/// // Computation happens here
/// let value = deferred.force();
/// assert_eq!(*value, 42);
///
/// fn expensive_computation() -> i32 {
///     42
/// }
/// ```
pub struct Deferred<T, F = Thunk<T>> {
    outcome: OnceLock<Outcome<T>>,
    initializer: Mutex<Option<F>>,
}

impl<T, F: FnOnce() -> T> Deferred<T, F> {
    /// Creates a new deferred value with the given initialization function.
    ///
    /// The function will not be called until `force()` is invoked.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use memokit::control::Deferred;
    ///
    /// let deferred = Deferred::new(|| {
    ///     println!("Initializing...");
    ///     42
    /// });
    /// // Nothing printed yet
    /// assert!(!deferred.is_initialized());
    /// ```
    #[inline]
    pub fn new(initializer: F) -> Self {
        Self {
            outcome: OnceLock::new(),
            initializer: Mutex::new(Some(initializer)),
        }
    }

    /// Forces evaluation and returns a reference to the value.
    ///
    /// If the value has not been computed yet, the initialization function is
    /// called and the result cached. Concurrent callers wait for the single
    /// evaluation instead of starting their own.
    ///
    /// # Panics
    ///
    /// - Resumes the initializer's own panic on the thread that ran it
    /// - Panics with a [`DeferredPoisonedError`] message on every other call
    ///   once the value is poisoned
    ///
    /// # Examples
    ///
    /// ```rust
    /// use memokit::control::Deferred;
    ///
    /// let deferred = Deferred::new(|| 42);
    /// assert_eq!(*deferred.force(), 42);
    /// ```
    pub fn force(&self) -> &T {
        match self.evaluate() {
            Outcome::Ready(value) => value,
            Outcome::Poisoned(error) => panic!("{error}"),
        }
    }

    /// Tries to force evaluation without panicking on a poisoned value.
    ///
    /// # Errors
    ///
    /// Returns `Err(DeferredPoisonedError)` if an earlier evaluation panicked.
    ///
    /// # Panics
    ///
    /// If this call is the one that runs the initializer and the initializer
    /// panics, that panic is propagated. Only the poisoned state left behind
    /// is reported through `Result`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use memokit::control::Deferred;
    /// use std::panic::{AssertUnwindSafe, catch_unwind};
    ///
    /// let deferred = Deferred::new(|| 42);
    /// assert_eq!(*deferred.try_force().unwrap(), 42);
    ///
    /// let poisoned = Deferred::new(|| -> i32 { panic!("init failed") });
    /// let _ = catch_unwind(AssertUnwindSafe(|| poisoned.force()));
    /// assert_eq!(poisoned.try_force().unwrap_err().message(), "init failed");
    /// ```
    pub fn try_force(&self) -> Result<&T, DeferredPoisonedError> {
        match self.evaluate() {
            Outcome::Ready(value) => Ok(value),
            Outcome::Poisoned(error) => Err(error.clone()),
        }
    }

    /// Consumes the `Deferred` and returns the inner value, evaluating it
    /// first if necessary.
    ///
    /// # Errors
    ///
    /// Returns `Err(DeferredPoisonedError)` if the value is poisoned.
    ///
    /// # Panics
    ///
    /// If the initializer runs here and panics, the panic propagates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use memokit::control::Deferred;
    ///
    /// let deferred = Deferred::new(|| 42);
    /// assert_eq!(deferred.into_inner(), Ok(42));
    /// ```
    pub fn into_inner(self) -> Result<T, DeferredPoisonedError> {
        let Self {
            outcome,
            initializer,
        } = self;
        match outcome.into_inner() {
            Some(Outcome::Ready(value)) => Ok(value),
            Some(Outcome::Poisoned(error)) => Err(error),
            None => initializer
                .into_inner()
                .map(|initializer| initializer())
                .ok_or_else(|| DeferredPoisonedError::new(CONSUMED_MESSAGE)),
        }
    }

    /// Applies a function to the deferred value, producing a new deferred
    /// value. Nothing is evaluated until the result is forced.
    ///
    /// # Panics
    ///
    /// Panics when forced if `self` is poisoned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use memokit::control::Deferred;
    ///
    /// let doubled = Deferred::new(|| 21).map(|value| value * 2);
    /// assert_eq!(*doubled.force(), 42);
    /// ```
    pub fn map<U, G>(self, function: G) -> Deferred<U, impl FnOnce() -> U>
    where
        G: FnOnce(T) -> U,
    {
        Deferred::new(move || match self.into_inner() {
            Ok(value) => function(value),
            Err(error) => panic!("{error}"),
        })
    }

    fn evaluate(&self) -> &Outcome<T> {
        let mut payload = None;
        let outcome = self
            .outcome
            .get_or_init(|| self.run_initializer(&mut payload));
        if let Some(payload) = payload {
            resume_unwind(payload);
        }
        outcome
    }

    fn run_initializer(&self, payload_slot: &mut Option<Box<dyn Any + Send>>) -> Outcome<T> {
        let Some(initializer) = self.initializer.lock().take() else {
            return Outcome::Poisoned(DeferredPoisonedError::new(CONSUMED_MESSAGE));
        };

        match catch_unwind(AssertUnwindSafe(initializer)) {
            Ok(value) => Outcome::Ready(value),
            Err(payload) => {
                let error = DeferredPoisonedError::new(panic_message(payload.as_ref()));
                *payload_slot = Some(payload);
                Outcome::Poisoned(error)
            }
        }
    }
}

impl<T> Deferred<T> {
    /// Creates a deferred value whose initializer is boxed into a [`Thunk`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use memokit::control::Deferred;
    ///
    /// let handles: Vec<Deferred<i32>> = vec![
    ///     Deferred::boxed(|| 1),
    ///     Deferred::boxed(move || 2),
    /// ];
    /// assert_eq!(*handles[1].force(), 2);
    /// ```
    #[inline]
    pub fn boxed<F>(initializer: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self::new(Box::new(initializer))
    }

    /// Creates a deferred value that is already initialized.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use memokit::control::Deferred;
    ///
    /// let deferred = Deferred::new_with_value(42);
    /// assert!(deferred.is_initialized());
    /// ```
    #[inline]
    pub fn new_with_value(value: T) -> Self {
        Self {
            outcome: OnceLock::from(Outcome::Ready(value)),
            initializer: Mutex::new(None),
        }
    }

    /// Lifts a value into the `Deferred` context (Applicative pure).
    #[inline]
    pub fn pure(value: T) -> Self {
        Self::new_with_value(value)
    }
}

impl<T, F> Deferred<T, F> {
    /// Returns a reference to the value if it has been initialized.
    ///
    /// Unlike `force()`, this method does not trigger initialization.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        match self.outcome.get() {
            Some(Outcome::Ready(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns whether the value has been successfully initialized.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        matches!(self.outcome.get(), Some(Outcome::Ready(_)))
    }

    /// Returns whether the initializer panicked.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use memokit::control::Deferred;
    /// use std::panic::{AssertUnwindSafe, catch_unwind};
    ///
    /// let deferred = Deferred::new(|| -> i32 { panic!("initialization failed") });
    /// let _ = catch_unwind(AssertUnwindSafe(|| deferred.force()));
    ///
    /// assert!(deferred.is_poisoned());
    /// ```
    #[inline]
    pub fn is_poisoned(&self) -> bool {
        matches!(self.outcome.get(), Some(Outcome::Poisoned(_)))
    }
}

impl<T: Default + 'static> Default for Deferred<T> {
    /// Creates a deferred value that computes the default value of `T`.
    fn default() -> Self {
        Self::boxed(T::default)
    }
}

impl<T: fmt::Debug, F> fmt::Debug for Deferred<T, F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome.get() {
            Some(Outcome::Ready(value)) => formatter.debug_tuple("Deferred").field(value).finish(),
            Some(Outcome::Poisoned(_)) => formatter.write_str("Deferred(<poisoned>)"),
            None => formatter.write_str("Deferred(<uninit>)"),
        }
    }
}

impl<T: fmt::Display, F> fmt::Display for Deferred<T, F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome.get() {
            Some(Outcome::Ready(value)) => fmt::Display::fmt(value, formatter),
            Some(Outcome::Poisoned(_)) => formatter.write_str("<poisoned>"),
            None => formatter.write_str("<uninit>"),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}
