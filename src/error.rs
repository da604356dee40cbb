//! Error types for the poolkit library.
//!
//! ## Key Components
//!
//! - [`PoolError`]: The single error surface of [`ObjectPool`](crate::pool::ObjectPool).
//!   Returned synchronously from `fetch`, `release` and the eviction path.
//! - [`ConstructionError`]: Returned by a [`Factory`](crate::factory::Factory)
//!   that cannot build the requested instance; wrapped verbatim by
//!   [`PoolError::Construction`].
//! - [`InvariantError`]: Returned when internal pool invariants are violated
//!   (`check_invariants` methods).
//! - [`ConfigError`]: Returned when policy configuration parameters are invalid
//!   (e.g. zero window, zero creation limit).
//!
//! ## Error Kinds
//!
//! | Variant              | Raised by                          | Meaning                              |
//! |----------------------|------------------------------------|--------------------------------------|
//! | `AdmissionDenied`    | `NeverAdmit`, `RateLimited`        | Hard policy refusal, no eviction     |
//! | `EvictionImpossible` | `Lru`, `Aging`, `RandomEviction`   | No idle instance could be reclaimed  |
//! | `Integrity`          | `release`, internal evict          | Caller bookkeeping is wrong          |
//! | `Construction`       | the factory                        | Instance could not be built          |
//!
//! ## Example Usage
//!
//! ```
//! use poolkit::error::ConfigError;
//! use poolkit::policy::admission::AmountLimited;
//!
//! // Fallible constructor for user-configurable parameters
//! let limit: Result<AmountLimited, ConfigError> = AmountLimited::try_new(4);
//! assert!(limit.is_ok());
//!
//! // A zero limit is caught without panicking
//! assert!(AmountLimited::try_new(0).is_err());
//! ```

use std::fmt;

/// Convenience alias for results produced by the pool.
pub type PoolResult<T> = Result<T, PoolError>;

// ---------------------------------------------------------------------------
// PoolError
// ---------------------------------------------------------------------------

/// Errors raised by the pool core and its strategies.
///
/// None of these are retried inside the pool. A failed fetch leaves the pool
/// exactly as it was before the call; a failed release leaves the instance's
/// custody unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// An admission policy refused a new construction outright.
    #[error("admission denied by {policy}: {reason}")]
    AdmissionDenied {
        /// Name of the refusing policy.
        policy: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// Admission was full and no idle instance could be evicted.
    #[error("eviction impossible under {policy}: {reason}")]
    EvictionImpossible {
        /// Name of the eviction policy.
        policy: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// The caller violated the fetch/release contract.
    #[error("pool integrity violation: {0}")]
    Integrity(String),

    /// The factory failed to build the requested instance.
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

impl PoolError {
    pub(crate) fn integrity(msg: impl Into<String>) -> Self {
        PoolError::Integrity(msg.into())
    }

    /// Returns `true` for [`PoolError::AdmissionDenied`].
    pub fn is_admission_denied(&self) -> bool {
        matches!(self, PoolError::AdmissionDenied { .. })
    }

    /// Returns `true` for [`PoolError::EvictionImpossible`].
    pub fn is_eviction_impossible(&self) -> bool {
        matches!(self, PoolError::EvictionImpossible { .. })
    }

    /// Returns `true` for [`PoolError::Integrity`].
    pub fn is_integrity(&self) -> bool {
        matches!(self, PoolError::Integrity(_))
    }
}

// ---------------------------------------------------------------------------
// ConstructionError
// ---------------------------------------------------------------------------

/// Error returned by a factory that could not build an instance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot construct `{identifier}`: {message}")]
pub struct ConstructionError {
    identifier: String,
    message: String,
}

impl ConstructionError {
    /// Creates a new `ConstructionError` for the given identifier rendering.
    pub fn new(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            message: message.into(),
        }
    }

    /// Returns the rendered identifier that failed to construct.
    #[inline]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the failure description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal pool invariants are violated.
///
/// Produced by [`ObjectPool::check_invariants`](crate::pool::ObjectPool::check_invariants).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when policy configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`RateLimited::try_new`](crate::policy::admission::RateLimited::try_new)
/// and [`PoolBuilder::try_build`](crate::builder::PoolBuilder::try_build).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use poolkit::policy::admission::RateLimited;
///
/// let err = RateLimited::try_new(0, Duration::from_millis(100)).unwrap_err();
/// assert!(err.to_string().contains("max_count"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- PoolError --------------------------------------------------------

    #[test]
    fn admission_denied_display_names_policy() {
        let err = PoolError::AdmissionDenied {
            policy: "rate-limited",
            reason: "2 constructions in 100ms".into(),
        };
        let text = err.to_string();
        assert!(text.contains("rate-limited"));
        assert!(text.contains("2 constructions"));
        assert!(err.is_admission_denied());
        assert!(!err.is_integrity());
    }

    #[test]
    fn construction_error_converts_transparently() {
        let inner = ConstructionError::new("socket", "refused");
        let err: PoolError = inner.clone().into();
        assert_eq!(err.to_string(), inner.to_string());
        assert_eq!(err, PoolError::Construction(inner));
    }

    #[test]
    fn construction_error_accessors() {
        let err = ConstructionError::new("db", "timeout");
        assert_eq!(err.identifier(), "db");
        assert_eq!(err.message(), "timeout");
        assert_eq!(err.to_string(), "cannot construct `db`: timeout");
    }

    #[test]
    fn predicates_match_variants() {
        assert!(PoolError::integrity("x").is_integrity());
        let evict = PoolError::EvictionImpossible {
            policy: "lru",
            reason: "no idle instance".into(),
        };
        assert!(evict.is_eviction_impossible());
        assert!(!evict.is_admission_denied());
    }

    #[test]
    fn pool_error_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PoolError>();
        assert_error::<ConstructionError>();
    }

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("idle and checked-out overlap");
        assert_eq!(err.to_string(), "idle and checked-out overlap");
        assert_eq!(err.message(), "idle and checked-out overlap");
    }

    #[test]
    fn invariant_clone_and_eq() {
        let a = InvariantError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("max_creation must be > 0");
        assert_eq!(err.to_string(), "max_creation must be > 0");
        assert_eq!(err.message(), "max_creation must be > 0");
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
        assert_error::<InvariantError>();
    }
}
