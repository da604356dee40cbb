//! Admission policies.
//!
//! An admission policy is consulted on every cache miss, before the factory
//! runs. It answers one of three ways:
//!
//! ```text
//!   can_admit() ──► Ok(true)   construct
//!               ──► Ok(false)  pool is full: evict one idle instance, then construct
//!               ──► Err(..)    hard refusal: the fetch fails, nothing is evicted
//! ```
//!
//! ## Key Components
//!
//! | Policy          | Answer                                  | State                     |
//! |-----------------|-----------------------------------------|---------------------------|
//! | [`NeverAdmit`]  | always `Err(AdmissionDenied)`           | none                      |
//! | [`AlwaysAdmit`] | always `Ok(true)`                       | none                      |
//! | [`RateLimited`] | `Err` when the window is saturated      | recent construction times |
//! | [`AmountLimited`]| `Ok(false)` at the live-instance limit | live counter              |
//!
//! Rate limiting protects something outside the pool (a remote endpoint, a
//! licence server), so it can never be satisfied by evicting an idle
//! instance; that is why it fails hard instead of answering `Ok(false)`.
//!
//! ## Example Usage
//!
//! ```
//! use poolkit::policy::admission::AmountLimited;
//! use poolkit::traits::AdmissionPolicy;
//!
//! let mut limit = AmountLimited::new(1);
//! assert_eq!(limit.can_admit(), Ok(true));
//! limit.on_admitted();
//! assert_eq!(limit.can_admit(), Ok(false));
//! limit.on_evicted();
//! assert_eq!(limit.can_admit(), Ok(true));
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::error::{ConfigError, PoolError, PoolResult};
use crate::traits::AdmissionPolicy;

// ---------------------------------------------------------------------------
// NeverAdmit
// ---------------------------------------------------------------------------

/// Refuses every construction. Useful for pools that are pre-filled or must
/// never grow.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverAdmit;

impl AdmissionPolicy for NeverAdmit {
    fn name(&self) -> &'static str {
        "never-admit"
    }

    fn can_admit(&mut self) -> PoolResult<bool> {
        Err(PoolError::AdmissionDenied {
            policy: self.name(),
            reason: "new constructions are disabled".into(),
        })
    }

    fn on_admitted(&mut self) {}

    fn on_evicted(&mut self) {}
}

// ---------------------------------------------------------------------------
// AlwaysAdmit
// ---------------------------------------------------------------------------

/// Admits every construction; the pool grows without bound.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysAdmit;

impl AdmissionPolicy for AlwaysAdmit {
    fn name(&self) -> &'static str {
        "always-admit"
    }

    fn can_admit(&mut self) -> PoolResult<bool> {
        Ok(true)
    }

    fn on_admitted(&mut self) {}

    fn on_evicted(&mut self) {}
}

// ---------------------------------------------------------------------------
// RateLimited
// ---------------------------------------------------------------------------

/// Allows at most `max_count` constructions inside any sliding `window`.
///
/// Timestamps older than `now - window` are pruned on every check. Once the
/// window holds `max_count` constructions, further attempts fail with
/// [`PoolError::AdmissionDenied`] until old entries age out.
#[derive(Debug, Clone)]
pub struct RateLimited {
    max_count: usize,
    window: Duration,
    history: VecDeque<Instant>,
}

impl RateLimited {
    /// Creates a rate limiter. A `max_count` of zero refuses everything.
    pub fn new(max_count: usize, window: Duration) -> Self {
        Self {
            max_count,
            window,
            history: VecDeque::with_capacity(max_count.min(1024)),
        }
    }

    /// Fallible constructor rejecting a zero count or an empty window.
    pub fn try_new(max_count: usize, window: Duration) -> Result<Self, ConfigError> {
        validate_rate(max_count, window)?;
        Ok(Self::new(max_count, window))
    }

    /// Replaces the limits. Recorded timestamps are kept.
    pub fn set_rate(&mut self, max_count: usize, window: Duration) {
        self.max_count = max_count;
        self.window = window;
    }

    /// Fallible variant of [`set_rate`](Self::set_rate).
    pub fn try_set_rate(&mut self, max_count: usize, window: Duration) -> Result<(), ConfigError> {
        validate_rate(max_count, window)?;
        self.set_rate(max_count, window);
        Ok(())
    }

    /// Maximum constructions per window.
    pub fn max_count(&self) -> usize {
        self.max_count
    }

    /// Length of the sliding window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Constructions currently recorded (may include expired ones until the
    /// next check prunes them).
    pub fn recorded(&self) -> usize {
        self.history.len()
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.history.front() {
            if now.duration_since(oldest) > self.window {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }
}

fn validate_rate(max_count: usize, window: Duration) -> Result<(), ConfigError> {
    if max_count == 0 {
        return Err(ConfigError::new("rate limit max_count must be > 0"));
    }
    if window.is_zero() {
        return Err(ConfigError::new("rate limit window must be non-zero"));
    }
    Ok(())
}

impl AdmissionPolicy for RateLimited {
    fn name(&self) -> &'static str {
        "rate-limited"
    }

    fn can_admit(&mut self) -> PoolResult<bool> {
        self.prune(Instant::now());
        if self.history.len() >= self.max_count {
            return Err(PoolError::AdmissionDenied {
                policy: self.name(),
                reason: format!(
                    "{} constructions within {:?} (limit {})",
                    self.history.len(),
                    self.window,
                    self.max_count
                ),
            });
        }
        Ok(true)
    }

    fn on_admitted(&mut self) {
        self.history.push_back(Instant::now());
    }

    fn on_evicted(&mut self) {}
}

// ---------------------------------------------------------------------------
// AmountLimited
// ---------------------------------------------------------------------------

/// Caps the number of simultaneously live instances.
///
/// At the cap, `can_admit` answers `Ok(false)` so the pool reclaims an idle
/// instance through its eviction policy instead of failing outright.
#[derive(Debug, Clone)]
pub struct AmountLimited {
    max_creation: usize,
    live: usize,
}

impl AmountLimited {
    /// Creates a limiter allowing `max_creation` live instances.
    pub fn new(max_creation: usize) -> Self {
        Self {
            max_creation,
            live: 0,
        }
    }

    /// Fallible constructor rejecting a zero limit.
    pub fn try_new(max_creation: usize) -> Result<Self, ConfigError> {
        if max_creation == 0 {
            return Err(ConfigError::new("max_creation must be > 0"));
        }
        Ok(Self::new(max_creation))
    }

    /// Changes the cap. Lowering it below the live count destroys nothing
    /// right away; the next miss evicts idle instances until the live count
    /// is back under the cap, and [`ObjectPool::purge_idle`] shrinks the
    /// pool immediately.
    ///
    /// [`ObjectPool::purge_idle`]: crate::pool::ObjectPool::purge_idle
    pub fn set_max_creation(&mut self, max_creation: usize) {
        self.max_creation = max_creation;
    }

    /// Current cap.
    pub fn max_creation(&self) -> usize {
        self.max_creation
    }

    /// Live instances counted so far.
    pub fn live(&self) -> usize {
        self.live
    }
}

impl AdmissionPolicy for AmountLimited {
    fn name(&self) -> &'static str {
        "amount-limited"
    }

    fn can_admit(&mut self) -> PoolResult<bool> {
        Ok(self.live < self.max_creation)
    }

    fn on_admitted(&mut self) {
        self.live += 1;
    }

    fn on_evicted(&mut self) {
        debug_assert!(self.live > 0, "on_evicted without a live instance");
        self.live = self.live.saturating_sub(1);
    }
}
