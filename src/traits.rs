//! # Pool Strategy Traits
//!
//! The pool core is parameterized at runtime by two strategy objects, each
//! behind a small trait. The core owns both; strategies never see keys, the
//! factory or instance values, only opaque [`InstanceId`]s.
//!
//! ## Architecture
//!
//! ```text
//!                        ┌──────────────────────────────────┐
//!                        │          ObjectPool<..>          │
//!                        │   idle pool + checked-out map    │
//!                        └───────┬──────────────────┬───────┘
//!                     owns       │                  │      owns
//!              ┌─────────────────▼───┐          ┌───▼───────────────────────┐
//!              │  AdmissionPolicy    │          │  EvictionPolicy           │
//!              │                     │          │                           │
//!              │  can_admit()        │          │  on_admitted(id)          │
//!              │  on_admitted()      │          │  on_fetch(id)             │
//!              │  on_evicted()       │          │  on_release(id)           │
//!              └─────────────────────┘          │  on_evicted(id)           │
//!                                               │  evict(&mut dyn Target)   │
//!                                               └───────────┬───────────────┘
//!                                                           │ callback
//!                                               ┌───────────▼───────────────┐
//!                                               │  EvictionTarget           │
//!                                               │  is_idle(id) / remove(id) │
//!                                               │  (implemented by the core)│
//!                                               └───────────────────────────┘
//! ```
//!
//! ## Admission Outcomes
//!
//! | `can_admit()`        | Pool reaction                                  |
//! |----------------------|------------------------------------------------|
//! | `Ok(true)`           | construct a new instance                       |
//! | `Ok(false)`          | ask the eviction policy to free one idle slot  |
//! | `Err(..)`            | fail the fetch, nothing is evicted             |
//!
//! ## Eviction Protocol
//!
//! `evict` picks one idle instance, asks the target to remove it and, once
//! the target confirms, drops its own bookkeeping for that id (the core does
//! not call `on_evicted` for strategy-initiated removals). Instances removed
//! by the core on its own through `purge_idle` are reported via `on_evicted`.

use crate::error::PoolResult;
use crate::id::InstanceId;

/// Decides whether a new instance may be constructed right now.
pub trait AdmissionPolicy: Send {
    /// Short policy name used in errors and diagnostics.
    fn name(&self) -> &'static str;

    /// Asks whether a construction may proceed.
    ///
    /// `Ok(false)` is a soft denial (the pool may evict to make room); an
    /// error is a hard denial that the pool propagates unchanged.
    fn can_admit(&mut self) -> PoolResult<bool>;

    /// Called right after a construction was approved and succeeded.
    fn on_admitted(&mut self);

    /// Called right after an instance was destroyed.
    fn on_evicted(&mut self);
}

/// Callback interface the pool core exposes to eviction policies.
pub trait EvictionTarget {
    /// Returns `true` if `id` is currently sitting in the idle pool.
    fn is_idle(&self, id: InstanceId) -> bool;

    /// Destroys the idle instance `id`.
    ///
    /// Fails with [`PoolError::Integrity`](crate::error::PoolError::Integrity)
    /// when the instance is checked out or unknown.
    fn remove(&mut self, id: InstanceId) -> PoolResult<()>;
}

/// Scores instances and picks eviction victims.
pub trait EvictionPolicy: Send {
    /// Short policy name used in errors and diagnostics.
    fn name(&self) -> &'static str;

    /// A new instance was constructed.
    fn on_admitted(&mut self, id: InstanceId);

    /// An instance was handed out to a caller.
    fn on_fetch(&mut self, id: InstanceId);

    /// An instance came back to the idle pool.
    fn on_release(&mut self, id: InstanceId);

    /// An instance was destroyed by the core without going through
    /// [`evict`](Self::evict).
    fn on_evicted(&mut self, id: InstanceId);

    /// Chooses exactly one idle instance and removes it through `target`.
    ///
    /// Returns the evicted id, or
    /// [`PoolError::EvictionImpossible`](crate::error::PoolError::EvictionImpossible)
    /// when no candidate qualifies.
    fn evict(&mut self, target: &mut dyn EvictionTarget) -> PoolResult<InstanceId>;

    /// Number of instances the policy currently tracks.
    fn tracked(&self) -> usize;
}

impl<A: AdmissionPolicy + ?Sized> AdmissionPolicy for Box<A> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn can_admit(&mut self) -> PoolResult<bool> {
        (**self).can_admit()
    }

    fn on_admitted(&mut self) {
        (**self).on_admitted()
    }

    fn on_evicted(&mut self) {
        (**self).on_evicted()
    }
}

impl<E: EvictionPolicy + ?Sized> EvictionPolicy for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn on_admitted(&mut self, id: InstanceId) {
        (**self).on_admitted(id)
    }

    fn on_fetch(&mut self, id: InstanceId) {
        (**self).on_fetch(id)
    }

    fn on_release(&mut self, id: InstanceId) {
        (**self).on_release(id)
    }

    fn on_evicted(&mut self, id: InstanceId) {
        (**self).on_evicted(id)
    }

    fn evict(&mut self, target: &mut dyn EvictionTarget) -> PoolResult<InstanceId> {
        (**self).evict(target)
    }

    fn tracked(&self) -> usize {
        (**self).tracked()
    }
}
