//! # Keyed Object Pool
//!
//! [`ObjectPool`] reuses expensive instances instead of rebuilding them on
//! every request. Instances are grouped by [`Key`]; a fetch for a key first
//! looks for an idle instance built for the same key and only falls back to
//! the factory when none is available.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                    ObjectPool<I, P, T, F, A, E>                          │
//!   │                                                                          │
//!   │   idle: BTreeMap<Key, Vec<(InstanceId, T)>>      (per-key LIFO stacks)   │
//!   │   ┌─────────────┬───────────────────────────┐                            │
//!   │   │ db(5432)    │ [#0, #3] ◄── top          │                            │
//!   │   │ db(5433)    │ []                        │  (kept once touched)       │
//!   │   │ cache       │ [#1]                      │                            │
//!   │   └─────────────┴───────────────────────────┘                            │
//!   │   idle_index:  FxHashMap<InstanceId, Key>        (id → owning stack)     │
//!   │   checked_out: FxHashMap<InstanceId, Key>        (id → fetch key)        │
//!   │                                                                          │
//!   │   admission: A   eviction: E   factory: F   metrics (feature "metrics")  │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every live instance id is in exactly one of `idle_index` and
//! `checked_out`.
//!
//! ## Fetch Flow
//!
//! ```text
//!   fetch(key)
//!     │
//!     ├─ idle[key].pop() ──► hit
//!     │
//!     └─ miss ──► admission.can_admit()
//!                    ├─ Err      ──► return Err            (nothing changes)
//!                    ├─ Ok(false)──► eviction.evict(target), ask again
//!                    │                 └─ Err ──► return Err
//!                    └─ Ok(true) ──► factory.create(key)
//!                                      └─ Err ──► return Err
//!                                    admission.on_admitted()
//!                                    eviction.on_admitted(id)
//!     │
//!     ├─ checked_out[id] = key
//!     ├─ eviction.on_fetch(id)
//!     └─ Lease { id, value }
//! ```
//!
//! ## Release Flow
//!
//! ```text
//!   release(lease)
//!     ├─ foreign pool or unknown id ──► ReleaseError (lease handed back)
//!     ├─ checked_out.remove(id)
//!     ├─ idle[key].push((id, value))
//!     └─ eviction.on_release(id)
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use poolkit::error::ConstructionError;
//! use poolkit::key::Key;
//! use poolkit::policy::admission::AmountLimited;
//! use poolkit::policy::lru::LruEviction;
//! use poolkit::pool::ObjectPool;
//!
//! let factory = |key: &Key<&'static str, u16>| {
//!     Ok::<_, ConstructionError>(format!("{key}"))
//! };
//! let mut pool = ObjectPool::new(factory, AmountLimited::new(1), LruEviction::new());
//!
//! let a = pool.fetch(Key::with_params("db", [5432])).unwrap();
//! let a_id = a.id();
//! pool.release(a).unwrap();
//!
//! // Same key: the idle instance is reused.
//! let again = pool.fetch(Key::with_params("db", [5432])).unwrap();
//! assert_eq!(again.id(), a_id);
//! pool.release(again).unwrap();
//!
//! // Different key at capacity: the idle instance is evicted to make room.
//! let b = pool.fetch(Key::with_params("db", [5433])).unwrap();
//! assert_eq!(*b, "db(5433)");
//! assert_eq!(pool.live_len(), 1);
//! # pool.release(b).unwrap();
//! ```
//!
//! ## Thread Safety
//!
//! `ObjectPool` is single-threaded and performs no locking. Share it across
//! threads only behind an external lock, e.g.
//! `ConcurrentObjectPool` (feature `concurrency`).

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::error::{InvariantError, PoolError, PoolResult};
use crate::factory::{Factory, Registry};
use crate::handle::{Lease, ReleaseError};
use crate::id::{IdAllocator, InstanceId, PoolId};
use crate::key::Key;
#[cfg(feature = "metrics")]
use crate::metrics::{
    MetricsReset, MetricsSnapshotProvider, PoolMetrics, PoolMetricsRecorder, PoolMetricsSnapshot,
};
use crate::traits::{AdmissionPolicy, EvictionPolicy, EvictionTarget};

type IdleStacks<I, P, T> = BTreeMap<Key<I, P>, Vec<(InstanceId, T)>>;

/// Keyed object pool with pluggable admission and eviction.
///
/// `A` and `E` default to boxed trait objects so policies can be chosen at
/// runtime (see [`PoolBuilder`](crate::builder::PoolBuilder)); concrete
/// policy types give direct access to their setters through
/// [`admission_mut`](Self::admission_mut).
pub struct ObjectPool<
    I,
    P,
    T,
    F,
    A = Box<dyn AdmissionPolicy>,
    E = Box<dyn EvictionPolicy>,
> {
    pool_id: PoolId,
    ids: IdAllocator,
    idle: IdleStacks<I, P, T>,
    idle_index: FxHashMap<InstanceId, Key<I, P>>,
    checked_out: FxHashMap<InstanceId, Key<I, P>>,
    admission: A,
    eviction: E,
    factory: F,
    #[cfg(feature = "metrics")]
    metrics: PoolMetrics,
}

impl<I, P, T, F, A, E> ObjectPool<I, P, T, F, A, E>
where
    I: Ord + Clone,
    P: Ord + Clone,
    F: Factory<I, P, T>,
    A: AdmissionPolicy,
    E: EvictionPolicy,
{
    /// Creates an empty pool.
    pub fn new(factory: F, admission: A, eviction: E) -> Self {
        Self {
            pool_id: PoolId::next(),
            ids: IdAllocator::default(),
            idle: BTreeMap::new(),
            idle_index: FxHashMap::default(),
            checked_out: FxHashMap::default(),
            admission,
            eviction,
            factory,
            #[cfg(feature = "metrics")]
            metrics: PoolMetrics::default(),
        }
    }

    /// Checks out an instance for `key`, reusing an idle one when possible.
    ///
    /// # Errors
    ///
    /// - [`PoolError::AdmissionDenied`] when admission refuses outright.
    /// - [`PoolError::EvictionImpossible`] when admission is full and no idle
    ///   instance can be reclaimed.
    /// - [`PoolError::Construction`] when the factory fails.
    ///
    /// On error nothing is registered. An instance evicted to make room
    /// before a failing construction stays evicted.
    pub fn fetch(&mut self, key: Key<I, P>) -> PoolResult<Lease<T>> {
        let (id, value, hit) = match self.pop_idle(&key) {
            Some((id, value)) => {
                trace!(id = %id, "idle hit");
                (id, value, true)
            },
            None => {
                let (id, value) = self.construct(&key)?;
                (id, value, false)
            },
        };

        self.checked_out.insert(id, key);
        #[cfg(feature = "metrics")]
        self.metrics.record_fetch(hit);
        #[cfg(not(feature = "metrics"))]
        let _ = hit;
        self.eviction.on_fetch(id);

        #[cfg(debug_assertions)]
        self.debug_validate_invariants();

        Ok(Lease {
            pool: self.pool_id,
            id,
            value,
        })
    }

    /// Returns a checked-out instance to its key's idle stack.
    ///
    /// # Errors
    ///
    /// A lease from another pool, or one this pool does not list as checked
    /// out, is refused with [`PoolError::Integrity`]; the lease comes back
    /// inside the [`ReleaseError`] and the pool is left untouched.
    pub fn release(&mut self, lease: Lease<T>) -> Result<(), ReleaseError<T>> {
        if lease.pool != self.pool_id {
            let err = PoolError::integrity(format!("{} belongs to another pool", lease.id));
            return Err(ReleaseError::new(err, lease));
        }
        let Some(key) = self.checked_out.remove(&lease.id) else {
            let err = PoolError::integrity(format!("{} is not checked out", lease.id));
            return Err(ReleaseError::new(err, lease));
        };

        let Lease { id, value, .. } = lease;
        self.idle_index.insert(id, key.clone());
        self.idle.entry(key).or_default().push((id, value));

        #[cfg(feature = "metrics")]
        self.metrics.record_release();
        self.eviction.on_release(id);

        #[cfg(debug_assertions)]
        self.debug_validate_invariants();

        Ok(())
    }

    /// Destroys every idle instance. Returns how many were destroyed.
    ///
    /// Checked-out instances are unaffected. Per-key stacks stay in place.
    pub fn purge_idle(&mut self) -> usize {
        // Top of each stack first, so every removal pops the stack's tail.
        let ids: Vec<InstanceId> = self
            .idle
            .values()
            .flat_map(|stack| stack.iter().rev().map(|(id, _)| *id))
            .collect();

        let mut target = IdleTarget {
            idle: &mut self.idle,
            idle_index: &mut self.idle_index,
            checked_out: &self.checked_out,
            admission: &mut self.admission,
            #[cfg(feature = "metrics")]
            metrics: &mut self.metrics,
        };
        let mut purged = 0;
        for id in ids {
            if let Err(err) = target.remove(id) {
                warn!(id = %id, error = %err, "purge skipped instance");
                continue;
            }
            self.eviction.on_evicted(id);
            purged += 1;
        }
        if purged > 0 {
            debug!(purged, "purged idle instances");
        }
        purged
    }

    /// Number of idle instances across all keys.
    pub fn idle_len(&self) -> usize {
        self.idle_index.len()
    }

    /// Number of idle instances built for `key`.
    pub fn idle_len_for(&self, key: &Key<I, P>) -> usize {
        self.idle.get(key).map_or(0, Vec::len)
    }

    /// Returns `true` if `key` has at least one idle instance.
    pub fn contains_idle(&self, key: &Key<I, P>) -> bool {
        self.idle_len_for(key) > 0
    }

    /// Number of instances currently lent out.
    pub fn checked_out_len(&self) -> usize {
        self.checked_out.len()
    }

    /// Number of live instances (idle plus checked out).
    pub fn live_len(&self) -> usize {
        self.idle_len() + self.checked_out_len()
    }

    /// Returns `true` if `id` is currently lent out by this pool.
    pub fn is_checked_out(&self, id: InstanceId) -> bool {
        self.checked_out.contains_key(&id)
    }

    /// Keys that have been fetched at least once, in key order.
    pub fn keys(&self) -> impl Iterator<Item = &Key<I, P>> {
        self.idle.keys()
    }

    /// The admission policy.
    pub fn admission(&self) -> &A {
        &self.admission
    }

    /// Mutable access to the admission policy, e.g. to change its limits.
    pub fn admission_mut(&mut self) -> &mut A {
        &mut self.admission
    }

    /// The eviction policy.
    pub fn eviction(&self) -> &E {
        &self.eviction
    }

    /// The factory.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Mutable access to the factory.
    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    /// One-line description of the configured policies.
    pub fn describe(&self) -> String {
        format!(
            "ObjectPool(admission={}, eviction={}, idle={}, checked_out={})",
            self.admission.name(),
            self.eviction.name(),
            self.idle_len(),
            self.checked_out_len()
        )
    }

    /// Verifies that idle and checked-out bookkeeping agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut stacked = 0;
        for (key, stack) in &self.idle {
            for (id, _) in stack {
                stacked += 1;
                match self.idle_index.get(id) {
                    Some(indexed) if indexed == key => {},
                    Some(_) => {
                        return Err(InvariantError::new(format!(
                            "{id} indexed under a different key than its stack"
                        )));
                    },
                    None => {
                        return Err(InvariantError::new(format!("{id} idle but not indexed")));
                    },
                }
                if self.checked_out.contains_key(id) {
                    return Err(InvariantError::new(format!(
                        "{id} is both idle and checked out"
                    )));
                }
            }
        }
        if stacked != self.idle_index.len() {
            return Err(InvariantError::new(format!(
                "idle stacks hold {} instances, index holds {}",
                stacked,
                self.idle_index.len()
            )));
        }
        let next = self.ids.peek();
        if let Some(id) = self
            .idle_index
            .keys()
            .chain(self.checked_out.keys())
            .find(|id| **id >= next)
        {
            return Err(InvariantError::new(format!("{id} was never allocated")));
        }
        Ok(())
    }

    #[cfg(debug_assertions)]
    fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("pool invariant violated: {err}");
        }
    }

    fn pop_idle(&mut self, key: &Key<I, P>) -> Option<(InstanceId, T)> {
        let (id, value) = self.idle.get_mut(key)?.pop()?;
        self.idle_index.remove(&id);
        Some((id, value))
    }

    fn construct(&mut self, key: &Key<I, P>) -> PoolResult<(InstanceId, T)> {
        // A lowered cap can leave several instances over the limit; keep
        // reclaiming until admission agrees or nothing idle is left.
        while !self.admission.can_admit()? {
            let mut target = IdleTarget {
                idle: &mut self.idle,
                idle_index: &mut self.idle_index,
                checked_out: &self.checked_out,
                admission: &mut self.admission,
                #[cfg(feature = "metrics")]
                metrics: &mut self.metrics,
            };
            let victim = self.eviction.evict(&mut target)?;
            debug!(
                victim = %victim,
                policy = self.eviction.name(),
                "evicted idle instance to admit a new one"
            );
        }

        let value = self.factory.create(key)?;
        let id = self.ids.allocate();
        self.admission.on_admitted();
        #[cfg(feature = "metrics")]
        self.metrics.record_create();
        self.eviction.on_admitted(id);
        debug!(id = %id, "constructed new instance");
        Ok((id, value))
    }
}

impl<I, P, T> ObjectPool<I, P, T, Registry<I, P, T>>
where
    I: Ord + Clone + fmt::Debug,
    P: Ord + Clone,
{
    /// Creates a registry-backed pool with boxed policies.
    pub fn with_registry(
        admission: impl AdmissionPolicy + 'static,
        eviction: impl EvictionPolicy + 'static,
    ) -> Self {
        Self::new(Registry::new(), Box::new(admission), Box::new(eviction))
    }
}

impl<I, P, T, A, E> ObjectPool<I, P, T, Registry<I, P, T>, A, E>
where
    I: Ord + Clone,
    P: Ord + Clone,
{
    /// Registers a constructor with the underlying registry.
    pub fn register<C>(&mut self, id: I, ctor: C) -> bool
    where
        C: Fn(&[P]) -> Result<T, crate::error::ConstructionError> + Send + 'static,
    {
        self.factory.register(id, ctor)
    }

    /// Removes a constructor. Already built instances stay pooled.
    pub fn unregister(&mut self, id: &I) -> bool {
        self.factory.unregister(id)
    }

    /// Identifiers the registry can build, in ascending order.
    pub fn registered_ids(&self) -> Vec<I> {
        self.factory.registered_ids()
    }
}

#[cfg(feature = "metrics")]
impl<I, P, T, F, A, E> ObjectPool<I, P, T, F, A, E> {
    /// Snapshot of the pool statistics.
    pub fn metrics(&self) -> PoolMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Clears the statistics counters.
    pub fn reset_metrics(&mut self) {
        self.metrics.reset_metrics();
    }
}

#[cfg(feature = "metrics")]
impl<I, P, T, F, A, E> MetricsSnapshotProvider<PoolMetricsSnapshot> for ObjectPool<I, P, T, F, A, E> {
    fn snapshot(&self) -> PoolMetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl<I, P, T, F, A, E> fmt::Debug for ObjectPool<I, P, T, F, A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("pool_id", &self.pool_id)
            .field("keys", &self.idle.len())
            .field("idle", &self.idle_index.len())
            .field("checked_out", &self.checked_out.len())
            .finish_non_exhaustive()
    }
}

impl<I, P, T, F, A, E> Drop for ObjectPool<I, P, T, F, A, E> {
    fn drop(&mut self) {
        if !self.checked_out.is_empty() {
            warn!(
                outstanding = self.checked_out.len(),
                "pool dropped while instances are still checked out"
            );
        }
        let idle = self.idle_index.len();
        self.idle.clear();
        self.idle_index.clear();
        if idle > 0 {
            trace!(idle, "destroyed idle instances on teardown");
        }
    }
}

/// The pool's side of the eviction callback: borrows exactly the state a
/// removal touches, leaving the eviction policy free to drive it.
struct IdleTarget<'a, I, P, T, A> {
    idle: &'a mut IdleStacks<I, P, T>,
    idle_index: &'a mut FxHashMap<InstanceId, Key<I, P>>,
    checked_out: &'a FxHashMap<InstanceId, Key<I, P>>,
    admission: &'a mut A,
    #[cfg(feature = "metrics")]
    metrics: &'a mut PoolMetrics,
}

impl<I, P, T, A> EvictionTarget for IdleTarget<'_, I, P, T, A>
where
    I: Ord,
    P: Ord,
    A: AdmissionPolicy,
{
    fn is_idle(&self, id: InstanceId) -> bool {
        self.idle_index.contains_key(&id)
    }

    fn remove(&mut self, id: InstanceId) -> PoolResult<()> {
        if self.checked_out.contains_key(&id) {
            return Err(PoolError::integrity(format!(
                "cannot evict {id}: it is checked out"
            )));
        }
        let key = self
            .idle_index
            .remove(&id)
            .ok_or_else(|| PoolError::integrity(format!("cannot evict {id}: unknown instance")))?;
        let stack = self.idle.get_mut(&key).ok_or_else(|| {
            PoolError::integrity(format!("cannot evict {id}: its idle stack is missing"))
        })?;
        let Some(pos) = stack.iter().rposition(|(idle_id, _)| *idle_id == id) else {
            self.idle_index.insert(id, key);
            return Err(PoolError::integrity(format!(
                "cannot evict {id}: not found in its idle stack"
            )));
        };
        let (_, value) = stack.remove(pos);

        self.admission.on_evicted();
        #[cfg(feature = "metrics")]
        self.metrics.record_destroy();
        drop(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConstructionError;
    use crate::policy::admission::{AlwaysAdmit, AmountLimited, NeverAdmit};
    use crate::policy::lru::LruEviction;
    use crate::policy::random::RandomEviction;

    type TestKey = Key<&'static str, u32>;

    fn factory(key: &TestKey) -> Result<String, ConstructionError> {
        Ok(key.identifier().copied().unwrap_or_default().to_string())
    }

    type FnFactory = fn(&TestKey) -> Result<String, ConstructionError>;

    fn pool<A: AdmissionPolicy, E: EvictionPolicy>(
        admission: A,
        eviction: E,
    ) -> ObjectPool<&'static str, u32, String, FnFactory, A, E> {
        ObjectPool::new(factory as FnFactory, admission, eviction)
    }

    #[test]
    fn release_then_fetch_returns_same_instance() {
        let mut pool = pool(AlwaysAdmit, LruEviction::new());
        let lease = pool.fetch(Key::new("a")).unwrap();
        let id = lease.id();
        pool.release(lease).unwrap();

        let again = pool.fetch(Key::new("a")).unwrap();
        assert_eq!(again.id(), id);
        assert_eq!(*again, "a");
        pool.release(again).unwrap();
    }

    #[test]
    fn idle_stack_is_lifo() {
        let mut pool = pool(AlwaysAdmit, LruEviction::new());
        let first = pool.fetch(Key::new("a")).unwrap();
        let second = pool.fetch(Key::new("a")).unwrap();
        let (first_id, second_id) = (first.id(), second.id());
        assert_ne!(first_id, second_id);

        pool.release(first).unwrap();
        pool.release(second).unwrap();
        assert_eq!(pool.idle_len_for(&Key::new("a")), 2);

        let top = pool.fetch(Key::new("a")).unwrap();
        assert_eq!(top.id(), second_id);
        pool.release(top).unwrap();
    }

    #[test]
    fn distinct_keys_do_not_share_instances() {
        let mut pool = pool(AlwaysAdmit, LruEviction::new());
        let a = pool.fetch(Key::with_params("conn", [1])).unwrap();
        let a_id = a.id();
        pool.release(a).unwrap();

        let b = pool.fetch(Key::with_params("conn", [2])).unwrap();
        assert_ne!(b.id(), a_id);
        assert!(pool.contains_idle(&Key::with_params("conn", [1])));
        pool.release(b).unwrap();
    }

    #[test]
    fn never_admit_fails_without_side_effects() {
        let mut pool = pool(NeverAdmit, LruEviction::new());
        let err = pool.fetch(Key::new("a")).unwrap_err();
        assert!(err.is_admission_denied());
        assert_eq!(pool.live_len(), 0);
        pool.check_invariants().unwrap();
    }

    #[test]
    fn construction_failure_registers_nothing() {
        let failing: FnFactory = |_| Err(ConstructionError::new("a", "boom"));
        let mut pool = ObjectPool::new(failing, AmountLimited::new(4), LruEviction::new());
        let err = pool.fetch(Key::new("a")).unwrap_err();
        assert_eq!(err, PoolError::Construction(ConstructionError::new("a", "boom")));
        assert_eq!(pool.live_len(), 0);
        assert_eq!(pool.admission().live(), 0);
        assert_eq!(pool.eviction().tracked(), 0);
    }

    #[test]
    fn amount_limit_evicts_idle_instance() {
        let mut pool = pool(AmountLimited::new(1), LruEviction::new());
        let a = pool.fetch(Key::new("a")).unwrap();
        pool.release(a).unwrap();

        let b = pool.fetch(Key::new("b")).unwrap();
        assert_eq!(pool.idle_len(), 0);
        assert_eq!(pool.checked_out_len(), 1);
        assert!(!pool.contains_idle(&Key::new("a")));
        pool.release(b).unwrap();
    }

    #[test]
    fn amount_limit_with_nothing_idle_fails() {
        let mut pool = pool(AmountLimited::new(1), RandomEviction::with_seed(1));
        let a = pool.fetch(Key::new("a")).unwrap();
        let err = pool.fetch(Key::new("b")).unwrap_err();
        assert!(err.is_eviction_impossible());
        assert_eq!(pool.live_len(), 1);
        pool.release(a).unwrap();
    }

    #[test]
    fn foreign_lease_is_refused_and_returned() {
        let mut home = pool(AlwaysAdmit, LruEviction::new());
        let mut other = pool(AlwaysAdmit, LruEviction::new());
        let lease = other.fetch(Key::new("a")).unwrap();

        let refused = home.release(lease).unwrap_err();
        assert!(refused.error().is_integrity());
        assert_eq!(home.live_len(), 0);

        other.release(refused.into_lease()).unwrap();
        assert_eq!(other.idle_len(), 1);
    }

    #[test]
    fn evicting_checked_out_instance_is_integrity_error() {
        let mut idle = IdleStacks::<&str, u32, String>::new();
        let mut idle_index = FxHashMap::default();
        let mut checked_out = FxHashMap::default();
        checked_out.insert(InstanceId(0), Key::new("a"));
        let mut admission = AlwaysAdmit;
        #[cfg(feature = "metrics")]
        let mut metrics = PoolMetrics::default();

        let mut target = IdleTarget {
            idle: &mut idle,
            idle_index: &mut idle_index,
            checked_out: &checked_out,
            admission: &mut admission,
            #[cfg(feature = "metrics")]
            metrics: &mut metrics,
        };
        assert!(!target.is_idle(InstanceId(0)));
        assert!(target.remove(InstanceId(0)).unwrap_err().is_integrity());
        assert!(target.remove(InstanceId(9)).unwrap_err().is_integrity());
    }

    #[test]
    fn lowered_cap_is_reached_on_next_miss() {
        let mut pool = pool(AmountLimited::new(3), LruEviction::new());
        for name in ["a", "b", "c"] {
            let lease = pool.fetch(Key::new(name)).unwrap();
            pool.release(lease).unwrap();
        }
        assert_eq!(pool.live_len(), 3);

        pool.admission_mut().set_max_creation(1);
        let d = pool.fetch(Key::new("d")).unwrap();
        assert_eq!(pool.live_len(), 1);
        assert_eq!(pool.idle_len(), 0);
        assert_eq!(pool.admission().live(), 1);
        assert_eq!(pool.eviction().tracked(), 1);
        pool.release(d).unwrap();
        pool.check_invariants().unwrap();
    }

    #[test]
    fn lowered_cap_with_too_few_idle_fails_after_reclaiming() {
        let mut pool = pool(AmountLimited::new(2), LruEviction::new());
        let a = pool.fetch(Key::new("a")).unwrap();
        pool.release(a).unwrap();
        let b = pool.fetch(Key::new("b")).unwrap();

        pool.admission_mut().set_max_creation(1);
        let err = pool.fetch(Key::new("c")).unwrap_err();
        assert!(err.is_eviction_impossible());
        // The idle instance was reclaimed before giving up.
        assert_eq!(pool.live_len(), 1);
        assert_eq!(pool.admission().live(), 1);
        pool.release(b).unwrap();
        pool.check_invariants().unwrap();
    }

    #[test]
    fn purge_idle_uses_eviction_bookkeeping() {
        let mut pool = pool(AmountLimited::new(4), RandomEviction::with_seed(5));
        let first = pool.fetch(Key::new("a")).unwrap();
        let second = pool.fetch(Key::new("a")).unwrap();
        let other = pool.fetch(Key::new("b")).unwrap();
        pool.release(first).unwrap();
        pool.release(second).unwrap();
        pool.release(other).unwrap();
        assert_eq!(pool.eviction().tracked(), 3);

        assert_eq!(pool.purge_idle(), 3);
        assert_eq!(pool.eviction().tracked(), 0);
        assert_eq!(pool.admission().live(), 0);
        assert_eq!(pool.idle_len_for(&Key::new("a")), 0);
        #[cfg(feature = "metrics")]
        assert_eq!(pool.metrics().destroyed, 3);
        assert_eq!(pool.purge_idle(), 0);
        pool.check_invariants().unwrap();
    }

    #[test]
    fn purge_idle_destroys_only_idle() {
        let mut pool = pool(AmountLimited::new(3), LruEviction::new());
        let a = pool.fetch(Key::new("a")).unwrap();
        let b = pool.fetch(Key::new("b")).unwrap();
        let c = pool.fetch(Key::new("c")).unwrap();
        pool.release(a).unwrap();
        pool.release(b).unwrap();

        assert_eq!(pool.purge_idle(), 2);
        assert_eq!(pool.idle_len(), 0);
        assert_eq!(pool.checked_out_len(), 1);
        assert_eq!(pool.admission().live(), 1);
        assert_eq!(pool.eviction().tracked(), 1);
        pool.release(c).unwrap();
        pool.check_invariants().unwrap();
    }

    #[test]
    fn keys_persist_after_their_stack_empties() {
        let mut pool = pool(AlwaysAdmit, LruEviction::new());
        let a = pool.fetch(Key::new("a")).unwrap();
        pool.release(a).unwrap();
        pool.purge_idle();
        assert_eq!(pool.keys().count(), 1);
        assert_eq!(pool.idle_len_for(&Key::new("a")), 0);
    }

    #[test]
    fn admission_limits_are_mutable_after_construction() {
        let mut pool = pool(AmountLimited::new(1), LruEviction::new());
        let a = pool.fetch(Key::new("a")).unwrap();
        assert!(pool.fetch(Key::new("b")).is_err());

        pool.admission_mut().set_max_creation(2);
        let b = pool.fetch(Key::new("b")).unwrap();
        pool.release(a).unwrap();
        pool.release(b).unwrap();
    }

    #[test]
    fn describe_names_policies() {
        let pool = pool(AmountLimited::new(1), RandomEviction::with_seed(0));
        let text = pool.describe();
        assert!(text.contains("amount-limited"));
        assert!(text.contains("random"));
    }

    #[test]
    fn registry_backed_pool_passthrough() {
        let mut pool: ObjectPool<&str, u32, Vec<u32>, Registry<&str, u32, Vec<u32>>> =
            ObjectPool::with_registry(AlwaysAdmit, LruEviction::new());
        assert!(pool.register("vec", |p: &[u32]| Ok(p.to_vec())));
        assert_eq!(pool.registered_ids(), vec!["vec"]);

        let lease = pool.fetch(Key::with_params("vec", [1, 2])).unwrap();
        assert_eq!(*lease, vec![1, 2]);
        pool.release(lease).unwrap();

        assert!(pool.unregister(&"vec"));
        assert!(pool.fetch(Key::with_params("vec", [9])).is_err());
        // Already pooled instances stay reachable.
        let cached = pool.fetch(Key::with_params("vec", [1, 2])).unwrap();
        pool.release(cached).unwrap();
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn metrics_track_lifecycle() {
        let mut pool = pool(AmountLimited::new(1), LruEviction::new());
        let a = pool.fetch(Key::new("a")).unwrap();
        pool.release(a).unwrap();
        let a = pool.fetch(Key::new("a")).unwrap();
        pool.release(a).unwrap();
        let b = pool.fetch(Key::new("b")).unwrap();

        let snap = pool.metrics();
        assert_eq!(snap.created, 2);
        assert_eq!(snap.fetched, 3);
        assert_eq!(snap.hits, 1);
        assert_eq!(snap.misses, 2);
        assert_eq!(snap.released, 2);
        assert_eq!(snap.destroyed, 1);
        assert_eq!(snap.live, 1);
        assert_eq!(snap.checked_out, 1);

        pool.release(b).unwrap();
        pool.reset_metrics();
        assert_eq!(pool.metrics().fetched, 0);
        assert_eq!(pool.metrics().live, 1);
    }
}
