//! Thread-safe pool wrapper.
//!
//! [`ConcurrentObjectPool`] puts a single `parking_lot::Mutex` around a whole
//! [`ObjectPool`]. Every call takes the lock for its full duration, including
//! the factory call on a miss, so the core never observes interleaved
//! operations.
//!
//! ```text
//!   thread A ──┐
//!   thread B ──┼──► Arc<Mutex<ObjectPool>> ──► fetch / release / evict
//!   thread C ──┘         (one at a time)
//! ```
//!
//! Leases are plain values and may travel between threads when `T: Send`.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{InvariantError, PoolResult};
use crate::factory::Factory;
use crate::handle::{Lease, ReleaseError};
use crate::key::Key;
#[cfg(feature = "metrics")]
use crate::metrics::PoolMetricsSnapshot;
use crate::pool::ObjectPool;
use crate::traits::{AdmissionPolicy, EvictionPolicy};

/// An [`ObjectPool`] shareable across threads.
pub struct ConcurrentObjectPool<
    I,
    P,
    T,
    F,
    A = Box<dyn AdmissionPolicy>,
    E = Box<dyn EvictionPolicy>,
> {
    inner: Arc<Mutex<ObjectPool<I, P, T, F, A, E>>>,
}

impl<I, P, T, F, A, E> ConcurrentObjectPool<I, P, T, F, A, E>
where
    I: Ord + Clone,
    P: Ord + Clone,
    F: Factory<I, P, T>,
    A: AdmissionPolicy,
    E: EvictionPolicy,
{
    /// Wraps `pool` in a mutex.
    pub fn new(pool: ObjectPool<I, P, T, F, A, E>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    /// See [`ObjectPool::fetch`].
    pub fn fetch(&self, key: Key<I, P>) -> PoolResult<Lease<T>> {
        self.inner.lock().fetch(key)
    }

    /// See [`ObjectPool::release`].
    pub fn release(&self, lease: Lease<T>) -> Result<(), ReleaseError<T>> {
        self.inner.lock().release(lease)
    }

    /// See [`ObjectPool::purge_idle`].
    pub fn purge_idle(&self) -> usize {
        self.inner.lock().purge_idle()
    }

    /// Runs `f` with exclusive access to the pool.
    ///
    /// Use this to change policy parameters or to perform several operations
    /// atomically.
    pub fn with_pool<R>(&self, f: impl FnOnce(&mut ObjectPool<I, P, T, F, A, E>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn idle_len(&self) -> usize {
        self.inner.lock().idle_len()
    }

    pub fn checked_out_len(&self) -> usize {
        self.inner.lock().checked_out_len()
    }

    pub fn live_len(&self) -> usize {
        self.inner.lock().live_len()
    }

    pub fn describe(&self) -> String {
        self.inner.lock().describe()
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics(&self) -> PoolMetricsSnapshot {
        self.inner.lock().metrics()
    }
}

impl<I, P, T, F, A, E> Clone for ConcurrentObjectPool<I, P, T, F, A, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I, P, T, F, A, E> fmt::Debug for ConcurrentObjectPool<I, P, T, F, A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(pool) => f
                .debug_struct("ConcurrentObjectPool")
                .field("pool", &*pool)
                .finish(),
            None => f
                .debug_struct("ConcurrentObjectPool")
                .field("pool", &"<locked>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::error::ConstructionError;
    use crate::policy::admission::AmountLimited;
    use crate::policy::lru::LruEviction;

    type FnFactory = fn(&Key<u8>) -> Result<Vec<u8>, ConstructionError>;

    fn buffers(limit: usize) -> ConcurrentObjectPool<u8, (), Vec<u8>, FnFactory, AmountLimited, LruEviction> {
        let factory: FnFactory = |key| Ok(vec![0; usize::from(*key.identifier().unwrap_or(&0))]);
        ConcurrentObjectPool::new(ObjectPool::new(
            factory,
            AmountLimited::new(limit),
            LruEviction::new(),
        ))
    }

    #[test]
    fn threads_share_one_pool() {
        let pool = buffers(64);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = pool.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        let lease = pool.fetch(Key::new(16)).unwrap();
                        assert_eq!(lease.len(), 16);
                        pool.release(lease).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(pool.checked_out_len(), 0);
        assert!(pool.live_len() <= 4);
        pool.check_invariants().unwrap();
        #[cfg(feature = "metrics")]
        assert_eq!(pool.metrics().fetched, 200);
    }

    #[test]
    fn lease_moves_between_threads() {
        let pool = buffers(1);
        let lease = pool.fetch(Key::new(8)).unwrap();
        let other = pool.clone();
        thread::spawn(move || other.release(lease).unwrap())
            .join()
            .unwrap();
        assert_eq!(pool.idle_len(), 1);
    }

    #[test]
    fn with_pool_reaches_policy_setters() {
        let pool = buffers(1);
        let held = pool.fetch(Key::new(1)).unwrap();
        assert!(pool.fetch(Key::new(2)).is_err());

        pool.with_pool(|inner| inner.admission_mut().set_max_creation(2));
        let second = pool.fetch(Key::new(2)).unwrap();
        pool.release(held).unwrap();
        pool.release(second).unwrap();
        assert!(pool.describe().contains("amount-limited"));
    }
}
