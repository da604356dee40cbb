//! Handles handed out by the pool.
//!
//! Two ways to hold a checked-out instance:
//!
//! ```text
//!   ┌──────────────────────────┐          ┌─────────────────────────────────┐
//!   │ Lease<T>   (direct)      │          │ Pooled<T>   (self-returning)    │
//!   │                          │          │                                 │
//!   │  owns T while out        │          │  owns a Lease<T>                │
//!   │  pool.release(lease)     │          │  Weak ──► Rc<RefCell<pool>>     │
//!   │  is mandatory            │          │  Drop releases automatically    │
//!   └──────────────────────────┘          └─────────────────────────────────┘
//! ```
//!
//! A `Lease` is neither `Clone` nor `Copy`, so releasing the same instance
//! twice cannot be expressed. A lease that is simply dropped frees its
//! instance, but the pool keeps counting it as checked out and reports it
//! when the pool itself is dropped.
//!
//! A `Pooled` handle dropped while its pool is borrowed cannot release on
//! the spot. Its lease is parked in a queue shared with the [`SharedPool`]
//! and released at the start of the next `SharedPool` call.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::ptr;
use std::rc::{Rc, Weak};

use crate::error::{PoolError, PoolResult};
use crate::factory::Factory;
use crate::id::{InstanceId, PoolId};
use crate::key::Key;
use crate::pool::ObjectPool;
use crate::traits::{AdmissionPolicy, EvictionPolicy};

// ---------------------------------------------------------------------------
// Lease
// ---------------------------------------------------------------------------

/// A checked-out instance that must be handed back with
/// [`ObjectPool::release`].
#[must_use = "a lease must be released back to its pool"]
pub struct Lease<T> {
    pub(crate) pool: PoolId,
    pub(crate) id: InstanceId,
    pub(crate) value: T,
}

impl<T> Lease<T> {
    /// Identity of the leased instance.
    #[inline]
    pub fn id(&self) -> InstanceId {
        self.id
    }
}

impl<T> Deref for Lease<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Lease<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T> fmt::Debug for Lease<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease")
            .field("pool", &self.pool)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// ReleaseError
// ---------------------------------------------------------------------------

/// A rejected release. Carries the lease back so custody stays with the
/// caller.
pub struct ReleaseError<T> {
    error: PoolError,
    lease: Lease<T>,
}

impl<T> ReleaseError<T> {
    pub(crate) fn new(error: PoolError, lease: Lease<T>) -> Self {
        Self { error, lease }
    }

    /// The reason the release was refused.
    pub fn error(&self) -> &PoolError {
        &self.error
    }

    /// Recovers the lease that was refused.
    pub fn into_lease(self) -> Lease<T> {
        self.lease
    }

    /// Splits into the error and the lease.
    pub fn into_parts(self) -> (PoolError, Lease<T>) {
        (self.error, self.lease)
    }
}

impl<T> fmt::Debug for ReleaseError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseError")
            .field("error", &self.error)
            .field("lease", &self.lease)
            .finish()
    }
}

impl<T> fmt::Display for ReleaseError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "release of {} refused: {}", self.lease.id, self.error)
    }
}

impl<T> std::error::Error for ReleaseError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl<T> From<ReleaseError<T>> for PoolError {
    fn from(err: ReleaseError<T>) -> Self {
        err.error
    }
}

// ---------------------------------------------------------------------------
// Self-returning handles
// ---------------------------------------------------------------------------

/// Anything a [`Pooled`] handle can return its lease to.
pub(crate) trait ReleaseSink<T> {
    fn release_lease(&mut self, lease: Lease<T>) -> Result<(), ReleaseError<T>>;
}

impl<I, P, T, F, A, E> ReleaseSink<T> for ObjectPool<I, P, T, F, A, E>
where
    I: Ord + Clone,
    P: Ord + Clone,
    F: Factory<I, P, T>,
    A: AdmissionPolicy,
    E: EvictionPolicy,
{
    fn release_lease(&mut self, lease: Lease<T>) -> Result<(), ReleaseError<T>> {
        self.release(lease)
    }
}

/// Leases whose handles were dropped while the pool was borrowed.
type Parked<T> = RefCell<Vec<Lease<T>>>;

/// A checked-out instance that releases itself when dropped.
///
/// If the pool is borrowed at that moment, the lease is parked and handed
/// back at the start of the next [`SharedPool`] call. If the owning
/// [`SharedPool`] is already gone, the instance is simply dropped.
pub struct Pooled<T: 'static> {
    lease: ManuallyDrop<Lease<T>>,
    pool: Weak<RefCell<dyn ReleaseSink<T>>>,
    parked: Weak<Parked<T>>,
}

impl<T: 'static> Pooled<T> {
    /// Identity of the held instance.
    pub fn id(&self) -> InstanceId {
        self.lease.id
    }

    /// Turns the handle into a plain [`Lease`]; the caller becomes
    /// responsible for releasing it.
    pub fn detach(self) -> Lease<T> {
        let mut this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so every field is moved or dropped
        // here exactly once.
        unsafe {
            ptr::drop_in_place(&mut this.pool);
            ptr::drop_in_place(&mut this.parked);
            ManuallyDrop::take(&mut this.lease)
        }
    }
}

impl<T: 'static> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.lease.value
    }
}

impl<T: 'static> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.lease.value
    }
}

impl<T: 'static> Drop for Pooled<T> {
    fn drop(&mut self) {
        // SAFETY: `drop` runs once and `self.lease` is not touched afterwards.
        let lease = unsafe { ManuallyDrop::take(&mut self.lease) };
        let Some(owner) = self.pool.upgrade() else {
            tracing::trace!(id = %lease.id, "pool gone, dropping returned instance");
            return;
        };
        let Ok(mut guard) = owner.try_borrow_mut() else {
            park(&self.parked, lease);
            return;
        };
        if let Err(err) = guard.release_lease(lease) {
            tracing::warn!(error = %err, "auto-release refused");
        }
    }
}

fn park<T>(parked: &Weak<Parked<T>>, lease: Lease<T>) {
    let Some(queue) = parked.upgrade() else {
        return;
    };
    match queue.try_borrow_mut() {
        Ok(mut queue) => {
            tracing::trace!(id = %lease.id, "pool busy, parking returned instance");
            queue.push(lease);
        },
        Err(_) => tracing::warn!(id = %lease.id, "return queue busy, instance dropped"),
    }
}

impl<T: 'static> fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pooled").field("lease", &*self.lease).finish()
    }
}

/// Single-threaded shared pool whose fetches return self-releasing
/// [`Pooled`] handles.
///
/// # Example
///
/// ```
/// use poolkit::handle::SharedPool;
/// use poolkit::key::Key;
/// use poolkit::policy::admission::AlwaysAdmit;
/// use poolkit::policy::lru::LruEviction;
/// use poolkit::pool::ObjectPool;
/// use poolkit::error::ConstructionError;
///
/// let factory = |key: &Key<&'static str>| {
///     Ok::<_, ConstructionError>(key.identifier().map_or(0, |id| id.len()))
/// };
/// let pool = SharedPool::new(ObjectPool::new(factory, AlwaysAdmit, LruEviction::new()));
///
/// let first = pool.fetch(Key::new("abc")).unwrap();
/// let id = first.id();
/// drop(first);
///
/// let again = pool.fetch(Key::new("abc")).unwrap();
/// assert_eq!(again.id(), id);
/// assert_eq!(*again, 3);
/// ```
pub struct SharedPool<I, P, T, F, A, E>
where
    T: 'static,
{
    inner: Rc<RefCell<ObjectPool<I, P, T, F, A, E>>>,
    parked: Rc<Parked<T>>,
}

impl<I, P, T, F, A, E> SharedPool<I, P, T, F, A, E>
where
    I: Ord + Clone + 'static,
    P: Ord + Clone + 'static,
    T: 'static,
    F: Factory<I, P, T> + 'static,
    A: AdmissionPolicy + 'static,
    E: EvictionPolicy + 'static,
{
    /// Wraps a pool for shared, auto-releasing use.
    pub fn new(pool: ObjectPool<I, P, T, F, A, E>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(pool)),
            parked: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Fetches an instance that releases itself on drop.
    pub fn fetch(&self, key: Key<I, P>) -> PoolResult<Pooled<T>> {
        self.return_parked();
        let lease = self.inner.borrow_mut().fetch(key)?;
        let sink: Rc<RefCell<dyn ReleaseSink<T>>> = self.inner.clone();
        Ok(Pooled {
            lease: ManuallyDrop::new(lease),
            pool: Rc::downgrade(&sink),
            parked: Rc::downgrade(&self.parked),
        })
    }

    /// Releases a lease obtained through [`Pooled::detach`].
    pub fn release(&self, lease: Lease<T>) -> Result<(), ReleaseError<T>> {
        self.return_parked();
        self.inner.borrow_mut().release(lease)
    }

    /// Shared access to the underlying pool.
    pub fn borrow(&self) -> Ref<'_, ObjectPool<I, P, T, F, A, E>> {
        self.return_parked();
        self.inner.borrow()
    }

    /// Exclusive access to the underlying pool.
    pub fn borrow_mut(&self) -> RefMut<'_, ObjectPool<I, P, T, F, A, E>> {
        self.return_parked();
        self.inner.borrow_mut()
    }

    /// Number of dropped handles waiting to be returned.
    pub fn parked_len(&self) -> usize {
        self.parked.borrow().len()
    }

    /// Releases leases parked by handles dropped while the pool was borrowed.
    fn return_parked(&self) {
        let Ok(mut pool) = self.inner.try_borrow_mut() else {
            return;
        };
        let parked = std::mem::take(&mut *self.parked.borrow_mut());
        for lease in parked {
            if let Err(err) = pool.release(lease) {
                tracing::warn!(error = %err, "parked release refused");
            }
        }
    }
}

impl<I, P, T: 'static, F, A, E> Clone for SharedPool<I, P, T, F, A, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            parked: Rc::clone(&self.parked),
        }
    }
}
