//! Instance and pool identities.
//!
//! Strategies and the checked-out registry never see instances themselves,
//! only their [`InstanceId`]. Ids are handed out monotonically and never
//! reused inside one pool, so a stale id can never alias a newer instance.
//! Every pool also draws a process-unique [`PoolId`]; handles remember it so
//! a handle from another pool is rejected on release.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one constructed instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(pub(crate) u64);

impl InstanceId {
    /// Raw sequence number, unique within the owning pool.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Process-unique identity of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolId(u64);

impl PoolId {
    pub(crate) fn next() -> Self {
        PoolId(NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Monotonic allocator of [`InstanceId`]s.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub(crate) fn allocate(&mut self) -> InstanceId {
        let id = InstanceId(self.next);
        self.next += 1;
        id
    }

    /// Id the next `allocate` call will return.
    pub(crate) fn peek(&self) -> InstanceId {
        InstanceId(self.next)
    }
}
