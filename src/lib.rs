//! poolkit: a keyed object pool with pluggable admission and eviction
//! strategies.
//!
//! Instances are built on demand by a [`Factory`](factory::Factory), lent out
//! by [`ObjectPool::fetch`](pool::ObjectPool::fetch) and reused after
//! [`ObjectPool::release`](pool::ObjectPool::release). An
//! [`AdmissionPolicy`](traits::AdmissionPolicy) decides whether a miss may
//! construct; an [`EvictionPolicy`](traits::EvictionPolicy) picks an idle
//! victim when admission is full.

pub mod builder;
pub mod error;
pub mod factory;
pub mod handle;
pub mod id;
pub mod key;
pub mod policy;
pub mod pool;
pub mod prelude;
pub mod traits;

#[cfg(feature = "concurrency")]
pub mod concurrent;
#[cfg(feature = "metrics")]
pub mod metrics;
