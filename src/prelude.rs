pub use crate::builder::{AdmissionConfig, EvictionConfig, PoolBuilder};
#[cfg(feature = "concurrency")]
pub use crate::concurrent::ConcurrentObjectPool;
pub use crate::error::{ConfigError, ConstructionError, InvariantError, PoolError, PoolResult};
pub use crate::factory::{Factory, Registry};
pub use crate::handle::{Lease, Pooled, ReleaseError, SharedPool};
pub use crate::id::InstanceId;
pub use crate::key::Key;
#[cfg(feature = "metrics")]
pub use crate::metrics::PoolMetricsSnapshot;
pub use crate::policy::admission::{AlwaysAdmit, AmountLimited, NeverAdmit, RateLimited};
pub use crate::policy::aging::AgingEviction;
pub use crate::policy::lru::LruEviction;
pub use crate::policy::random::RandomEviction;
pub use crate::pool::ObjectPool;
pub use crate::traits::{AdmissionPolicy, EvictionPolicy, EvictionTarget};
