//! Runtime assembly of pools from policy descriptions.
//!
//! Provides a small API to pick admission and eviction strategies from plain
//! data (e.g. values read from a config file) while hiding the boxing of the
//! policy trait objects.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use poolkit::builder::{AdmissionConfig, EvictionConfig, PoolBuilder};
//! use poolkit::error::ConstructionError;
//! use poolkit::key::Key;
//!
//! let mut pool = PoolBuilder::new()
//!     .admission(AdmissionConfig::AmountLimited { max_creation: 8 })
//!     .eviction(EvictionConfig::Random { seed: Some(7) })
//!     .try_build(|_: &Key<u32>| Ok::<_, ConstructionError>(vec![0u8; 64]))
//!     .unwrap();
//!
//! let buf = pool.fetch(Key::new(1)).unwrap();
//! assert_eq!(buf.len(), 64);
//! pool.release(buf).unwrap();
//! assert_eq!(pool.describe(), "ObjectPool(admission=amount-limited, eviction=random, idle=1, checked_out=0)");
//!
//! // Invalid parameters are caught without panicking.
//! let bad = PoolBuilder::new()
//!     .admission(AdmissionConfig::RateLimited { max_count: 2, window: Duration::ZERO })
//!     .try_build(|_: &Key<u32>| Ok::<_, ConstructionError>(()));
//! assert!(bad.is_err());
//! ```

use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;
use crate::factory::{Factory, Registry};
use crate::pool::ObjectPool;
use crate::policy::admission::{AlwaysAdmit, AmountLimited, NeverAdmit, RateLimited};
use crate::policy::aging::AgingEviction;
use crate::policy::lru::LruEviction;
use crate::policy::random::RandomEviction;
use crate::traits::{AdmissionPolicy, EvictionPolicy};

/// Available admission strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionConfig {
    /// Refuse every construction.
    Never,
    /// Allow every construction.
    Always,
    /// At most `max_count` constructions per sliding `window`.
    RateLimited { max_count: usize, window: Duration },
    /// At most `max_creation` live instances; evict beyond that.
    AmountLimited { max_creation: usize },
}

impl AdmissionConfig {
    /// Builds the policy without validating parameters.
    pub fn build(&self) -> Box<dyn AdmissionPolicy> {
        match *self {
            AdmissionConfig::Never => Box::new(NeverAdmit),
            AdmissionConfig::Always => Box::new(AlwaysAdmit),
            AdmissionConfig::RateLimited { max_count, window } => {
                Box::new(RateLimited::new(max_count, window))
            },
            AdmissionConfig::AmountLimited { max_creation } => {
                Box::new(AmountLimited::new(max_creation))
            },
        }
    }

    /// Builds the policy, rejecting zero limits and empty windows.
    pub fn try_build(&self) -> Result<Box<dyn AdmissionPolicy>, ConfigError> {
        Ok(match *self {
            AdmissionConfig::Never => Box::new(NeverAdmit),
            AdmissionConfig::Always => Box::new(AlwaysAdmit),
            AdmissionConfig::RateLimited { max_count, window } => {
                Box::new(RateLimited::try_new(max_count, window)?)
            },
            AdmissionConfig::AmountLimited { max_creation } => {
                Box::new(AmountLimited::try_new(max_creation)?)
            },
        })
    }
}

/// Available eviction strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvictionConfig {
    /// Lowest completed-usage count.
    Lru { zero_score_veto: bool },
    /// Lowest exponentially decayed recency.
    Aging { zero_score_veto: bool },
    /// Uniformly random idle instance; `seed` makes it reproducible.
    Random { seed: Option<u64> },
}

impl EvictionConfig {
    /// Builds the policy.
    pub fn build(&self) -> Box<dyn EvictionPolicy> {
        match *self {
            EvictionConfig::Lru { zero_score_veto } => {
                Box::new(LruEviction::new().with_zero_score_veto(zero_score_veto))
            },
            EvictionConfig::Aging { zero_score_veto } => {
                Box::new(AgingEviction::new().with_zero_score_veto(zero_score_veto))
            },
            EvictionConfig::Random { seed: Some(seed) } => {
                Box::new(RandomEviction::with_seed(seed))
            },
            EvictionConfig::Random { seed: None } => Box::new(RandomEviction::new()),
        }
    }
}

/// Builder for [`ObjectPool`]s with runtime-selected policies.
///
/// Defaults to [`AdmissionConfig::Always`] and LRU eviction with the
/// zero-score veto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolBuilder {
    admission: AdmissionConfig,
    eviction: EvictionConfig,
}

impl PoolBuilder {
    /// Creates a builder with the default policies.
    pub fn new() -> Self {
        Self {
            admission: AdmissionConfig::Always,
            eviction: EvictionConfig::Lru {
                zero_score_veto: true,
            },
        }
    }

    /// Selects the admission strategy.
    pub fn admission(mut self, config: AdmissionConfig) -> Self {
        self.admission = config;
        self
    }

    /// Selects the eviction strategy.
    pub fn eviction(mut self, config: EvictionConfig) -> Self {
        self.eviction = config;
        self
    }

    /// Builds a pool around `factory` without validating parameters.
    ///
    /// A zero limit produces a pool that can never construct anything.
    pub fn build<I, P, T, F>(self, factory: F) -> ObjectPool<I, P, T, F>
    where
        I: Ord + Clone,
        P: Ord + Clone,
        F: Factory<I, P, T>,
    {
        ObjectPool::new(factory, self.admission.build(), self.eviction.build())
    }

    /// Builds a pool around `factory`, rejecting invalid parameters.
    pub fn try_build<I, P, T, F>(self, factory: F) -> Result<ObjectPool<I, P, T, F>, ConfigError>
    where
        I: Ord + Clone,
        P: Ord + Clone,
        F: Factory<I, P, T>,
    {
        let admission = self.admission.try_build()?;
        Ok(ObjectPool::new(factory, admission, self.eviction.build()))
    }

    /// Builds a pool backed by an empty [`Registry`].
    pub fn try_build_with_registry<I, P, T>(
        self,
    ) -> Result<ObjectPool<I, P, T, Registry<I, P, T>>, ConfigError>
    where
        I: Ord + Clone + fmt::Debug,
        P: Ord + Clone,
    {
        self.try_build(Registry::new())
    }
}

impl Default for PoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}
