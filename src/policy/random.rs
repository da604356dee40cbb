//! Random eviction policy.
//!
//! Keeps a dense list of idle instance ids and evicts one chosen uniformly
//! at random. No scores, no access-pattern tracking; this is the baseline
//! the other policies are measured against.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                        RandomEviction                            │
//!   │                                                                  │
//!   │   index: FxHashMap<InstanceId, usize>   idle: Vec<InstanceId>    │
//!   │                                                                  │
//!   │   ┌──────┬─────┐                       ┌────┬────┬────┬────┐     │
//!   │   │  #3  │  0  │─────────────────────► │ #3 │ #7 │ #1 │ #4 │     │
//!   │   │  #7  │  1  │                       └────┴────┴────┴────┘     │
//!   │   │  ... │ ... │                                                 │
//!   │   └──────┴─────┘                                                 │
//!   └──────────────────────────────────────────────────────────────────┘
//!
//!   evict():
//!     1. i = uniform(0..len)
//!     2. target.remove(idle[i])
//!     3. swap_remove(i), fix the moved id's index
//! ```
//!
//! Ids enter the list on release and leave it on fetch or eviction, so the
//! list is always exactly the idle set and a checked-out instance is never
//! drawn.
//!
//! ## Thread Safety
//!
//! Not thread-safe; driven by the single-threaded pool core.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

use crate::error::{PoolError, PoolResult};
use crate::id::InstanceId;
use crate::traits::{EvictionPolicy, EvictionTarget};

/// Uniformly random eviction among idle instances.
#[derive(Debug, Clone)]
pub struct RandomEviction {
    idle: Vec<InstanceId>,
    index: FxHashMap<InstanceId, usize>,
    rng: SmallRng,
}

impl RandomEviction {
    /// Creates the policy seeded from the operating system.
    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_os_rng())
    }

    /// Creates a deterministic policy, for tests and reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        Self {
            idle: Vec::new(),
            index: FxHashMap::default(),
            rng,
        }
    }

    /// Ids currently eligible for eviction.
    pub fn idle_ids(&self) -> &[InstanceId] {
        &self.idle
    }

    fn push_idle(&mut self, id: InstanceId) {
        if self.index.contains_key(&id) {
            return;
        }
        self.index.insert(id, self.idle.len());
        self.idle.push(id);
    }

    fn remove_idle(&mut self, id: InstanceId) {
        let Some(pos) = self.index.remove(&id) else {
            return;
        };
        self.idle.swap_remove(pos);
        if let Some(&moved) = self.idle.get(pos) {
            self.index.insert(moved, pos);
        }

        #[cfg(debug_assertions)]
        self.validate_invariants();
    }

    #[cfg(debug_assertions)]
    fn validate_invariants(&self) {
        debug_assert_eq!(self.idle.len(), self.index.len());
        for (pos, id) in self.idle.iter().enumerate() {
            debug_assert_eq!(self.index.get(id), Some(&pos));
        }
    }
}

impl Default for RandomEviction {
    fn default() -> Self {
        Self::new()
    }
}

impl EvictionPolicy for RandomEviction {
    fn name(&self) -> &'static str {
        "random"
    }

    fn on_admitted(&mut self, _id: InstanceId) {}

    fn on_fetch(&mut self, id: InstanceId) {
        self.remove_idle(id);
    }

    fn on_release(&mut self, id: InstanceId) {
        self.push_idle(id);
    }

    fn on_evicted(&mut self, id: InstanceId) {
        self.remove_idle(id);
    }

    fn evict(&mut self, target: &mut dyn EvictionTarget) -> PoolResult<InstanceId> {
        if self.idle.is_empty() {
            return Err(PoolError::EvictionImpossible {
                policy: self.name(),
                reason: "no idle instance to evict".into(),
            });
        }
        let victim = self.idle[self.rng.random_range(0..self.idle.len())];
        target.remove(victim)?;
        self.remove_idle(victim);
        Ok(victim)
    }

    fn tracked(&self) -> usize {
        self.idle.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::lru::test_support::FakeTarget;

    fn id(n: u64) -> InstanceId {
        InstanceId(n)
    }

    #[test]
    fn release_and_fetch_maintain_idle_list() {
        let mut policy = RandomEviction::with_seed(7);
        policy.on_admitted(id(0));
        policy.on_release(id(0));
        policy.on_release(id(1));
        policy.on_release(id(1));
        assert_eq!(policy.tracked(), 2);

        policy.on_fetch(id(0));
        assert_eq!(policy.idle_ids(), &[id(1)]);
    }

    #[test]
    fn evict_fails_on_empty_list() {
        let mut policy = RandomEviction::with_seed(1);
        let mut target = FakeTarget::default();
        assert!(policy.evict(&mut target).unwrap_err().is_eviction_impossible());
    }

    #[test]
    fn evict_removes_exactly_one_idle_instance() {
        let mut policy = RandomEviction::with_seed(42);
        for n in 0..5 {
            policy.on_release(id(n));
        }
        let mut target = FakeTarget::with_idle(&[0, 1, 2, 3, 4]);

        let victim = policy.evict(&mut target).unwrap();
        assert_eq!(target.removed, vec![victim]);
        assert_eq!(policy.tracked(), 4);
        assert!(!policy.idle_ids().contains(&victim));
    }

    #[test]
    fn same_seed_same_victims() {
        let run = |seed| {
            let mut policy = RandomEviction::with_seed(seed);
            for n in 0..16 {
                policy.on_release(id(n));
            }
            let mut target = FakeTarget::with_idle(&(0..16).collect::<Vec<_>>());
            (0..8)
                .map(|_| policy.evict(&mut target).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn every_idle_instance_can_be_drawn() {
        let mut policy = RandomEviction::with_seed(3);
        let mut seen = rustc_hash::FxHashSet::default();
        for _ in 0..200 {
            for n in 0..4 {
                policy.on_release(id(n));
            }
            let mut target = FakeTarget::with_idle(&[0, 1, 2, 3]);
            seen.insert(policy.evict(&mut target).unwrap());
            for n in 0..4 {
                policy.on_evicted(id(n));
            }
        }
        assert_eq!(seen.len(), 4);
    }
}
