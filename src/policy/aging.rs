//! # Aging Eviction
//!
//! A decayed-recency variant of usage-count eviction. Every release shifts
//! all tracked scores right by one bit and sets the top bit of the instance
//! being released:
//!
//! ```text
//!   release(#1):
//!
//!     #0  1000_0000 ──► 0100_0000
//!     #1  0100_0000 ──► 0010_0000 | 1000_0000 = 1010_0000
//!     #2  0000_0000 ──► 0000_0000
//! ```
//!
//! An instance that was popular long ago keeps drifting toward zero unless it
//! keeps being used, so it eventually loses to instances with recent
//! activity. Victim selection and the zero-score veto are shared with
//! [`LruEviction`](crate::policy::lru::LruEviction).
//!
//! Decay is O(n) per release over all tracked instances.

use rustc_hash::FxHashMap;

use crate::error::PoolResult;
use crate::id::InstanceId;
use crate::policy::lru::evict_lowest;
use crate::traits::{EvictionPolicy, EvictionTarget};

/// Bit set on the released instance after each decay step.
pub const AGING_TOP_BIT: u32 = 1 << (u32::BITS - 1);

/// Eviction by exponentially decayed recency.
#[derive(Debug, Clone)]
pub struct AgingEviction {
    scores: FxHashMap<InstanceId, u32>,
    zero_score_veto: bool,
}

impl AgingEviction {
    /// Creates the policy with the zero-score veto enabled.
    pub fn new() -> Self {
        Self {
            scores: FxHashMap::default(),
            zero_score_veto: true,
        }
    }

    /// Enables or disables the zero-score veto.
    pub fn with_zero_score_veto(mut self, enabled: bool) -> Self {
        self.zero_score_veto = enabled;
        self
    }

    /// Current score of `id`, if tracked.
    pub fn score(&self, id: InstanceId) -> Option<u32> {
        self.scores.get(&id).copied()
    }
}

impl Default for AgingEviction {
    fn default() -> Self {
        Self::new()
    }
}

impl EvictionPolicy for AgingEviction {
    fn name(&self) -> &'static str {
        "aging"
    }

    fn on_admitted(&mut self, id: InstanceId) {
        self.scores.insert(id, 0);
    }

    fn on_fetch(&mut self, _id: InstanceId) {}

    fn on_release(&mut self, id: InstanceId) {
        for score in self.scores.values_mut() {
            *score >>= 1;
        }
        if let Some(score) = self.scores.get_mut(&id) {
            *score |= AGING_TOP_BIT;
        }
    }

    fn on_evicted(&mut self, id: InstanceId) {
        self.scores.remove(&id);
    }

    fn evict(&mut self, target: &mut dyn EvictionTarget) -> PoolResult<InstanceId> {
        let name = self.name();
        evict_lowest(&mut self.scores, self.zero_score_veto, name, target)
    }

    fn tracked(&self) -> usize {
        self.scores.len()
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
    fn release_sets_top_bit_and_decays_others() {
        let mut policy = AgingEviction::new();
        policy.on_admitted(id(0));
        policy.on_admitted(id(1));

        policy.on_release(id(0));
        assert_eq!(policy.score(id(0)), Some(AGING_TOP_BIT));
        assert_eq!(policy.score(id(1)), Some(0));

        policy.on_release(id(1));
        assert_eq!(policy.score(id(0)), Some(AGING_TOP_BIT >> 1));
        assert_eq!(policy.score(id(1)), Some(AGING_TOP_BIT));
    }

    #[test]
    fn repeated_use_accumulates_high_bits() {
        let mut policy = AgingEviction::new();
        policy.on_admitted(id(0));
        policy.on_release(id(0));
        policy.on_release(id(0));
        assert_eq!(policy.score(id(0)), Some(AGING_TOP_BIT | (AGING_TOP_BIT >> 1)));
    }

    #[test]
    fn old_popularity_loses_to_recent_use() {
        let mut policy = AgingEviction::new();
        policy.on_admitted(id(0));
        policy.on_admitted(id(1));
        for _ in 0..4 {
            policy.on_release(id(0));
        }
        // #1 is released twice, most recently; the history of #0 decays.
        policy.on_release(id(1));
        policy.on_release(id(1));
        let mut target = FakeTarget::with_idle(&[0, 1]);
        assert_eq!(policy.evict(&mut target), Ok(id(0)));
    }

    #[test]
    fn zero_scores_veto_eviction() {
        let mut policy = AgingEviction::new();
        policy.on_admitted(id(0));
        let mut target = FakeTarget::with_idle(&[0]);
        assert!(policy.evict(&mut target).unwrap_err().is_eviction_impossible());

        let mut permissive = AgingEviction::new().with_zero_score_veto(false);
        permissive.on_admitted(id(0));
        assert_eq!(permissive.evict(&mut target), Ok(id(0)));
        assert_eq!(permissive.tracked(), 0);
    }
}
