//! # Usage-Count (LRU) Eviction
//!
//! Scores every instance by how many usage cycles it has completed. An
//! instance starts at 0 when constructed and gains one point each time it is
//! released back to the pool. Eviction reclaims the idle instance with the
//! lowest score.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                          LruEviction                             │
//!   │                                                                  │
//!   │   scores: FxHashMap<InstanceId, u64>                             │
//!   │                                                                  │
//!   │   ┌────────────┬───────┬──────────┐                              │
//!   │   │ InstanceId │ Score │  State   │                              │
//!   │   ├────────────┼───────┼──────────┤                              │
//!   │   │     #0     │   3   │  idle    │                              │
//!   │   │     #1     │   1   │  idle    │  ◄── victim (lowest idle)    │
//!   │   │     #2     │   0   │  out     │      (never a checked-out id)│
//!   │   └────────────┴───────┴──────────┘                              │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Zero-Score Veto
//!
//! When the highest score among all tracked instances is still 0, nothing
//! has ever completed a usage cycle and eviction fails with
//! [`PoolError::EvictionImpossible`]. This keeps a freshly constructed
//! instance from being thrown away before it was used once. The veto is on by
//! default and can be switched off with
//! [`with_zero_score_veto`](LruEviction::with_zero_score_veto).
//!
//! ## Operations
//!
//! | Operation     | Time       | Notes                                |
//! |---------------|------------|--------------------------------------|
//! | `on_admitted` | O(1)       | score = 0                            |
//! | `on_release`  | O(1)       | score += 1                           |
//! | `evict`       | O(n)       | scan for the lowest idle score       |
//!
//! ## Example Usage
//!
//! ```
//! use poolkit::policy::lru::LruEviction;
//! use poolkit::traits::EvictionPolicy;
//!
//! let policy = LruEviction::new().with_zero_score_veto(false);
//! assert_eq!(policy.name(), "lru");
//! assert_eq!(policy.tracked(), 0);
//! ```

use rustc_hash::FxHashMap;

use crate::error::{PoolError, PoolResult};
use crate::id::InstanceId;
use crate::traits::{EvictionPolicy, EvictionTarget};

/// Eviction by completed usage cycles.
#[derive(Debug, Clone)]
pub struct LruEviction {
    scores: FxHashMap<InstanceId, u64>,
    zero_score_veto: bool,
}

impl LruEviction {
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
    pub fn score(&self, id: InstanceId) -> Option<u64> {
        self.scores.get(&id).copied()
    }
}

impl Default for LruEviction {
    fn default() -> Self {
        Self::new()
    }
}

impl EvictionPolicy for LruEviction {
    fn name(&self) -> &'static str {
        "lru"
    }

    fn on_admitted(&mut self, id: InstanceId) {
        self.scores.insert(id, 0);
    }

    fn on_fetch(&mut self, _id: InstanceId) {}

    fn on_release(&mut self, id: InstanceId) {
        if let Some(score) = self.scores.get_mut(&id) {
            *score = score.saturating_add(1);
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

/// Removes the idle instance with the lowest `(score, id)` pair.
///
/// Shared by the usage-count and aging policies; they differ only in how
/// scores evolve, not in how victims are picked.
pub(crate) fn evict_lowest<S>(
    scores: &mut FxHashMap<InstanceId, S>,
    zero_score_veto: bool,
    policy: &'static str,
    target: &mut dyn EvictionTarget,
) -> PoolResult<InstanceId>
where
    S: Copy + Ord + Default,
{
    let max = scores.values().copied().max().unwrap_or_default();
    if zero_score_veto && max == S::default() {
        return Err(PoolError::EvictionImpossible {
            policy,
            reason: format!(
                "none of {} tracked instances has completed a usage cycle",
                scores.len()
            ),
        });
    }

    let victim = scores
        .iter()
        .filter(|(id, _)| target.is_idle(**id))
        .map(|(id, score)| (*score, *id))
        .min()
        .map(|(_, id)| id)
        .ok_or_else(|| PoolError::EvictionImpossible {
            policy,
            reason: "no idle instance to evict".into(),
        })?;

    target.remove(victim)?;
    scores.remove(&victim);
    Ok(victim)
}
