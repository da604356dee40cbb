/// Point-in-time copy of a pool's counters and gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolMetricsSnapshot {
    pub created: u64,
    pub fetched: u64,
    pub hits: u64,
    pub misses: u64,
    pub released: u64,
    pub destroyed: u64,

    // gauges captured at snapshot time
    pub live: u64,
    pub checked_out: u64,
}

impl PoolMetricsSnapshot {
    /// Fraction of fetches served from the idle pool, `0.0` before any fetch.
    pub fn hit_rate(&self) -> f64 {
        if self.fetched == 0 {
            0.0
        } else {
            self.hits as f64 / self.fetched as f64
        }
    }

    /// Live instances currently idle.
    pub fn idle(&self) -> u64 {
        self.live.saturating_sub(self.checked_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_handles_zero_fetches() {
        assert_eq!(PoolMetricsSnapshot::default().hit_rate(), 0.0);
    }

    #[test]
    fn hit_rate_and_idle() {
        let snap = PoolMetricsSnapshot {
            fetched: 4,
            hits: 3,
            live: 5,
            checked_out: 2,
            ..Default::default()
        };
        assert_eq!(snap.hit_rate(), 0.75);
        assert_eq!(snap.idle(), 3);
    }
}
