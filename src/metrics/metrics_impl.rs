use crate::metrics::snapshot::PoolMetricsSnapshot;
use crate::metrics::traits::{MetricsReset, MetricsSnapshotProvider, PoolMetricsRecorder};

#[derive(Debug, Default, Clone)]
pub struct PoolMetrics {
    pub created: u64,
    pub fetched: u64,
    pub hits: u64,
    pub misses: u64,
    pub released: u64,
    pub destroyed: u64,
    pub live: u64,
    pub checked_out: u64,
}

impl PoolMetricsRecorder for PoolMetrics {
    fn record_create(&mut self) {
        self.created += 1;
        self.live += 1;
    }

    fn record_fetch(&mut self, hit: bool) {
        self.fetched += 1;
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        self.checked_out += 1;
    }

    fn record_release(&mut self) {
        self.released += 1;
        self.checked_out = self.checked_out.saturating_sub(1);
    }

    fn record_destroy(&mut self) {
        self.destroyed += 1;
        self.live = self.live.saturating_sub(1);
    }
}

impl MetricsSnapshotProvider<PoolMetricsSnapshot> for PoolMetrics {
    fn snapshot(&self) -> PoolMetricsSnapshot {
        PoolMetricsSnapshot {
            created: self.created,
            fetched: self.fetched,
            hits: self.hits,
            misses: self.misses,
            released: self.released,
            destroyed: self.destroyed,
            live: self.live,
            checked_out: self.checked_out,
        }
    }
}

impl MetricsReset for PoolMetrics {
    /// Clears the counters. Gauges describe current state and are kept.
    fn reset_metrics(&mut self) {
        *self = PoolMetrics {
            live: self.live,
            checked_out: self.checked_out,
            ..PoolMetrics::default()
        };
    }
}
