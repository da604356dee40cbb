//! Pool statistics.
//!
//! Compiled in with the `metrics` feature. Recording is a pure side channel:
//! nothing in the pool ever reads these counters to make a decision.

pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use metrics_impl::PoolMetrics;
pub use snapshot::PoolMetricsSnapshot;
pub use traits::{MetricsExporter, MetricsReset, MetricsSnapshotProvider, PoolMetricsRecorder};
