//! # Metrics Trait Hierarchy
//!
//! Separates *recording*, *snapshotting* and *export* into small traits so the
//! pool core only ever talks to a recorder.
//!
//! ```text
//!   ┌──────────────────────────────┐
//!   │     PoolMetricsRecorder      │  written by ObjectPool on every
//!   │  create/fetch/release/destroy│  lifecycle transition
//!   └──────────────┬───────────────┘
//!                  │
//!   Consumption (decoupled from recording):
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (tests, dashboards)          │    │ (production monitoring)      │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```

/// Lifecycle counters for a keyed object pool.
pub trait PoolMetricsRecorder {
    /// A new instance was built by the factory.
    fn record_create(&mut self);
    /// An instance was handed out; `hit` is `true` when it came from the
    /// idle pool.
    fn record_fetch(&mut self, hit: bool);
    /// An instance came back to the idle pool.
    fn record_release(&mut self);
    /// An instance was destroyed.
    fn record_destroy(&mut self);
}

/// Snapshot provider for tests and dashboards.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&mut self);
}

/// Export/publish metrics to production monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
