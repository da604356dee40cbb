use std::io::Write;
use std::sync::Mutex;

use crate::metrics::snapshot::PoolMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for pool metrics snapshots.
///
/// This exporter writes in the Prometheus text exposition format so it can be
/// scraped by Prometheus or forwarded to an OpenTelemetry collector.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    /// Creates an exporter writing to `writer`. Every metric name is
    /// prefixed with `prefix_`; an empty prefix leaves names bare.
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the exporter and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_metric(&self, kind: &str, suffix: &str, value: u64) {
        let name = self.metric_name(suffix);
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send> MetricsExporter<PoolMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &PoolMetricsSnapshot) {
        self.write_metric("counter", "created_total", snapshot.created);
        self.write_metric("counter", "fetched_total", snapshot.fetched);
        self.write_metric("counter", "hits_total", snapshot.hits);
        self.write_metric("counter", "misses_total", snapshot.misses);
        self.write_metric("counter", "released_total", snapshot.released);
        self.write_metric("counter", "destroyed_total", snapshot.destroyed);
        self.write_metric("gauge", "live", snapshot.live);
        self.write_metric("gauge", "checked_out", snapshot.checked_out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_prefixed_prometheus_text() {
        let exporter = PrometheusTextExporter::new("pool", Vec::new());
        exporter.export(&PoolMetricsSnapshot {
            created: 2,
            hits: 5,
            live: 2,
            ..Default::default()
        });
        let text = String::from_utf8(exporter.into_inner()).unwrap();
        assert!(text.contains("# TYPE pool_created_total counter\npool_created_total 2\n"));
        assert!(text.contains("pool_hits_total 5"));
        assert!(text.contains("# TYPE pool_live gauge\npool_live 2\n"));
    }

    #[test]
    fn empty_prefix_uses_bare_names() {
        let exporter = PrometheusTextExporter::new("", Vec::new());
        exporter.export(&PoolMetricsSnapshot::default());
        let text = String::from_utf8(exporter.into_inner()).unwrap();
        assert!(text.starts_with("# TYPE created_total counter\ncreated_total 0\n"));
    }
}
