use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Sink for counters emitted while building index buffers.
///
/// Implementations must be cheap; they are called once per encoded buffer,
/// never on lookup paths.
pub trait IndexMetrics: Send + Sync {
    /// Records a finalized buffer.
    ///
    /// # Parameters
    /// * `kind` - `"asset_index"`, `"asset_type"` or `"topology"`.
    /// * `bytes` - Size of the buffer (or buffer group) in bytes.
    fn buffer_encoded(&self, kind: &'static str, bytes: usize);

    /// Records a completed snapshot.
    fn snapshot_built(&self, links: usize, nodes: usize);
}

/// Discards everything.
#[derive(Default)]
pub struct NoopMetrics;

impl IndexMetrics for NoopMetrics {
    fn buffer_encoded(&self, _kind: &'static str, _bytes: usize) {}
    fn snapshot_built(&self, _links: usize, _nodes: usize) {}
}

/// Thread-safe atomic counters.
#[derive(Default, Debug)]
pub struct CounterMetrics {
    /// Number of snapshots built.
    pub snapshots: AtomicU64,

    /// Links encoded across all snapshots.
    pub links_encoded: AtomicU64,

    /// Nodes encoded across all snapshots.
    pub nodes_encoded: AtomicU64,

    /// Bytes written to asset index buffers.
    pub asset_index_bytes: AtomicU64,

    /// Bytes written to asset type buffers.
    pub asset_type_bytes: AtomicU64,

    /// Bytes written to topology buffers.
    pub topology_bytes: AtomicU64,
}

impl CounterMetrics {
    /// Total bytes across every buffer kind.
    pub fn total_bytes(&self) -> u64 {
        self.asset_index_bytes.load(Ordering::Relaxed)
            + self.asset_type_bytes.load(Ordering::Relaxed)
            + self.topology_bytes.load(Ordering::Relaxed)
    }
}

impl IndexMetrics for CounterMetrics {
    fn buffer_encoded(&self, kind: &'static str, bytes: usize) {
        let counter = match kind {
            "asset_index" => &self.asset_index_bytes,
            "asset_type" => &self.asset_type_bytes,
            "topology" => &self.topology_bytes,
            _ => return,
        };
        counter.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    fn snapshot_built(&self, links: usize, nodes: usize) {
        self.snapshots.fetch_add(1, Ordering::Relaxed);
        self.links_encoded.fetch_add(links as u64, Ordering::Relaxed);
        self.nodes_encoded.fetch_add(nodes as u64, Ordering::Relaxed);
    }
}

/// Returns a shared [`NoopMetrics`].
pub fn default_metrics() -> Arc<dyn IndexMetrics> {
    Arc::new(NoopMetrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_by_kind() {
        let metrics = CounterMetrics::default();
        metrics.buffer_encoded("asset_index", 12);
        metrics.buffer_encoded("topology", 30);
        metrics.buffer_encoded("asset_type", 4);
        metrics.buffer_encoded("unknown", 1_000);
        metrics.snapshot_built(2, 3);
        metrics.snapshot_built(1, 1);

        assert_eq!(metrics.total_bytes(), 46);
        assert_eq!(metrics.snapshots.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.links_encoded.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.nodes_encoded.load(Ordering::Relaxed), 4);
    }
}
