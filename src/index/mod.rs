//! Binary index layer over the live network model.
//!
//! Each encoder walks an [`AssetIndex`] in position order and writes one
//! family of buffers; each view answers queries from those buffers alone.
//! [`NetworkSnapshot`] bundles all of them.

pub mod asset;
pub mod asset_type;
/// Build-time counters.
pub mod metrics;
/// Snapshot construction settings.
pub mod options;
pub mod snapshot;
pub mod topology;

pub use asset::{AssetIndex, AssetIndexEncoder, AssetIndexView};
pub use asset_type::{AssetTypeBuffers, AssetTypeEncoder, AssetTypeQueries, AssetTypeView};
pub use metrics::{default_metrics, CounterMetrics, IndexMetrics, NoopMetrics};
pub use options::SnapshotOptions;
pub use snapshot::NetworkSnapshot;
pub use topology::{
    calculate_total_node_connections_size, TopologyBuffers, TopologyEncoder, TopologyView,
};
