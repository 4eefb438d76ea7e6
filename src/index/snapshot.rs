//! Every encoded buffer of a network, built in one pass.

use tracing::debug;

use crate::index::asset::{AssetIndex, AssetIndexView};
use crate::index::asset_type::{AssetTypeBuffers, AssetTypeEncoder, AssetTypeView};
use crate::index::options::SnapshotOptions;
use crate::index::topology::{TopologyBuffers, TopologyEncoder, TopologyView};
use crate::model::{AssetsMap, EdgeStore, Topology};
use crate::primitives::buffer::BufferStrategy;
use crate::types::{AssetId, IndexError, InternalId, Partition, Result};

/// Immutable encoded state of a network.
///
/// With [`crate::primitives::buffer::Shared`] backing the snapshot is
/// `Send + Sync` and clones share the underlying bytes, so it can be handed
/// to a worker thread while the live model keeps changing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkSnapshot<B> {
    asset_index: B,
    asset_types: AssetTypeBuffers<B>,
    topology: TopologyBuffers<B>,
    link_count: usize,
    node_count: usize,
}

fn check_member(
    index: &AssetIndex,
    owner: InternalId,
    asset: &AssetId,
    expected: Partition,
) -> Result<()> {
    let id = asset.internal_id()?;
    match index.partition_of(id) {
        Some(partition) if partition == expected => Ok(()),
        Some(_) => Err(IndexError::PartitionMismatch { id, expected }),
        None => {
            debug!(owner = owner.0, asset = id.0, "index.snapshot.dangling_reference");
            Err(IndexError::UnknownAsset(id))
        }
    }
}

impl<B: AsRef<[u8]>> NetworkSnapshot<B> {
    /// Encodes the asset index, asset types, and topology of a network.
    pub fn build<S, G>(
        index: &AssetIndex,
        assets: &AssetsMap,
        topology: &Topology<G>,
        opts: &SnapshotOptions,
    ) -> Result<Self>
    where
        S: BufferStrategy<Buffer = B>,
        G: EdgeStore,
    {
        if opts.validate_endpoints {
            for link in index.link_ids() {
                if let Some((start, end)) = topology.get_nodes(&AssetId::from(link)) {
                    check_member(index, link, start, Partition::Node)?;
                    check_member(index, link, end, Partition::Node)?;
                }
            }
            // incidence lists are encoded per node
            for node in index.node_ids() {
                for link in topology.get_links(&AssetId::from(node)) {
                    check_member(index, node, &link, Partition::Link)?;
                }
            }
        }

        let asset_index = index.encoder::<S>().encode()?;
        opts.metrics
            .buffer_encoded("asset_index", asset_index.as_ref().len());

        let asset_types = AssetTypeEncoder::<S>::new(index, assets).encode()?;
        opts.metrics.buffer_encoded("asset_type", asset_types.byte_len());

        let topology = TopologyEncoder::<S, G>::new(index, topology).encode()?;
        opts.metrics.buffer_encoded("topology", topology.byte_len());

        let snapshot = NetworkSnapshot {
            asset_index,
            asset_types,
            topology,
            link_count: index.link_count(),
            node_count: index.node_count(),
        };
        opts.metrics
            .snapshot_built(snapshot.link_count, snapshot.node_count);
        debug!(
            links = snapshot.link_count,
            nodes = snapshot.node_count,
            bytes = snapshot.byte_size(),
            strategy = S::NAME,
            "index.snapshot.built"
        );
        Ok(snapshot)
    }

    /// Id to position lookups.
    pub fn asset_index_view(&self) -> AssetIndexView<&[u8]> {
        AssetIndexView::new(self.asset_index.as_ref())
    }

    /// Subtype lookups.
    pub fn asset_type_view(&self) -> AssetTypeView<&[u8]> {
        AssetTypeView::new(self.asset_index_view(), self.asset_types.as_slices())
    }

    /// Adjacency lookups.
    pub fn topology_view(&self) -> TopologyView<&[u8]> {
        TopologyView::new(self.asset_index_view(), self.topology.as_slices())
    }

    /// Number of links encoded.
    pub fn link_count(&self) -> usize {
        self.link_count
    }

    /// Number of nodes encoded.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Size of the asset index buffer in bytes.
    pub fn asset_index_bytes(&self) -> usize {
        self.asset_index.as_ref().len()
    }

    /// Size of both asset type buffers in bytes.
    pub fn asset_type_bytes(&self) -> usize {
        self.asset_types.byte_len()
    }

    /// Size of every topology buffer in bytes.
    pub fn topology_bytes(&self) -> usize {
        self.topology.byte_len()
    }

    /// Total size of every buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.asset_index_bytes() + self.asset_type_bytes() + self.topology_bytes()
    }
}
