//! Encoded adjacency: link endpoints and node incidence lists.
//!
//! `link_connections` holds one `[start, end]` pair of `u32` ids per link
//! position. `node_connections` is a CSR pair whose records are
//! `[len: u32][link: u32; len]`, one per node position.

use std::fmt;

use tracing::debug;

use crate::index::asset::{AssetIndex, AssetIndexView};
use crate::model::{EdgeStore, Topology};
use crate::primitives::buffer::{
    BufferStrategy, FixedCodec, FixedSizeBufferBuilder, FixedSizeBufferView, VarCodec,
    VariableBuffers, VariableSizeBufferBuilder, VariableSizeBufferView,
};
use crate::primitives::bytes::buf::Cursor;
use crate::primitives::bytes::le;
use crate::types::{AssetId, IndexError, InternalId, Partition, Result};

/// Codec for a link's `[start, end]` endpoint pair.
#[derive(Clone, Copy, Debug)]
pub struct LinkConnectionsCodec;

impl FixedCodec for LinkConnectionsCodec {
    type Value = [InternalId; 2];
    const RECORD_SIZE: usize = 2 * le::U32_LEN;

    fn encode(value: &[InternalId; 2], dst: &mut [u8]) {
        le::put_u32_slice(dst, value.iter().map(|id| id.0));
    }

    fn decode(src: &[u8]) -> [InternalId; 2] {
        [
            InternalId(le::get_u32(&src[..le::U32_LEN])),
            InternalId(le::get_u32(&src[le::U32_LEN..])),
        ]
    }
}

/// Codec for a length-prefixed list of link ids.
#[derive(Clone, Copy, Debug)]
pub struct NodeConnectionsCodec;

impl VarCodec for NodeConnectionsCodec {
    type Value = [InternalId];
    type Decoded = Vec<InternalId>;

    fn size_of(value: &[InternalId]) -> usize {
        le::U32_LEN * (value.len() + 1)
    }

    fn encode(value: &[InternalId], dst: &mut [u8]) {
        le::put_u32(dst, value.len() as u32);
        le::put_u32_slice(&mut dst[le::U32_LEN..], value.iter().map(|id| id.0));
    }

    fn decode(src: &[u8]) -> Result<Vec<InternalId>> {
        let mut cursor = Cursor::new(src);
        let len = cursor.read_u32()? as usize;
        if len > cursor.remaining() / le::U32_LEN {
            return Err(IndexError::Corruption("node connection list truncated"));
        }
        (0..len).map(|_| cursor.read_u32().map(InternalId)).collect()
    }
}

fn link_ids_of<G: EdgeStore>(topology: &Topology<G>, node: InternalId) -> Result<Vec<InternalId>> {
    topology
        .get_links(&AssetId::from(node))
        .iter()
        .map(AssetId::internal_id)
        .collect()
}

/// Exact payload size of every node's incidence record.
///
/// Variable-size buffers are allocated once, so this dry run must agree
/// byte-for-byte with what the encoder later writes.
pub fn calculate_total_node_connections_size<G: EdgeStore>(
    index: &AssetIndex,
    topology: &Topology<G>,
) -> usize {
    index
        .node_ids()
        .map(|id| le::U32_LEN * (topology.get_links(&AssetId::from(id)).len() + 1))
        .sum()
}

/// Finalized adjacency buffers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopologyBuffers<B> {
    /// One endpoint pair per link position.
    pub link_connections: B,
    /// One incidence record per node position.
    pub node_connections: VariableBuffers<B>,
}

impl<B: AsRef<[u8]>> TopologyBuffers<B> {
    /// Combined size in bytes.
    pub fn byte_len(&self) -> usize {
        self.link_connections.as_ref().len() + self.node_connections.byte_len()
    }

    /// Borrows every buffer.
    pub fn as_slices(&self) -> TopologyBuffers<&[u8]> {
        TopologyBuffers {
            link_connections: self.link_connections.as_ref(),
            node_connections: self.node_connections.as_slices(),
        }
    }
}

/// Encodes the live topology in asset-index position order.
///
/// Links may be encoded in any order. Nodes are appended to a CSR buffer and
/// must therefore be encoded in node position order.
pub struct TopologyEncoder<'a, S: BufferStrategy, G: EdgeStore> {
    index: &'a AssetIndex,
    topology: &'a Topology<G>,
    links: FixedSizeBufferBuilder<LinkConnectionsCodec, S>,
    nodes: VariableSizeBufferBuilder<NodeConnectionsCodec, S>,
}

impl<'a, S: BufferStrategy, G: EdgeStore> TopologyEncoder<'a, S, G> {
    /// Sizes both buffers from the index and a dry run over the topology.
    pub fn new(index: &'a AssetIndex, topology: &'a Topology<G>) -> Self {
        let data_len = calculate_total_node_connections_size(index, topology);
        Self {
            index,
            topology,
            links: FixedSizeBufferBuilder::new(index.link_count()),
            nodes: VariableSizeBufferBuilder::new(index.node_count(), data_len),
        }
    }

    /// Writes the endpoints of a registered link.
    pub fn encode_link(&mut self, id: InternalId) -> Result<()> {
        let position = self
            .index
            .link_position(id)
            .ok_or(IndexError::UnknownAsset(id))?;
        let (start, end) = self
            .topology
            .get_nodes(&AssetId::from(id))
            .ok_or(IndexError::UnknownAsset(id))?;
        let pair = [start.internal_id()?, end.internal_id()?];
        self.links.add_at_index(position, &pair);
        Ok(())
    }

    /// Appends the incidence list of the next node in position order.
    pub fn encode_node(&mut self, id: InternalId) -> Result<()> {
        let position = self
            .index
            .node_position(id)
            .ok_or(IndexError::UnknownAsset(id))?;
        let expected = self.nodes.len();
        if position != expected {
            return Err(IndexError::OutOfOrder {
                id,
                expected,
                actual: position,
            });
        }
        let links = link_ids_of(self.topology, id)?;
        self.nodes.add(&links);
        Ok(())
    }

    /// Encodes every link, then every node, and finalizes.
    pub fn encode(mut self) -> Result<TopologyBuffers<S::Buffer>> {
        let index = self.index;
        for id in index.link_ids() {
            self.encode_link(id)?;
        }
        for id in index.node_ids() {
            self.encode_node(id)?;
        }
        let buffers = self.finalize();
        debug!(
            links = index.link_count(),
            nodes = index.node_count(),
            bytes = buffers.byte_len(),
            strategy = S::NAME,
            "index.topology.encoded"
        );
        Ok(buffers)
    }

    /// Freezes every buffer.
    ///
    /// # Panics
    ///
    /// Panics if any node has not been encoded yet.
    pub fn finalize(self) -> TopologyBuffers<S::Buffer> {
        TopologyBuffers {
            link_connections: self.links.finalize(),
            node_connections: self.nodes.finalize(),
        }
    }
}

impl<S: BufferStrategy, G: EdgeStore> fmt::Debug for TopologyEncoder<'_, S, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopologyEncoder")
            .field("links", &self.links)
            .field("nodes", &self.nodes)
            .finish()
    }
}

/// Adjacency lookups over encoded buffers.
///
/// Both queries fail with [`IndexError::NotFound`] for ids that are not
/// registered in the right partition; check membership through the
/// [`AssetIndexView`] first when absence is expected.
#[derive(Clone)]
pub struct TopologyView<B> {
    assets: AssetIndexView<B>,
    links: FixedSizeBufferView<LinkConnectionsCodec, B>,
    nodes: VariableSizeBufferView<NodeConnectionsCodec, B>,
}

impl<B: AsRef<[u8]>> TopologyView<B> {
    /// Pairs the adjacency buffers with the asset index they were encoded against.
    pub fn new(assets: AssetIndexView<B>, buffers: TopologyBuffers<B>) -> Self {
        Self {
            assets,
            links: FixedSizeBufferView::new(buffers.link_connections),
            nodes: VariableSizeBufferView::new(buffers.node_connections),
        }
    }

    /// Underlying asset index view.
    pub fn asset_index(&self) -> &AssetIndexView<B> {
        &self.assets
    }

    /// `[start, end]` node ids of a link.
    pub fn get_nodes(&self, id: impl Into<i64>) -> Result<[InternalId; 2]> {
        let id = id.into();
        let not_found = IndexError::NotFound {
            partition: Partition::Link,
            id,
        };
        let position = self.assets.link_index(id).ok_or_else(|| not_found.clone())?;
        self.links.get(position).ok_or(not_found)
    }

    /// Ids of every link incident to a node.
    pub fn get_links(&self, id: impl Into<i64>) -> Result<Vec<InternalId>> {
        let id = id.into();
        let position = self.assets.node_index(id).ok_or(IndexError::NotFound {
            partition: Partition::Node,
            id,
        })?;
        self.nodes.get(position)
    }
}

impl<B: AsRef<[u8]>> fmt::Debug for TopologyView<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopologyView")
            .field("links", &self.links.count())
            .field("nodes", &self.nodes.count())
            .finish()
    }
}
