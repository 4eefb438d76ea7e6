//! Per-position concrete subtype of every asset.
//!
//! Two independent one-byte-per-record buffers, one addressed by link
//! position and one by node position. Unlike the asset index they are
//! sized by asset count, not by id range.

use std::fmt;

use tracing::debug;

use crate::index::asset::{AssetIndex, AssetIndexView};
use crate::model::AssetsMap;
use crate::primitives::buffer::{
    BufferStrategy, FixedSizeBufferBuilder, FixedSizeBufferView, U8Codec,
};
use crate::types::{AssetType, IndexError, InternalId, LinkType, NodeType, Partition, Result};

/// Type lookups shared by the live model and the encoded view.
///
/// Every query answers `None` for id 0, negative ids, unknown ids, and ids
/// of the other partition.
pub trait AssetTypeQueries {
    /// Subtype of a link.
    fn link_type(&self, id: impl Into<i64>) -> Option<LinkType>;

    /// Subtype of a node.
    fn node_type(&self, id: impl Into<i64>) -> Option<NodeType>;

    /// Subtype of any asset, trying the link partition first.
    fn asset_type(&self, id: impl Into<i64>) -> Option<AssetType> {
        let id = id.into();
        self.link_type(id)
            .map(AssetType::Link)
            .or_else(|| self.node_type(id).map(AssetType::Node))
    }
}

impl AssetTypeQueries for AssetsMap {
    fn link_type(&self, id: impl Into<i64>) -> Option<LinkType> {
        let asset = self.get(InternalId::from_raw(id.into())?)?;
        match asset.asset_type {
            AssetType::Link(ty) => Some(ty),
            AssetType::Node(_) => None,
        }
    }

    fn node_type(&self, id: impl Into<i64>) -> Option<NodeType> {
        let asset = self.get(InternalId::from_raw(id.into())?)?;
        match asset.asset_type {
            AssetType::Node(ty) => Some(ty),
            AssetType::Link(_) => None,
        }
    }
}

/// Finalized link and node type buffers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetTypeBuffers<B> {
    /// One code per link position.
    pub link_types: B,
    /// One code per node position.
    pub node_types: B,
}

impl<B: AsRef<[u8]>> AssetTypeBuffers<B> {
    /// Combined size in bytes.
    pub fn byte_len(&self) -> usize {
        self.link_types.as_ref().len() + self.node_types.as_ref().len()
    }

    /// Borrows both buffers.
    pub fn as_slices(&self) -> AssetTypeBuffers<&[u8]> {
        AssetTypeBuffers {
            link_types: self.link_types.as_ref(),
            node_types: self.node_types.as_ref(),
        }
    }
}

/// Writes the subtype code of every registered asset at its position.
#[derive(Debug)]
pub struct AssetTypeEncoder<'a, S: BufferStrategy> {
    index: &'a AssetIndex,
    assets: &'a AssetsMap,
    links: FixedSizeBufferBuilder<U8Codec, S>,
    nodes: FixedSizeBufferBuilder<U8Codec, S>,
}

impl<'a, S: BufferStrategy> AssetTypeEncoder<'a, S> {
    /// Allocates buffers sized to the index's link and node counts.
    pub fn new(index: &'a AssetIndex, assets: &'a AssetsMap) -> Self {
        Self {
            index,
            assets,
            links: FixedSizeBufferBuilder::new(index.link_count()),
            nodes: FixedSizeBufferBuilder::new(index.node_count()),
        }
    }

    fn live_type(&self, id: InternalId) -> Result<AssetType> {
        self.assets
            .get(id)
            .map(|asset| asset.asset_type)
            .ok_or(IndexError::UnknownAsset(id))
    }

    /// Writes the code of a registered node.
    pub fn encode_node(&mut self, id: InternalId) -> Result<()> {
        let position = self
            .index
            .node_position(id)
            .ok_or(IndexError::UnknownAsset(id))?;
        match self.live_type(id)? {
            AssetType::Node(ty) => {
                self.nodes.add_at_index(position, &ty.code());
                Ok(())
            }
            AssetType::Link(_) => Err(IndexError::PartitionMismatch {
                id,
                expected: Partition::Node,
            }),
        }
    }

    /// Writes the code of a registered link.
    pub fn encode_link(&mut self, id: InternalId) -> Result<()> {
        let position = self
            .index
            .link_position(id)
            .ok_or(IndexError::UnknownAsset(id))?;
        match self.live_type(id)? {
            AssetType::Link(ty) => {
                self.links.add_at_index(position, &ty.code());
                Ok(())
            }
            AssetType::Node(_) => Err(IndexError::PartitionMismatch {
                id,
                expected: Partition::Link,
            }),
        }
    }

    /// Encodes every node, then every link, and finalizes.
    pub fn encode(mut self) -> Result<AssetTypeBuffers<S::Buffer>> {
        let index = self.index;
        for id in index.node_ids() {
            self.encode_node(id)?;
        }
        for id in index.link_ids() {
            self.encode_link(id)?;
        }
        debug!(
            links = index.link_count(),
            nodes = index.node_count(),
            strategy = S::NAME,
            "index.asset_type.encoded"
        );
        Ok(self.finalize())
    }

    /// Freezes both buffers as written so far.
    pub fn finalize(self) -> AssetTypeBuffers<S::Buffer> {
        AssetTypeBuffers {
            link_types: self.links.finalize(),
            node_types: self.nodes.finalize(),
        }
    }
}

/// Type lookups over encoded buffers, resolved through an asset index view.
#[derive(Clone)]
pub struct AssetTypeView<B> {
    assets: AssetIndexView<B>,
    links: FixedSizeBufferView<U8Codec, B>,
    nodes: FixedSizeBufferView<U8Codec, B>,
}

impl<B: AsRef<[u8]>> AssetTypeView<B> {
    /// Pairs the type buffers with the asset index they were encoded against.
    pub fn new(assets: AssetIndexView<B>, buffers: AssetTypeBuffers<B>) -> Self {
        Self {
            assets,
            links: FixedSizeBufferView::new(buffers.link_types),
            nodes: FixedSizeBufferView::new(buffers.node_types),
        }
    }

    /// Underlying asset index view.
    pub fn asset_index(&self) -> &AssetIndexView<B> {
        &self.assets
    }
}

impl<B: AsRef<[u8]>> AssetTypeQueries for AssetTypeView<B> {
    fn link_type(&self, id: impl Into<i64>) -> Option<LinkType> {
        let position = self.assets.link_index(id)?;
        LinkType::from_code(self.links.get(position)?)
    }

    fn node_type(&self, id: impl Into<i64>) -> Option<NodeType> {
        let position = self.assets.node_index(id)?;
        NodeType::from_code(self.nodes.get(position)?)
    }
}

impl<B: AsRef<[u8]>> fmt::Debug for AssetTypeView<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetTypeView")
            .field("links", &self.links.count())
            .field("nodes", &self.nodes.count())
            .finish()
    }
}
