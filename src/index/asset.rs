//! Dense position spaces for sparse asset ids.
//!
//! [`AssetIndex`] assigns every registered id a 0-based *position* inside its
//! partition, in insertion order. All downstream encoders address their
//! records by these positions.
//!
//! The encoded form is one 32-bit slot per id in `0..=max_id`:
//!
//! ```text
//!   31   30                                0
//! +-----+----------------------------------+
//! | tag |           position + 1           |
//! +-----+----------------------------------+
//! ```
//!
//! A zero slot means "no asset". The `+ 1` keeps position 0 distinguishable
//! from the empty slot. The buffer is sized by the largest id, not by the
//! number of assets, so lookups stay O(1) for sparse ids.

use std::fmt;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::primitives::buffer::{
    BufferStrategy, FixedSizeBufferBuilder, FixedSizeBufferView, U32Codec,
};
use crate::types::{IndexError, InternalId, Partition, Result};

/// Slot value of an id with no registered asset.
pub const EMPTY_SLOT: u32 = 0;

const TAG_SHIFT: u32 = 31;
const POSITION_MASK: u32 = (1 << TAG_SHIFT) - 1;

/// Largest position that fits in a slot.
pub const MAX_POSITION: usize = (POSITION_MASK - 1) as usize;

/// Packs a partition and position into a slot word.
pub fn pack_slot(partition: Partition, position: usize) -> Result<u32> {
    if position > MAX_POSITION {
        return Err(IndexError::PositionOverflow(position));
    }
    Ok((partition.tag() << TAG_SHIFT) | (position as u32 + 1))
}

/// Unpacks a slot word; `None` for the empty slot.
pub fn unpack_slot(word: u32) -> Option<(Partition, usize)> {
    let stored = word & POSITION_MASK;
    if stored == 0 {
        return None;
    }
    Some((Partition::from_tag(word >> TAG_SHIFT), (stored - 1) as usize))
}

/// Asset index slots are plain little-endian words.
pub type AssetSlotCodec = U32Codec;

/// Insertion-ordered registry of link and node ids.
#[derive(Clone, Debug, Default)]
pub struct AssetIndex {
    link_ids: Vec<InternalId>,
    node_ids: Vec<InternalId>,
    link_positions: FxHashMap<InternalId, usize>,
    node_positions: FxHashMap<InternalId, usize>,
    max_id: u32,
}

impl AssetIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a link id, returning its position.
    pub fn add_link(&mut self, id: InternalId) -> Result<usize> {
        self.register(Partition::Link, id)
    }

    /// Appends a node id, returning its position.
    pub fn add_node(&mut self, id: InternalId) -> Result<usize> {
        self.register(Partition::Node, id)
    }

    fn register(&mut self, partition: Partition, id: InternalId) -> Result<usize> {
        if id.is_empty() {
            return Err(IndexError::ReservedId);
        }
        if self.partition_of(id).is_some() {
            return Err(IndexError::DuplicateAsset(id));
        }
        let (ids, positions) = match partition {
            Partition::Link => (&mut self.link_ids, &mut self.link_positions),
            Partition::Node => (&mut self.node_ids, &mut self.node_positions),
        };
        let position = ids.len();
        ids.push(id);
        positions.insert(id, position);
        self.max_id = self.max_id.max(id.0);
        Ok(position)
    }

    /// Link ids in insertion order. Each call starts a fresh traversal.
    pub fn link_ids(&self) -> impl Iterator<Item = InternalId> + Clone + '_ {
        self.link_ids.iter().copied()
    }

    /// Node ids in insertion order. Each call starts a fresh traversal.
    pub fn node_ids(&self) -> impl Iterator<Item = InternalId> + Clone + '_ {
        self.node_ids.iter().copied()
    }

    /// Position of a link id.
    pub fn link_position(&self, id: InternalId) -> Option<usize> {
        self.link_positions.get(&id).copied()
    }

    /// Position of a node id.
    pub fn node_position(&self, id: InternalId) -> Option<usize> {
        self.node_positions.get(&id).copied()
    }

    /// Partition the id was registered under.
    pub fn partition_of(&self, id: InternalId) -> Option<Partition> {
        if self.link_positions.contains_key(&id) {
            Some(Partition::Link)
        } else if self.node_positions.contains_key(&id) {
            Some(Partition::Node)
        } else {
            None
        }
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.link_ids.len()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.link_ids.is_empty() && self.node_ids.is_empty()
    }

    /// Largest registered id.
    pub fn max_internal_id(&self) -> Option<InternalId> {
        (!self.is_empty()).then_some(InternalId(self.max_id))
    }

    /// Slots in the encoded buffer: `max_id + 1`, or 0 when empty.
    pub fn slot_count(&self) -> usize {
        self.max_internal_id().map_or(0, |id| id.as_usize() + 1)
    }

    /// Creates an encoder sized to [`Self::slot_count`].
    pub fn encoder<S: BufferStrategy>(&self) -> AssetIndexEncoder<'_, S> {
        AssetIndexEncoder::new(self)
    }
}

/// Writes an [`AssetIndex`] into its slot buffer.
///
/// Slots are keyed by id, so links and nodes may be encoded in any
/// interleaving; one-shot and incremental encoding yield identical bytes.
#[derive(Debug)]
pub struct AssetIndexEncoder<'a, S: BufferStrategy> {
    index: &'a AssetIndex,
    builder: FixedSizeBufferBuilder<AssetSlotCodec, S>,
}

impl<'a, S: BufferStrategy> AssetIndexEncoder<'a, S> {
    /// Allocates the zeroed slot buffer.
    pub fn new(index: &'a AssetIndex) -> Self {
        Self {
            index,
            builder: FixedSizeBufferBuilder::new(index.slot_count()),
        }
    }

    /// Writes the slot of a registered link.
    pub fn encode_link(&mut self, id: InternalId) -> Result<()> {
        let position = self
            .index
            .link_position(id)
            .ok_or(IndexError::UnknownAsset(id))?;
        self.write(Partition::Link, id, position)
    }

    /// Writes the slot of a registered node.
    pub fn encode_node(&mut self, id: InternalId) -> Result<()> {
        let position = self
            .index
            .node_position(id)
            .ok_or(IndexError::UnknownAsset(id))?;
        self.write(Partition::Node, id, position)
    }

    fn write(&mut self, partition: Partition, id: InternalId, position: usize) -> Result<()> {
        let word = pack_slot(partition, position)?;
        self.builder.add_at_index(id.as_usize(), &word);
        Ok(())
    }

    /// Writes the slots of every id yielded by the two iterators.
    pub fn encode_ids<L, N>(&mut self, links: L, nodes: N) -> Result<()>
    where
        L: IntoIterator<Item = InternalId>,
        N: IntoIterator<Item = InternalId>,
    {
        for id in links {
            self.encode_link(id)?;
        }
        for id in nodes {
            self.encode_node(id)?;
        }
        Ok(())
    }

    /// Encodes every registered id and finalizes.
    pub fn encode(mut self) -> Result<S::Buffer> {
        let index = self.index;
        self.encode_ids(index.link_ids(), index.node_ids())?;
        debug!(
            links = index.link_count(),
            nodes = index.node_count(),
            slots = self.builder.capacity(),
            strategy = S::NAME,
            "index.asset.encoded"
        );
        Ok(self.finalize())
    }

    /// Freezes the buffer as written so far.
    pub fn finalize(self) -> S::Buffer {
        self.builder.finalize()
    }
}

/// Read-only id to position lookups over an encoded slot buffer.
#[derive(Clone)]
pub struct AssetIndexView<B> {
    slots: FixedSizeBufferView<AssetSlotCodec, B>,
}

impl<B: AsRef<[u8]>> fmt::Debug for AssetIndexView<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetIndexView")
            .field("count", &self.count())
            .finish()
    }
}

impl<B: AsRef<[u8]>> AssetIndexView<B> {
    /// Wraps an encoded slot buffer.
    pub fn new(buf: B) -> Self {
        Self {
            slots: FixedSizeBufferView::new(buf),
        }
    }

    /// Number of slots (`max_id + 1`, or 0 for an empty index).
    pub fn count(&self) -> usize {
        self.slots.count()
    }

    fn lookup(&self, id: i64) -> Option<(Partition, usize)> {
        if id < 0 || id >= self.count() as i64 {
            return None;
        }
        unpack_slot(self.slots.get(id as usize)?)
    }

    fn position_in(&self, partition: Partition, id: i64) -> Option<usize> {
        match self.lookup(id)? {
            (found, position) if found == partition => Some(position),
            _ => None,
        }
    }

    /// Position of a link id; `None` for unknown ids and for nodes.
    pub fn link_index(&self, id: impl Into<i64>) -> Option<usize> {
        self.position_in(Partition::Link, id.into())
    }

    /// Position of a node id; `None` for unknown ids and for links.
    pub fn node_index(&self, id: impl Into<i64>) -> Option<usize> {
        self.position_in(Partition::Node, id.into())
    }

    /// Returns true if the id is a registered link.
    pub fn has_link(&self, id: impl Into<i64>) -> bool {
        self.link_index(id).is_some()
    }

    /// Returns true if the id is a registered node.
    pub fn has_node(&self, id: impl Into<i64>) -> bool {
        self.node_index(id).is_some()
    }

    /// Partition of a registered id.
    pub fn partition_of(&self, id: impl Into<i64>) -> Option<Partition> {
        self.lookup(id.into()).map(|(partition, _)| partition)
    }

    /// Registered ids of one partition, in ascending id order.
    pub fn ids(&self, partition: Partition) -> impl Iterator<Item = InternalId> + '_ {
        (1..self.count()).filter_map(move |slot| match self.lookup(slot as i64) {
            Some((found, _)) if found == partition => Some(InternalId(slot as u32)),
            _ => None,
        })
    }

    /// Raw slot bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.slots.as_bytes()
    }
}
