#![forbid(unsafe_code)]
//! Identifiers, asset classifications, and the crate-wide error type.

use std::fmt;
use std::str::FromStr;

/// Positive integer identity of an asset. Zero is reserved as the empty sentinel.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct InternalId(pub u32);

impl InternalId {
    /// The reserved "no asset" value.
    pub const EMPTY: InternalId = InternalId(0);

    /// Returns true for the reserved sentinel.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the id as a slot offset into id-indexed buffers.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Converts a raw query id into an `InternalId`, rejecting zero and anything
    /// outside the `u32` range.
    pub fn from_raw(raw: i64) -> Option<Self> {
        if raw <= 0 || raw > u32::MAX as i64 {
            return None;
        }
        Some(InternalId(raw as u32))
    }
}

impl fmt::Display for InternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for InternalId {
    fn from(value: u32) -> Self {
        InternalId(value)
    }
}

impl From<InternalId> for u32 {
    fn from(value: InternalId) -> Self {
        value.0
    }
}

impl From<InternalId> for i64 {
    fn from(value: InternalId) -> Self {
        value.0 as i64
    }
}

/// String form of an [`InternalId`], used as the key of the live topology.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct AssetId(String);

impl AssetId {
    /// Wraps an arbitrary key.
    pub fn new(value: impl Into<String>) -> Self {
        AssetId(value.into())
    }

    /// Borrows the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the key back into its numeric identity.
    pub fn internal_id(&self) -> Result<InternalId> {
        match self.0.parse::<u32>() {
            Ok(0) => Err(IndexError::ReservedId),
            Ok(raw) => Ok(InternalId(raw)),
            Err(_) => Err(IndexError::InvalidAssetId(self.0.clone())),
        }
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<InternalId> for AssetId {
    fn from(value: InternalId) -> Self {
        AssetId(value.0.to_string())
    }
}

impl From<&str> for AssetId {
    fn from(value: &str) -> Self {
        AssetId(value.to_string())
    }
}

impl From<String> for AssetId {
    fn from(value: String) -> Self {
        AssetId(value)
    }
}

/// The two disjoint classes an asset belongs to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Partition {
    /// Edges of the network: pipes, valves, pumps.
    Link,
    /// Vertices of the network: junctions, tanks, reservoirs.
    Node,
}

impl Partition {
    /// High-bit tag stored in the asset index slot.
    pub const fn tag(self) -> u32 {
        match self {
            Partition::Link => 0,
            Partition::Node => 1,
        }
    }

    /// Inverse of [`Partition::tag`].
    pub const fn from_tag(tag: u32) -> Self {
        if tag == 0 {
            Partition::Link
        } else {
            Partition::Node
        }
    }

    /// Lowercase name used in logs and reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Partition::Link => "link",
            Partition::Node => "node",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete node subtype.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeType {
    /// Demand/connection point.
    Junction = 1,
    /// Storage with a variable level.
    Tank = 2,
    /// Fixed-head source.
    Reservoir = 3,
}

impl NodeType {
    /// Type code written into the node type buffer.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a node type code; 0 and unknown codes yield `None`.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(NodeType::Junction),
            2 => Some(NodeType::Tank),
            3 => Some(NodeType::Reservoir),
            _ => None,
        }
    }

    /// Returns true for tanks and reservoirs.
    pub const fn is_source(self) -> bool {
        matches!(self, NodeType::Tank | NodeType::Reservoir)
    }
}

/// Concrete link subtype.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LinkType {
    /// Plain conduit.
    Pipe = 1,
    /// Flow/pressure control element.
    Valve = 2,
    /// Head-adding element.
    Pump = 3,
}

impl LinkType {
    /// Type code written into the link type buffer.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a link type code; 0 and unknown codes yield `None`.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(LinkType::Pipe),
            2 => Some(LinkType::Valve),
            3 => Some(LinkType::Pump),
            _ => None,
        }
    }
}

/// Concrete subtype of any asset, carrying its partition.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AssetType {
    /// A node subtype.
    Node(NodeType),
    /// A link subtype.
    Link(LinkType),
}

impl AssetType {
    /// Partition implied by the subtype.
    pub const fn partition(self) -> Partition {
        match self {
            AssetType::Node(_) => Partition::Node,
            AssetType::Link(_) => Partition::Link,
        }
    }

    /// Lowercase subtype name.
    pub const fn as_str(self) -> &'static str {
        match self {
            AssetType::Node(NodeType::Junction) => "junction",
            AssetType::Node(NodeType::Tank) => "tank",
            AssetType::Node(NodeType::Reservoir) => "reservoir",
            AssetType::Link(LinkType::Pipe) => "pipe",
            AssetType::Link(LinkType::Valve) => "valve",
            AssetType::Link(LinkType::Pump) => "pump",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "junction" => Ok(AssetType::Node(NodeType::Junction)),
            "tank" => Ok(AssetType::Node(NodeType::Tank)),
            "reservoir" => Ok(AssetType::Node(NodeType::Reservoir)),
            "pipe" => Ok(AssetType::Link(LinkType::Pipe)),
            "valve" => Ok(AssetType::Link(LinkType::Valve)),
            "pump" => Ok(AssetType::Link(LinkType::Pump)),
            _ => Err(IndexError::UnknownAssetType(s.to_string())),
        }
    }
}

impl From<NodeType> for AssetType {
    fn from(value: NodeType) -> Self {
        AssetType::Node(value)
    }
}

impl From<LinkType> for AssetType {
    fn from(value: LinkType) -> Self {
        AssetType::Link(value)
    }
}

/// Errors raised while building or querying the index layer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Id 0 is the empty sentinel and cannot be registered.
    #[error("asset id 0 is reserved")]
    ReservedId,
    /// Id registered twice.
    #[error("asset {0} is already registered")]
    DuplicateAsset(InternalId),
    /// Id missing from the asset index or the live model.
    #[error("asset {0} is not registered")]
    UnknownAsset(InternalId),
    /// Id registered under the other partition.
    #[error("asset {id} is not a {expected}")]
    PartitionMismatch {
        /// Offending id.
        id: InternalId,
        /// Partition the caller required.
        expected: Partition,
    },
    /// Topology query for an id the view does not hold.
    #[error("{partition} {id} not found")]
    NotFound {
        /// Partition that was queried.
        partition: Partition,
        /// Raw id as supplied by the caller.
        id: i64,
    },
    /// Link key already present in the live topology.
    #[error("link {0} already present in topology")]
    DuplicateLink(AssetId),
    /// Topology key that does not parse as a nonzero `u32`.
    #[error("invalid asset id: {0:?}")]
    InvalidAssetId(String),
    /// Unrecognized subtype name.
    #[error("unknown asset type: {0:?}")]
    UnknownAssetType(String),
    /// Partition grew past the packable position range.
    #[error("position {0} exceeds the packable range")]
    PositionOverflow(usize),
    /// Sequential encoder called out of position order.
    #[error("asset {id} encoded out of order (expected position {expected}, got {actual})")]
    OutOfOrder {
        /// Id passed to the encoder.
        id: InternalId,
        /// Next position the encoder can append.
        expected: usize,
        /// Position of `id`.
        actual: usize,
    },
    /// Encoded bytes do not decode.
    #[error("corruption: {0}")]
    Corruption(&'static str),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, IndexError>;
