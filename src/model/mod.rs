//! The live, mutable network model the index layer encodes from.
//!
//! [`AssetsMap`] holds every asset with its concrete subtype and
//! [`Topology`] holds the link/node adjacency. [`Network`] keeps the two in
//! step and is the usual entry point for building snapshots.

mod topology;

pub use topology::{AdjacencyList, Edge, EdgeHandle, EdgeStore, Topology};

use std::collections::BTreeMap;

use tracing::trace;

use crate::index::{AssetIndex, NetworkSnapshot, SnapshotOptions};
use crate::primitives::buffer::BufferStrategy;
use crate::types::{
    AssetId, AssetType, IndexError, InternalId, LinkType, NodeType, Partition, Result,
};

/// A network asset.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Asset {
    /// Asset identity.
    pub id: InternalId,
    /// Concrete subtype; implies the partition.
    pub asset_type: AssetType,
}

impl Asset {
    /// Creates a node asset.
    pub fn node(id: InternalId, ty: NodeType) -> Self {
        Self {
            id,
            asset_type: AssetType::Node(ty),
        }
    }

    /// Creates a link asset.
    pub fn link(id: InternalId, ty: LinkType) -> Self {
        Self {
            id,
            asset_type: AssetType::Link(ty),
        }
    }

    /// Partition of the asset.
    pub fn partition(&self) -> Partition {
        self.asset_type.partition()
    }
}

/// Id-keyed collection of live assets, iterated in ascending id order.
#[derive(Clone, Debug, Default)]
pub struct AssetsMap {
    assets: BTreeMap<InternalId, Asset>,
}

impl AssetsMap {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an asset, returning the previous one.
    pub fn insert(&mut self, asset: Asset) -> Option<Asset> {
        self.assets.insert(asset.id, asset)
    }

    /// Looks up an asset.
    pub fn get(&self, id: InternalId) -> Option<&Asset> {
        self.assets.get(&id)
    }

    /// Looks up an asset by its string key.
    pub fn get_by_asset_id(&self, id: &AssetId) -> Option<&Asset> {
        id.internal_id().ok().and_then(|id| self.get(id))
    }

    /// Removes an asset.
    pub fn remove(&mut self, id: InternalId) -> Option<Asset> {
        self.assets.remove(&id)
    }

    /// Returns true if the id is present.
    pub fn contains(&self, id: InternalId) -> bool {
        self.assets.contains_key(&id)
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Returns true if there are no assets.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// All assets in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Asset> + '_ {
        self.assets.values()
    }

    /// Assets of one partition in ascending id order.
    pub fn iter_partition(&self, partition: Partition) -> impl Iterator<Item = &Asset> + '_ {
        self.iter().filter(move |a| a.partition() == partition)
    }
}

/// Assets plus adjacency, mutated together.
#[derive(Debug, Default)]
pub struct Network {
    assets: AssetsMap,
    topology: Topology,
}

impl Network {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Live assets.
    pub fn assets(&self) -> &AssetsMap {
        &self.assets
    }

    /// Live adjacency.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    fn check_new(&self, id: InternalId) -> Result<()> {
        if id.is_empty() {
            return Err(IndexError::ReservedId);
        }
        if self.assets.contains(id) {
            return Err(IndexError::DuplicateAsset(id));
        }
        Ok(())
    }

    fn require_node(&self, id: InternalId) -> Result<()> {
        match self.assets.get(id) {
            Some(asset) if asset.partition() == Partition::Node => Ok(()),
            Some(_) => Err(IndexError::PartitionMismatch {
                id,
                expected: Partition::Node,
            }),
            None => Err(IndexError::UnknownAsset(id)),
        }
    }

    /// Adds an isolated node.
    pub fn add_node(&mut self, id: InternalId, ty: NodeType) -> Result<()> {
        self.check_new(id)?;
        self.assets.insert(Asset::node(id, ty));
        self.topology.add_node(id);
        trace!(id = id.0, ty = %AssetType::Node(ty), "network.add_node");
        Ok(())
    }

    /// Adds a link between two existing nodes.
    pub fn add_link(
        &mut self,
        id: InternalId,
        ty: LinkType,
        start: InternalId,
        end: InternalId,
    ) -> Result<()> {
        self.check_new(id)?;
        self.require_node(start)?;
        self.require_node(end)?;
        self.topology.add_link(id, start, end)?;
        self.assets.insert(Asset::link(id, ty));
        trace!(id = id.0, start = start.0, end = end.0, "network.add_link");
        Ok(())
    }

    /// Removes a link, returning it if present.
    pub fn remove_link(&mut self, id: InternalId) -> Option<Asset> {
        match self.assets.get(id) {
            Some(asset) if asset.partition() == Partition::Link => {}
            _ => return None,
        }
        self.topology.remove_link(&AssetId::from(id));
        self.assets.remove(id)
    }

    /// Removes a node together with every link attached to it.
    ///
    /// Returns the ids of the removed links, or `None` if `id` is not a node.
    pub fn remove_node(&mut self, id: InternalId) -> Option<Vec<InternalId>> {
        self.require_node(id).ok()?;
        let removed: Vec<InternalId> = self
            .topology
            .remove_node(&AssetId::from(id))
            .iter()
            .filter_map(|link| link.internal_id().ok())
            .collect();
        for link in &removed {
            self.assets.remove(*link);
        }
        self.assets.remove(id);
        Some(removed)
    }

    /// Registers every asset in ascending id order.
    pub fn asset_index(&self) -> Result<AssetIndex> {
        let mut index = AssetIndex::new();
        for asset in self.assets.iter() {
            match asset.partition() {
                Partition::Link => index.add_link(asset.id)?,
                Partition::Node => index.add_node(asset.id)?,
            };
        }
        Ok(index)
    }

    /// Encodes an immutable snapshot of the current state.
    pub fn snapshot<S: BufferStrategy>(
        &self,
        opts: &SnapshotOptions,
    ) -> Result<NetworkSnapshot<S::Buffer>> {
        let index = self.asset_index()?;
        NetworkSnapshot::build::<S, _>(&index, &self.assets, &self.topology, opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_link_requires_existing_nodes() {
        let mut net = Network::new();
        net.add_node(InternalId(10), NodeType::Junction).unwrap();
        assert_eq!(
            net.add_link(InternalId(1), LinkType::Pipe, InternalId(10), InternalId(20)),
            Err(IndexError::UnknownAsset(InternalId(20)))
        );
        net.add_node(InternalId(20), NodeType::Tank).unwrap();
        net.add_link(InternalId(1), LinkType::Pipe, InternalId(10), InternalId(20))
            .unwrap();
        assert_eq!(
            net.add_link(InternalId(2), LinkType::Pump, InternalId(1), InternalId(20)),
            Err(IndexError::PartitionMismatch {
                id: InternalId(1),
                expected: Partition::Node
            })
        );
        assert_eq!(
            net.add_node(InternalId(1), NodeType::Junction),
            Err(IndexError::DuplicateAsset(InternalId(1)))
        );
        assert_eq!(
            net.add_node(InternalId(0), NodeType::Junction),
            Err(IndexError::ReservedId)
        );
    }

    #[test]
    fn remove_node_cascades_to_links() {
        let mut net = Network::new();
        for id in [10, 20, 30] {
            net.add_node(InternalId(id), NodeType::Junction).unwrap();
        }
        net.add_link(InternalId(1), LinkType::Pipe, InternalId(10), InternalId(20))
            .unwrap();
        net.add_link(InternalId(2), LinkType::Valve, InternalId(20), InternalId(30))
            .unwrap();

        let mut removed = net.remove_node(InternalId(20)).unwrap();
        removed.sort();
        assert_eq!(removed, vec![InternalId(1), InternalId(2)]);
        assert_eq!(net.assets().len(), 2);
        assert_eq!(net.topology().link_count(), 0);
        assert_eq!(net.remove_node(InternalId(20)), None);
    }

    #[test]
    fn remove_link_ignores_nodes() {
        let mut net = Network::new();
        net.add_node(InternalId(10), NodeType::Junction).unwrap();
        net.add_node(InternalId(20), NodeType::Junction).unwrap();
        net.add_link(InternalId(1), LinkType::Pipe, InternalId(10), InternalId(20))
            .unwrap();
        assert_eq!(net.remove_link(InternalId(10)), None);
        assert_eq!(
            net.remove_link(InternalId(1)),
            Some(Asset::link(InternalId(1), LinkType::Pipe))
        );
        assert!(net.topology().get_links(&AssetId::from(InternalId(10))).is_empty());
    }

    #[test]
    fn asset_index_follows_id_order() {
        let mut net = Network::new();
        net.add_node(InternalId(30), NodeType::Reservoir).unwrap();
        net.add_node(InternalId(5), NodeType::Junction).unwrap();
        net.add_link(InternalId(7), LinkType::Pipe, InternalId(30), InternalId(5))
            .unwrap();

        let index = net.asset_index().unwrap();
        assert_eq!(
            index.node_ids().collect::<Vec<_>>(),
            vec![InternalId(5), InternalId(30)]
        );
        assert_eq!(index.link_ids().collect::<Vec<_>>(), vec![InternalId(7)]);
    }
}
