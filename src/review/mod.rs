#![forbid(unsafe_code)]
//! Read-only network checks that run entirely off a [`NetworkSnapshot`].
//!
//! Nothing here touches the live model, so a shared-backed snapshot can be
//! reviewed on a worker thread while the network keeps changing.

use std::collections::VecDeque;
use std::thread::{self, JoinHandle};

use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::debug;

use crate::index::{AssetTypeQueries, NetworkSnapshot, TopologyView};
use crate::types::{IndexError, InternalId, NodeType, Partition, Result};

/// Summary of one review pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReviewReport {
    /// Links in the snapshot.
    pub links: usize,
    /// Nodes in the snapshot.
    pub nodes: usize,
    /// Tanks and reservoirs.
    pub sources: usize,
    /// Nodes with no incident link, ascending.
    pub orphan_nodes: Vec<u32>,
    /// Nodes no source can reach, ascending.
    pub unsupplied_nodes: Vec<u32>,
}

/// Registered nodes with no incident link, in ascending id order.
pub fn orphan_nodes<B: AsRef<[u8]>>(snapshot: &NetworkSnapshot<B>) -> Result<Vec<InternalId>> {
    let topology = snapshot.topology_view();
    let mut orphans = Vec::new();
    for id in topology.asset_index().ids(Partition::Node) {
        if topology.get_links(id)?.is_empty() {
            orphans.push(id);
        }
    }
    Ok(orphans)
}

fn trace_from<B: AsRef<[u8]>>(
    topology: &TopologyView<B>,
    starts: impl IntoIterator<Item = InternalId>,
) -> Result<FxHashSet<InternalId>> {
    let mut seen = FxHashSet::default();
    let mut queue = VecDeque::new();
    for start in starts {
        if seen.insert(start) {
            queue.push_back(start);
        }
    }
    while let Some(node) = queue.pop_front() {
        for link in topology.get_links(node)? {
            for next in topology.get_nodes(link)? {
                // dangling endpoints only exist when validation was disabled
                if topology.asset_index().has_node(next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }
    Ok(seen)
}

/// Every node reachable from `start` through links, including `start`, in
/// ascending id order.
pub fn connected_nodes<B: AsRef<[u8]>>(
    topology: &TopologyView<B>,
    start: impl Into<i64>,
) -> Result<Vec<InternalId>> {
    let raw = start.into();
    let start = InternalId::from_raw(raw)
        .filter(|id| topology.asset_index().has_node(*id))
        .ok_or(IndexError::NotFound {
            partition: Partition::Node,
            id: raw,
        })?;
    let mut reached: Vec<InternalId> = trace_from(topology, [start])?.into_iter().collect();
    reached.sort_unstable();
    Ok(reached)
}

/// Nodes not reachable from any tank or reservoir, in ascending id order.
pub fn unsupplied_nodes<B: AsRef<[u8]>>(
    snapshot: &NetworkSnapshot<B>,
) -> Result<Vec<InternalId>> {
    let types = snapshot.asset_type_view();
    let topology = snapshot.topology_view();
    let nodes = snapshot.asset_index_view();
    let sources = nodes
        .ids(Partition::Node)
        .filter(|id| types.node_type(*id).is_some_and(NodeType::is_source));
    let supplied = trace_from(&topology, sources)?;
    Ok(nodes
        .ids(Partition::Node)
        .filter(|id| !supplied.contains(id))
        .collect())
}

/// Runs every check.
pub fn review<B: AsRef<[u8]>>(snapshot: &NetworkSnapshot<B>) -> Result<ReviewReport> {
    let types = snapshot.asset_type_view();
    let sources = snapshot
        .asset_index_view()
        .ids(Partition::Node)
        .filter(|id| types.node_type(*id).is_some_and(NodeType::is_source))
        .count();
    let report = ReviewReport {
        links: snapshot.link_count(),
        nodes: snapshot.node_count(),
        sources,
        orphan_nodes: orphan_nodes(snapshot)?.into_iter().map(u32::from).collect(),
        unsupplied_nodes: unsupplied_nodes(snapshot)?
            .into_iter()
            .map(u32::from)
            .collect(),
    };
    debug!(
        links = report.links,
        nodes = report.nodes,
        orphans = report.orphan_nodes.len(),
        unsupplied = report.unsupplied_nodes.len(),
        "review.done"
    );
    Ok(report)
}

/// Moves a snapshot to a new thread and reviews it there.
///
/// Shared-backed snapshots are cheap to clone, so callers usually keep one
/// copy and hand another to the worker.
pub fn spawn_review<B>(snapshot: NetworkSnapshot<B>) -> JoinHandle<Result<ReviewReport>>
where
    B: AsRef<[u8]> + Send + 'static,
{
    thread::spawn(move || review(&snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SnapshotOptions;
    use crate::model::Network;
    use crate::primitives::buffer::{Plain, Shared};
    use crate::types::LinkType;

    /// reservoir 1 -- 2 -- 3   4 -- 5   6
    fn network() -> Network {
        let mut net = Network::new();
        net.add_node(InternalId(1), NodeType::Reservoir).unwrap();
        for id in 2..=6 {
            net.add_node(InternalId(id), NodeType::Junction).unwrap();
        }
        for (link, a, b) in [(100, 1, 2), (101, 2, 3), (102, 4, 5)] {
            net.add_link(InternalId(link), LinkType::Pipe, InternalId(a), InternalId(b))
                .unwrap();
        }
        net
    }

    #[test]
    fn finds_orphans() {
        let snapshot = network().snapshot::<Plain>(&SnapshotOptions::default()).unwrap();
        assert_eq!(orphan_nodes(&snapshot).unwrap(), vec![InternalId(6)]);
    }

    #[test]
    fn traces_connected_component() {
        let snapshot = network().snapshot::<Plain>(&SnapshotOptions::default()).unwrap();
        let topology = snapshot.topology_view();
        assert_eq!(
            connected_nodes(&topology, 3).unwrap(),
            vec![InternalId(1), InternalId(2), InternalId(3)]
        );
        assert_eq!(connected_nodes(&topology, 6).unwrap(), vec![InternalId(6)]);
        assert_eq!(
            connected_nodes(&topology, 100),
            Err(IndexError::NotFound {
                partition: Partition::Node,
                id: 100
            })
        );
        assert!(connected_nodes(&topology, 0).is_err());
    }

    #[test]
    fn unsupplied_nodes_are_outside_source_components() {
        let snapshot = network().snapshot::<Plain>(&SnapshotOptions::default()).unwrap();
        assert_eq!(
            unsupplied_nodes(&snapshot).unwrap(),
            vec![InternalId(4), InternalId(5), InternalId(6)]
        );
    }

    #[test]
    fn worker_review_matches_inline_review() {
        let snapshot = network().snapshot::<Shared>(&SnapshotOptions::default()).unwrap();
        let inline = review(&snapshot).unwrap();
        let remote = spawn_review(snapshot.clone()).join().unwrap().unwrap();
        assert_eq!(inline, remote);
        assert_eq!(
            remote,
            ReviewReport {
                links: 3,
                nodes: 6,
                sources: 1,
                orphan_nodes: vec![6],
                unsupplied_nodes: vec![4, 5, 6],
            }
        );
    }

    #[test]
    fn empty_network_reviews_clean() {
        let snapshot = Network::new()
            .snapshot::<Plain>(&SnapshotOptions::default())
            .unwrap();
        assert_eq!(review(&snapshot).unwrap(), ReviewReport::default());
    }
}
