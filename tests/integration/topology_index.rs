#![allow(missing_docs)]

use netindex::index::{AssetIndex, AssetIndexView, SnapshotOptions, TopologyEncoder, TopologyView};
use netindex::model::{Network, Topology};
use netindex::primitives::buffer::{Plain, Shared};
use netindex::types::{IndexError, InternalId, LinkType, NodeType, Partition};

fn view_of(index: &AssetIndex, topology: &Topology) -> TopologyView<Box<[u8]>> {
    TopologyView::new(
        AssetIndexView::new(index.encoder::<Plain>().encode().unwrap()),
        TopologyEncoder::<Plain, _>::new(index, topology)
            .encode()
            .unwrap(),
    )
}

#[test]
fn one_link_two_nodes() {
    let mut net = Network::new();
    net.add_node(InternalId(10), NodeType::Junction).unwrap();
    net.add_node(InternalId(20), NodeType::Junction).unwrap();
    net.add_link(InternalId(1), LinkType::Pipe, InternalId(10), InternalId(20))
        .unwrap();

    let snapshot = net.snapshot::<Plain>(&SnapshotOptions::default()).unwrap();
    let view = snapshot.topology_view();
    assert_eq!(view.get_nodes(1).unwrap(), [InternalId(10), InternalId(20)]);
    assert_eq!(view.get_links(10).unwrap(), vec![InternalId(1)]);
    assert_eq!(view.get_links(20).unwrap(), vec![InternalId(1)]);
}

#[test]
fn central_node_with_four_links() {
    let central = InternalId(42);
    let mut net = Network::new();
    net.add_node(central, NodeType::Tank).unwrap();
    for (link, other) in [(1u32, 101u32), (2, 102), (3, 103), (4, 104)] {
        net.add_node(InternalId(other), NodeType::Junction).unwrap();
        net.add_link(InternalId(link), LinkType::Pipe, central, InternalId(other))
            .unwrap();
    }

    let snapshot = net.snapshot::<Shared>(&SnapshotOptions::default()).unwrap();
    let mut links = snapshot.topology_view().get_links(central).unwrap();
    assert_eq!(links.len(), 4);
    links.sort();
    assert_eq!(
        links,
        vec![InternalId(1), InternalId(2), InternalId(3), InternalId(4)]
    );
}

#[test]
fn incremental_and_one_shot_are_byte_identical() {
    let mut index = AssetIndex::new();
    let mut topology = Topology::new();
    for node in [30u32, 10, 20] {
        index.add_node(InternalId(node)).unwrap();
        topology.add_node(InternalId(node));
    }
    for (link, a, b) in [(7u32, 10u32, 20u32), (5, 20, 30), (6, 30, 10), (8, 10, 20)] {
        index.add_link(InternalId(link)).unwrap();
        topology
            .add_link(InternalId(link), InternalId(a), InternalId(b))
            .unwrap();
    }

    let one_shot = TopologyEncoder::<Plain, _>::new(&index, &topology)
        .encode()
        .unwrap();

    let mut encoder = TopologyEncoder::<Plain, _>::new(&index, &topology);
    for link in [8u32, 6, 5, 7] {
        encoder.encode_link(InternalId(link)).unwrap();
    }
    for node in index.node_ids() {
        encoder.encode_node(node).unwrap();
    }
    assert_eq!(encoder.finalize(), one_shot);

    let view = view_of(&index, &topology);
    assert_eq!(
        view.get_links(10).unwrap(),
        vec![InternalId(7), InternalId(6), InternalId(8)]
    );
}

#[test]
fn unknown_ids_error_instead_of_returning_empty() {
    let mut index = AssetIndex::new();
    index.add_node(InternalId(10)).unwrap();
    let topology = Topology::new();
    let view = view_of(&index, &topology);

    assert!(view.get_links(10).unwrap().is_empty());
    assert_eq!(
        view.get_links(11),
        Err(IndexError::NotFound {
            partition: Partition::Node,
            id: 11
        })
    );
    assert_eq!(
        view.get_nodes(10),
        Err(IndexError::NotFound {
            partition: Partition::Link,
            id: 10
        })
    );
}

#[test]
fn snapshot_is_independent_of_later_edits() {
    let mut net = Network::new();
    net.add_node(InternalId(1), NodeType::Reservoir).unwrap();
    net.add_node(InternalId(2), NodeType::Junction).unwrap();
    net.add_link(InternalId(3), LinkType::Pipe, InternalId(1), InternalId(2))
        .unwrap();
    let before = net.snapshot::<Plain>(&SnapshotOptions::default()).unwrap();

    net.remove_node(InternalId(2)).unwrap();
    let after = net.snapshot::<Plain>(&SnapshotOptions::default()).unwrap();

    assert_eq!(before.topology_view().get_links(1).unwrap(), vec![InternalId(3)]);
    assert!(after.topology_view().get_links(1).unwrap().is_empty());
    assert!(after.topology_view().get_nodes(3).is_err());
}
