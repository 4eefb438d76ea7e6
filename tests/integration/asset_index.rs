#![allow(missing_docs)]

use netindex::index::{AssetIndex, AssetIndexView, AssetTypeEncoder, AssetTypeQueries, AssetTypeView};
use netindex::model::{Asset, AssetsMap};
use netindex::primitives::buffer::{Plain, Shared};
use netindex::types::{AssetType, IndexError, InternalId, LinkType, NodeType, Partition};

#[test]
fn sparse_ids_round_trip() {
    let mut index = AssetIndex::new();
    index.add_link(InternalId(100)).unwrap();
    index.add_node(InternalId(5)).unwrap();
    index.add_link(InternalId(200)).unwrap();

    let view = AssetIndexView::new(index.encoder::<Plain>().encode().unwrap());
    assert_eq!(view.count(), 201);
    assert_eq!(view.link_index(100), Some(0));
    assert_eq!(view.node_index(5), Some(0));
    assert_eq!(view.link_index(200), Some(1));
    for i in 0..5 {
        assert!(!view.has_link(i));
        assert!(!view.has_node(i));
    }
    for i in 101..200 {
        assert_eq!(view.partition_of(i), None);
    }
    assert_eq!(view.partition_of(200), Some(Partition::Link));
    assert_eq!(
        view.ids(Partition::Link).collect::<Vec<_>>(),
        vec![InternalId(100), InternalId(200)]
    );
}

#[test]
fn not_found_cases() {
    let mut index = AssetIndex::new();
    index.add_node(InternalId(3)).unwrap();
    index.add_link(InternalId(7)).unwrap();
    let view = AssetIndexView::new(index.encoder::<Shared>().encode().unwrap());

    assert_eq!(view.node_index(0), None);
    assert_eq!(view.node_index(-1), None);
    assert_eq!(view.link_index(i64::MIN), None);
    assert_eq!(view.node_index(8), None);
    assert_eq!(view.node_index(u32::MAX), None);
    assert_eq!(view.link_index(3), None);
    assert_eq!(view.node_index(7), None);
    assert!(view.has_node(3));
    assert!(view.has_link(7));
}

#[test]
fn zero_id_is_rejected() {
    let mut index = AssetIndex::new();
    assert_eq!(index.add_link(InternalId(0)), Err(IndexError::ReservedId));
    assert_eq!(index.add_node(InternalId::EMPTY), Err(IndexError::ReservedId));
    assert!(index.is_empty());
}

#[test]
fn empty_index() {
    let index = AssetIndex::new();
    assert_eq!(index.link_ids().count(), 0);
    assert_eq!(index.node_ids().count(), 0);
    let view = AssetIndexView::new(index.encoder::<Plain>().encode().unwrap());
    assert_eq!(view.count(), 0);
    assert!(!view.has_node(1));
}

#[test]
fn every_concrete_type_matches_live_answer() {
    let nodes = [
        (1, NodeType::Junction),
        (2, NodeType::Tank),
        (3, NodeType::Reservoir),
    ];
    let links = [(10, LinkType::Pipe), (11, LinkType::Valve), (12, LinkType::Pump)];

    let mut index = AssetIndex::new();
    let mut assets = AssetsMap::new();
    for (id, ty) in nodes {
        index.add_node(InternalId(id)).unwrap();
        assets.insert(Asset::node(InternalId(id), ty));
    }
    for (id, ty) in links {
        index.add_link(InternalId(id)).unwrap();
        assets.insert(Asset::link(InternalId(id), ty));
    }

    let view = AssetTypeView::new(
        AssetIndexView::new(index.encoder::<Plain>().encode().unwrap()),
        AssetTypeEncoder::<Plain>::new(&index, &assets).encode().unwrap(),
    );

    for (id, ty) in nodes {
        assert_eq!(view.node_type(id), Some(ty));
        assert_eq!(view.asset_type(id), Some(AssetType::Node(ty)));
        assert_eq!(view.asset_type(id), assets.asset_type(id));
    }
    for (id, ty) in links {
        assert_eq!(view.link_type(id), Some(ty));
        assert_eq!(view.asset_type(id), Some(AssetType::Link(ty)));
        assert_eq!(view.asset_type(id), assets.asset_type(id));
    }
    for id in [0i64, -4, 4, 9, 13, 10_000] {
        assert_eq!(view.asset_type(id), None);
        assert_eq!(assets.asset_type(id), None);
    }
}
