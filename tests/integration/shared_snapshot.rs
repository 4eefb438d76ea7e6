#![allow(missing_docs)]

use std::sync::atomic::Ordering;
use std::sync::{mpsc, Arc, Once};
use std::thread;

use netindex::index::{AssetTypeQueries, CounterMetrics, NetworkSnapshot, SnapshotOptions};
use netindex::model::Network;
use netindex::primitives::buffer::Shared;
use netindex::review::{spawn_review, ReviewReport};
use netindex::types::{AssetType, InternalId, LinkType, NodeType};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("netindex=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .try_init();
    });
}

/// Tank 1 feeds a chain of junctions 2..=n through pipes 1001...
fn chain(n: u32) -> Network {
    let mut net = Network::new();
    net.add_node(InternalId(1), NodeType::Tank).unwrap();
    for id in 2..=n {
        net.add_node(InternalId(id), NodeType::Junction).unwrap();
        net.add_link(
            InternalId(1_000 + id),
            LinkType::Pipe,
            InternalId(id - 1),
            InternalId(id),
        )
        .unwrap();
    }
    net
}

#[test]
fn worker_reads_while_main_thread_edits() {
    init_tracing();
    let mut net = chain(50);
    let snapshot: NetworkSnapshot<bytes::Bytes> =
        net.snapshot::<Shared>(&SnapshotOptions::default()).unwrap();
    let local = snapshot.clone();

    let (tx, rx) = mpsc::channel();
    let worker = thread::spawn(move || {
        rx.recv().unwrap();
        let topology = snapshot.topology_view();
        let types = snapshot.asset_type_view();
        let links = topology.get_links(25).unwrap();
        (links, types.asset_type(1), topology.get_nodes(1_050).unwrap())
    });

    net.remove_node(InternalId(25)).unwrap();
    net.add_node(InternalId(500), NodeType::Reservoir).unwrap();
    tx.send(()).unwrap();

    let (links, ty, ends) = worker.join().unwrap();
    assert_eq!(links, vec![InternalId(1_025), InternalId(1_026)]);
    assert_eq!(ty, Some(AssetType::Node(NodeType::Tank)));
    assert_eq!(ends, [InternalId(49), InternalId(50)]);

    // the main thread's copy still reflects the state at snapshot time
    assert_eq!(local.topology_view().get_links(25).unwrap().len(), 2);
    assert!(net.assets().get(InternalId(25)).is_none());
}

#[test]
fn spawned_review_sees_snapshot_state() {
    init_tracing();
    let metrics = Arc::new(CounterMetrics::default());
    let opts = SnapshotOptions::default().metrics(metrics.clone());

    let mut net = chain(6);
    net.add_node(InternalId(9), NodeType::Junction).unwrap();
    let snapshot = net.snapshot::<Shared>(&opts).unwrap();
    let handle = spawn_review(snapshot);

    net.remove_node(InternalId(9)).unwrap();
    let report = handle.join().unwrap().unwrap();
    assert_eq!(
        report,
        ReviewReport {
            links: 5,
            nodes: 7,
            sources: 1,
            orphan_nodes: vec![9],
            unsupplied_nodes: vec![9],
        }
    );
    assert_eq!(metrics.snapshots.load(Ordering::Relaxed), 1);
    assert_eq!(metrics.links_encoded.load(Ordering::Relaxed), 5);
}
