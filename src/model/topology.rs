//! Live adjacency graph of the network.
//!
//! Links are directed edges between two nodes, keyed by [`AssetId`]. Parallel
//! links between the same pair of nodes are allowed. The edge container is a
//! pluggable [`EdgeStore`]; [`AdjacencyList`] is the default implementation.

use std::fmt;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::types::{AssetId, IndexError, Result};

/// A link and its two endpoints.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Edge {
    /// Link key.
    pub link: AssetId,
    /// Upstream node key.
    pub start: AssetId,
    /// Downstream node key.
    pub end: AssetId,
}

/// Minimal multigraph capability the topology is built on.
pub trait EdgeStore: Default {
    /// Stable handle to a stored edge.
    type Handle: Copy + Eq;

    /// Registers a node with no incident edges. No-op if already present.
    fn add_node(&mut self, node: &AssetId);

    /// Inserts an edge and returns its handle.
    fn add_edge(&mut self, edge: Edge) -> Self::Handle;

    /// Removes an edge, leaving its endpoints in place.
    fn remove_edge(&mut self, handle: Self::Handle) -> Option<Edge>;

    /// Removes a node and every incident edge, returning the removed edges.
    fn remove_node(&mut self, node: &AssetId) -> Vec<Edge>;

    /// Handles of the edges incident to `node`, in insertion order.
    fn edges_of(&self, node: &AssetId) -> Vec<Self::Handle>;

    /// Resolves a handle.
    fn edge(&self, handle: Self::Handle) -> Option<&Edge>;

    /// Returns true if the node is known.
    fn has_node(&self, node: &AssetId) -> bool;
}

/// Slot index into [`AdjacencyList`]'s edge table.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct EdgeHandle(usize);

/// Edge table plus per-node incident handle lists.
#[derive(Debug, Default)]
pub struct AdjacencyList {
    edges: Vec<Option<Edge>>,
    free: Vec<usize>,
    incident: FxHashMap<AssetId, SmallVec<[EdgeHandle; 4]>>,
}

impl AdjacencyList {
    fn detach(&mut self, node: &AssetId, handle: EdgeHandle) {
        if let Some(list) = self.incident.get_mut(node) {
            list.retain(|h| *h != handle);
        }
    }
}

impl EdgeStore for AdjacencyList {
    type Handle = EdgeHandle;

    fn add_node(&mut self, node: &AssetId) {
        self.incident.entry(node.clone()).or_default();
    }

    fn add_edge(&mut self, edge: Edge) -> EdgeHandle {
        let handle = match self.free.pop() {
            Some(slot) => EdgeHandle(slot),
            None => {
                self.edges.push(None);
                EdgeHandle(self.edges.len() - 1)
            }
        };
        self.incident
            .entry(edge.start.clone())
            .or_default()
            .push(handle);
        // a self-loop is listed once
        if edge.end != edge.start {
            self.incident.entry(edge.end.clone()).or_default().push(handle);
        }
        self.edges[handle.0] = Some(edge);
        handle
    }

    fn remove_edge(&mut self, handle: EdgeHandle) -> Option<Edge> {
        let edge = self.edges.get_mut(handle.0)?.take()?;
        self.free.push(handle.0);
        self.detach(&edge.start, handle);
        self.detach(&edge.end, handle);
        Some(edge)
    }

    fn remove_node(&mut self, node: &AssetId) -> Vec<Edge> {
        let Some(handles) = self.incident.remove(node) else {
            return Vec::new();
        };
        handles
            .into_iter()
            .filter_map(|h| self.remove_edge(h))
            .collect()
    }

    fn edges_of(&self, node: &AssetId) -> Vec<EdgeHandle> {
        self.incident
            .get(node)
            .map(|list| list.to_vec())
            .unwrap_or_default()
    }

    fn edge(&self, handle: EdgeHandle) -> Option<&Edge> {
        self.edges.get(handle.0)?.as_ref()
    }

    fn has_node(&self, node: &AssetId) -> bool {
        self.incident.contains_key(node)
    }
}

/// Mutable network adjacency, the data source of the topology encoder.
pub struct Topology<G: EdgeStore = AdjacencyList> {
    graph: G,
    links: FxHashMap<AssetId, G::Handle>,
}

impl<G: EdgeStore> fmt::Debug for Topology<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topology")
            .field("links", &self.links.len())
            .finish()
    }
}

impl<G: EdgeStore> Default for Topology<G> {
    fn default() -> Self {
        Self::with_store(G::default())
    }
}

impl Topology {
    /// Creates an empty topology over an [`AdjacencyList`].
    pub fn new() -> Self {
        Self::with_store(AdjacencyList::default())
    }
}

impl<G: EdgeStore> Topology<G> {
    /// Creates an empty topology over a caller-supplied edge store.
    pub fn with_store(graph: G) -> Self {
        Self {
            graph,
            links: FxHashMap::default(),
        }
    }

    /// Registers an isolated node.
    pub fn add_node(&mut self, node: impl Into<AssetId>) {
        self.graph.add_node(&node.into());
    }

    /// Connects `start` to `end` through `link`.
    pub fn add_link(
        &mut self,
        link: impl Into<AssetId>,
        start: impl Into<AssetId>,
        end: impl Into<AssetId>,
    ) -> Result<()> {
        let link = link.into();
        if self.links.contains_key(&link) {
            return Err(IndexError::DuplicateLink(link));
        }
        let handle = self.graph.add_edge(Edge {
            link: link.clone(),
            start: start.into(),
            end: end.into(),
        });
        self.links.insert(link, handle);
        Ok(())
    }

    /// Detaches a link. Returns false if it was unknown.
    pub fn remove_link(&mut self, link: &AssetId) -> bool {
        match self.links.remove(link) {
            Some(handle) => self.graph.remove_edge(handle).is_some(),
            None => false,
        }
    }

    /// Detaches a node and its incident links, returning the removed link keys.
    pub fn remove_node(&mut self, node: &AssetId) -> Vec<AssetId> {
        let removed = self.graph.remove_node(node);
        removed
            .into_iter()
            .map(|edge| {
                self.links.remove(&edge.link);
                edge.link
            })
            .collect()
    }

    /// Keys of the links incident to `node`; empty for unknown or isolated nodes.
    pub fn get_links(&self, node: &AssetId) -> Vec<AssetId> {
        self.graph
            .edges_of(node)
            .into_iter()
            .filter_map(|h| self.graph.edge(h).map(|e| e.link.clone()))
            .collect()
    }

    /// Number of links incident to `node`.
    pub fn degree(&self, node: &AssetId) -> usize {
        self.graph
            .edges_of(node)
            .into_iter()
            .filter(|h| self.graph.edge(*h).is_some())
            .count()
    }

    /// Endpoints of `link` as `(start, end)`.
    pub fn get_nodes(&self, link: &AssetId) -> Option<(&AssetId, &AssetId)> {
        let handle = *self.links.get(link)?;
        self.graph.edge(handle).map(|e| (&e.start, &e.end))
    }

    /// Returns true if the link is present.
    pub fn has_link(&self, link: &AssetId) -> bool {
        self.links.contains_key(link)
    }

    /// Returns true if the node is present.
    pub fn has_node(&self, node: &AssetId) -> bool {
        self.graph.has_node(node)
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}
