// src/graph.rs
//! The input graph and the query surface the layout core consumes from it
//! (spec §3 "Graph (input)", §6 "Graph query surface (consumed)").
//!
//! The ingestion container's full design — parsing, mutation after layout,
//! persistence — is out of scope (spec §1). What's specified, and what this
//! module provides, is the narrow read-only surface the core actually calls:
//! [`GraphQuery`]. [`Graph`] is the one concrete implementation this crate
//! ships, grounded in the teacher's `IntermediateGraph` (a thin wrapper over
//! `petgraph::DiGraph`), so the core has something real to run against and
//! the test suite has something real to build.

use crate::error::{LayoutCoreError, Result};
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use std::collections::HashMap;

/// Default cap on node count (spec §6).
pub const DEFAULT_MAX_NODES: usize = 100_000;
/// Default cap on edge count (spec §6).
pub const DEFAULT_MAX_EDGES: usize = 500_000;

/// The kind of a node as seen by the graph adapter. `Implicit` is reserved
/// per spec §9's Open Questions ("no observed producer in the source") —
/// nothing in this crate constructs it, but the variant exists so the IR's
/// `NodeKind` (see `ir.rs`) has a source-side counterpart to copy from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Explicit,
    Implicit,
}

#[derive(Debug, Clone)]
struct NodeRecord {
    id: u64,
    label: String,
    width: u32,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
struct EdgeRecord {
    directed: bool,
    label: Option<String>,
}

/// A single node's data, as exposed by [`GraphQuery::node_at`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub id: u64,
    pub label: &'a str,
    pub width: u32,
    pub kind: NodeKind,
}

/// The read-only surface the layout core consumes from an input graph
/// (spec §6). Node positions are indices into the query's own node order
/// (`0..node_count()`), stable for the lifetime of a `layout()` call.
pub trait GraphQuery {
    fn node_count(&self) -> usize;
    fn node_at(&self, idx: usize) -> Option<NodeRef<'_>>;
    fn node_index(&self, id: u64) -> Option<usize>;
    fn children(&self, idx: usize) -> &[usize];
    fn parents(&self, idx: usize) -> &[usize];
    fn edges(&self) -> &[EdgeRecordPublic];
    fn max_nodes(&self) -> usize;
    fn max_edges(&self) -> usize;
}

/// Public projection of an edge, stored in insertion order and indexable by
/// `edge_idx` (the position spec.md's virtual-level/dummy bookkeeping keys
/// on).
#[derive(Debug, Clone)]
pub struct EdgeRecordPublic {
    pub source_id: u64,
    pub target_id: u64,
    pub source_idx: usize,
    pub target_idx: usize,
    pub directed: bool,
    pub label: Option<String>,
}

/// The concrete graph container this crate ships: an ordered set of nodes
/// and directed/undirected edges, backed by `petgraph::DiGraph` the same way
/// the teacher's `IntermediateGraph` wraps one. Duplicate ids and duplicate
/// (source, target) edges are rejected at insertion time (spec §3); caps on
/// node/edge counts are checked before insertion, never relying on allocator
/// failure to enforce them (spec §9).
pub struct Graph {
    inner: DiGraph<NodeRecord, EdgeRecord>,
    id_to_index: HashMap<u64, PetNodeIndex>,
    order: Vec<PetNodeIndex>,
    index_of: HashMap<PetNodeIndex, usize>,
    adjacency_children: Vec<Vec<usize>>,
    adjacency_parents: Vec<Vec<usize>>,
    edges: Vec<EdgeRecordPublic>,
    seen_edges: std::collections::HashSet<(u64, u64)>,
    max_nodes: usize,
    max_edges: usize,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::with_caps(DEFAULT_MAX_NODES, DEFAULT_MAX_EDGES)
    }

    pub fn with_caps(max_nodes: usize, max_edges: usize) -> Self {
        Graph {
            inner: DiGraph::new(),
            id_to_index: HashMap::new(),
            order: Vec::new(),
            index_of: HashMap::new(),
            adjacency_children: Vec::new(),
            adjacency_parents: Vec::new(),
            edges: Vec::new(),
            seen_edges: std::collections::HashSet::new(),
            max_nodes,
            max_edges,
        }
    }

    /// Add a node, rejecting a duplicate id (`E.Graph.Node.007`) or a
    /// breach of `max_nodes` (`E.Graph.Node.026`).
    pub fn add_node(&mut self, id: u64, label: impl Into<String>, width: u32) -> Result<usize> {
        if self.id_to_index.contains_key(&id) {
            return Err(LayoutCoreError::DuplicateNode(id));
        }
        if self.order.len() >= self.max_nodes {
            return Err(LayoutCoreError::NodeCapExceeded {
                cap: self.max_nodes,
            });
        }
        let record = NodeRecord {
            id,
            label: label.into(),
            width,
            kind: NodeKind::Explicit,
        };
        let pet_idx = self.inner.add_node(record);
        let idx = self.order.len();
        self.order.push(pet_idx);
        self.index_of.insert(pet_idx, idx);
        self.id_to_index.insert(id, pet_idx);
        self.adjacency_children.push(Vec::new());
        self.adjacency_parents.push(Vec::new());
        Ok(idx)
    }

    /// Add an edge by node id, rejecting an unknown endpoint
    /// (`E.Graph.Node.021`), a duplicate (source, target) pair
    /// (`E.Graph.Edge.007`), or a breach of `max_edges` (`E.Graph.Edge.026`).
    pub fn add_edge(
        &mut self,
        source_id: u64,
        target_id: u64,
        directed: bool,
        label: Option<String>,
    ) -> Result<usize> {
        let source_pet = *self
            .id_to_index
            .get(&source_id)
            .ok_or(LayoutCoreError::NodeNotFound(source_id))?;
        let target_pet = *self
            .id_to_index
            .get(&target_id)
            .ok_or(LayoutCoreError::NodeNotFound(target_id))?;
        if self.seen_edges.contains(&(source_id, target_id)) {
            return Err(LayoutCoreError::DuplicateEdge {
                source_id,
                target_id,
            });
        }
        if self.edges.len() >= self.max_edges {
            return Err(LayoutCoreError::EdgeCapExceeded {
                cap: self.max_edges,
            });
        }
        self.inner.add_edge(
            source_pet,
            target_pet,
            EdgeRecord {
                directed,
                label: label.clone(),
            },
        );
        self.seen_edges.insert((source_id, target_id));
        let source_idx = self.index_of[&source_pet];
        let target_idx = self.index_of[&target_pet];
        self.adjacency_children[source_idx].push(target_idx);
        self.adjacency_parents[target_idx].push(source_idx);
        let edge_idx = self.edges.len();
        self.edges.push(EdgeRecordPublic {
            source_id,
            target_id,
            source_idx,
            target_idx,
            directed,
            label,
        });
        Ok(edge_idx)
    }

    /// Returns the number of weakly-connected components, used by
    /// `Graph::validate` for the `disconnected` precondition (spec §4.1,
    /// §7).
    pub fn connected_components(&self) -> usize {
        let n = self.order.len();
        if n == 0 {
            return 0;
        }
        let mut visited = vec![false; n];
        let mut components = 0;
        let mut stack = Vec::new();
        for start in 0..n {
            if visited[start] {
                continue;
            }
            components += 1;
            stack.push(start);
            visited[start] = true;
            while let Some(node) = stack.pop() {
                for &next in self.adjacency_children[node]
                    .iter()
                    .chain(self.adjacency_parents[node].iter())
                {
                    if !visited[next] {
                        visited[next] = true;
                        stack.push(next);
                    }
                }
            }
        }
        components
    }

    /// Returns `true` if every edge is marked `directed`.
    pub fn all_directed(&self) -> bool {
        self.edges.iter().all(|e| e.directed)
    }

    /// Returns `true` if at least one edge is marked undirected.
    pub fn has_undirected_edges(&self) -> bool {
        self.edges.iter().any(|e| !e.directed)
    }

}

impl GraphQuery for Graph {
    fn node_count(&self) -> usize {
        self.order.len()
    }

    fn node_at(&self, idx: usize) -> Option<NodeRef<'_>> {
        let pet_idx = *self.order.get(idx)?;
        let record = &self.inner[pet_idx];
        Some(NodeRef {
            id: record.id,
            label: &record.label,
            width: record.width,
            kind: record.kind,
        })
    }

    fn node_index(&self, id: u64) -> Option<usize> {
        self.id_to_index.get(&id).map(|pet| self.index_of[pet])
    }

    fn children(&self, idx: usize) -> &[usize] {
        self.adjacency_children
            .get(idx)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    fn parents(&self, idx: usize) -> &[usize] {
        self.adjacency_parents
            .get(idx)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    fn edges(&self) -> &[EdgeRecordPublic] {
        &self.edges
    }

    fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    fn max_edges(&self) -> usize {
        self.max_edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph {
        let mut g = Graph::new();
        g.add_node(1, "A", 10).unwrap();
        g.add_node(2, "B", 10).unwrap();
        g.add_node(3, "C", 10).unwrap();
        g.add_edge(1, 2, true, None).unwrap();
        g.add_edge(2, 3, true, None).unwrap();
        g
    }

    #[test]
    fn children_and_parents_are_consistent() {
        let g = triangle();
        assert_eq!(g.children(0), &[1]);
        assert_eq!(g.parents(1), &[0]);
        assert_eq!(g.children(2), &[] as &[usize]);
    }

    #[test]
    fn rejects_duplicate_node_id() {
        let mut g = Graph::new();
        g.add_node(1, "A", 10).unwrap();
        let err = g.add_node(1, "A2", 10).unwrap_err();
        assert_eq!(err.code(), "E.Graph.Node.007");
    }

    #[test]
    fn rejects_duplicate_edge() {
        let mut g = triangle();
        let err = g.add_edge(1, 2, true, None).unwrap_err();
        assert_eq!(err.code(), "E.Graph.Edge.007");
    }

    #[test]
    fn rejects_edge_to_unknown_node() {
        let mut g = Graph::new();
        g.add_node(1, "A", 10).unwrap();
        let err = g.add_edge(1, 99, true, None).unwrap_err();
        assert_eq!(err.code(), "E.Graph.Node.021");
    }

    #[test]
    fn enforces_node_cap() {
        let mut g = Graph::with_caps(2, DEFAULT_MAX_EDGES);
        g.add_node(1, "A", 10).unwrap();
        g.add_node(2, "B", 10).unwrap();
        let err = g.add_node(3, "C", 10).unwrap_err();
        assert_eq!(err.code(), "E.Graph.Node.026");
    }

    #[test]
    fn connected_components_counts_islands() {
        let mut g = Graph::new();
        g.add_node(1, "A", 10).unwrap();
        g.add_node(2, "B", 10).unwrap();
        g.add_node(3, "C", 10).unwrap();
        g.add_edge(1, 2, true, None).unwrap();
        assert_eq!(g.connected_components(), 2);
    }
}
