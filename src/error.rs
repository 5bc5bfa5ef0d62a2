// src/error.rs
//! Error taxonomy for the layout core (spec §7). Hierarchical dotted codes
//! (`E.<Area>.<Entity>.<Code>`) are exposed via [`LayoutCoreError::code`] so
//! callers that want machine-readable errors don't have to `match` on the
//! enum shape.

use thiserror::Error;

/// MISSING taxonomy tag.
pub const TAG_MISSING: &str = "001";
/// MISMATCH taxonomy tag.
pub const TAG_MISMATCH: &str = "002";
/// INVALID taxonomy tag.
pub const TAG_INVALID: &str = "003";
/// DUPLICATE taxonomy tag.
pub const TAG_DUPLICATE: &str = "007";
/// UNSUPPORTED taxonomy tag.
pub const TAG_UNSUPPORTED: &str = "009";
/// NOT_FOUND taxonomy tag.
pub const TAG_NOT_FOUND: &str = "021";
/// EXHAUSTED taxonomy tag.
pub const TAG_EXHAUSTED: &str = "026";

/// Bitset of validation preconditions that failed, so callers see every
/// failure from one `validate()` call instead of only the first (spec §4.1,
/// §7 "Propagation").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct ValidationFailures(u8);

impl ValidationFailures {
    pub const EMPTY: ValidationFailures = ValidationFailures(1 << 0);
    pub const HAS_CYCLE: ValidationFailures = ValidationFailures(1 << 1);
    pub const HAS_UNDIRECTED_EDGES: ValidationFailures = ValidationFailures(1 << 2);
    pub const HAS_DIRECTED_EDGES: ValidationFailures = ValidationFailures(1 << 3);
    pub const DISCONNECTED: ValidationFailures = ValidationFailures(1 << 4);

    pub const NONE: ValidationFailures = ValidationFailures(0);

    pub fn contains(self, flag: ValidationFailures) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn insert(&mut self, flag: ValidationFailures) {
        self.0 |= flag.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: ValidationFailures) -> ValidationFailures {
        ValidationFailures(self.0 | other.0)
    }
}

impl std::fmt::Display for ValidationFailures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names = Vec::new();
        if self.contains(Self::EMPTY) {
            names.push("empty");
        }
        if self.contains(Self::HAS_CYCLE) {
            names.push("has_cycle");
        }
        if self.contains(Self::HAS_UNDIRECTED_EDGES) {
            names.push("has_undirected_edges");
        }
        if self.contains(Self::HAS_DIRECTED_EDGES) {
            names.push("has_directed_edges");
        }
        if self.contains(Self::DISCONNECTED) {
            names.push("disconnected");
        }
        write!(f, "[{}]", names.join(", "))
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LayoutCoreError {
    #[error("E.Graph.Node.001: layout called on an empty graph")]
    EmptyGraph,

    #[error("E.Graph.Dag.003: graph contains a cycle but the selected algorithm requires a DAG")]
    CycleDetected,

    #[error(
        "E.Graph.Edge.002: algorithm requires all edges to be directed but undirected edges are present"
    )]
    EdgeDirectionMismatch,

    #[error("E.Graph.Edge.003: self-loop on node {node_id} is not valid for this algorithm")]
    SelfLoopInvalid { node_id: u64 },

    #[error("E.Graph.Edge.007: duplicate edge ({source_id} -> {target_id})")]
    DuplicateEdge { source_id: u64, target_id: u64 },

    #[error("E.Graph.Node.007: duplicate node id {0}")]
    DuplicateNode(u64),

    #[error(
        "E.Graph.Component.003: graph has {count} connected components but the algorithm requires one"
    )]
    DisconnectedGraph { count: usize },

    #[error("E.Layout.Algo.003: {0}")]
    LayoutFailed(String),

    #[error("E.Layout.Algo.026: resource cap exceeded: {0}")]
    OutOfResources(String),

    #[error("E.Layout.Reducer.001: crossing reducer lost a node (total count decreased)")]
    ReducerLostNode,

    #[error("E.Layout.Reducer.002: crossing reducer changed a per-level node count")]
    ReducerNodeCountMismatch,

    #[error("E.Layout.Reducer.003: crossing reducer changed the level count")]
    ReducerCorruptedLevels,

    #[error("E.Layout.Reducer.007: crossing reducer produced a duplicate node")]
    ReducerDuplicateNode,

    #[error("E.Graph.Node.021: node id {0} not found")]
    NodeNotFound(u64),

    #[error("E.Graph.Node.026: node cap of {cap} exceeded")]
    NodeCapExceeded { cap: usize },

    #[error("E.Graph.Edge.026: edge cap of {cap} exceeded")]
    EdgeCapExceeded { cap: usize },

    #[error("validation failed: {0}")]
    Validation(ValidationFailures),
}

impl LayoutCoreError {
    /// The dotted machine code for this error, per spec §6/§7.
    pub fn code(&self) -> &'static str {
        match self {
            LayoutCoreError::EmptyGraph => "E.Graph.Node.001",
            LayoutCoreError::CycleDetected => "E.Graph.Dag.003",
            LayoutCoreError::EdgeDirectionMismatch => "E.Graph.Edge.002",
            LayoutCoreError::SelfLoopInvalid { .. } => "E.Graph.Edge.003",
            LayoutCoreError::DuplicateEdge { .. } => "E.Graph.Edge.007",
            LayoutCoreError::DuplicateNode(_) => "E.Graph.Node.007",
            LayoutCoreError::DisconnectedGraph { .. } => "E.Graph.Component.003",
            LayoutCoreError::LayoutFailed(_) => "E.Layout.Algo.003",
            LayoutCoreError::OutOfResources(_) => "E.Layout.Algo.026",
            LayoutCoreError::ReducerLostNode => "E.Layout.Reducer.001",
            LayoutCoreError::ReducerNodeCountMismatch => "E.Layout.Reducer.002",
            LayoutCoreError::ReducerCorruptedLevels => "E.Layout.Reducer.003",
            LayoutCoreError::ReducerDuplicateNode => "E.Layout.Reducer.007",
            LayoutCoreError::NodeNotFound(_) => "E.Graph.Node.021",
            LayoutCoreError::NodeCapExceeded { .. } => "E.Graph.Node.026",
            LayoutCoreError::EdgeCapExceeded { .. } => "E.Graph.Edge.026",
            LayoutCoreError::Validation(_) => "E.Graph.Validation.003",
        }
    }
}

pub type Result<T> = std::result::Result<T, LayoutCoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_display_lists_all_set_flags() {
        let mut failures = ValidationFailures::NONE;
        failures.insert(ValidationFailures::HAS_CYCLE);
        failures.insert(ValidationFailures::DISCONNECTED);
        assert!(failures.contains(ValidationFailures::HAS_CYCLE));
        assert!(failures.contains(ValidationFailures::DISCONNECTED));
        assert!(!failures.contains(ValidationFailures::EMPTY));
        let rendered = failures.to_string();
        assert!(rendered.contains("has_cycle"));
        assert!(rendered.contains("disconnected"));
    }

    #[test]
    fn error_codes_match_taxonomy() {
        assert_eq!(LayoutCoreError::EmptyGraph.code(), "E.Graph.Node.001");
        assert_eq!(LayoutCoreError::CycleDetected.code(), "E.Graph.Dag.003");
        assert_eq!(
            LayoutCoreError::DuplicateEdge {
                source_id: 1,
                target_id: 2
            }
            .code(),
            "E.Graph.Edge.007"
        );
    }
}
