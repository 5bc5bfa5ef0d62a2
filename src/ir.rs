// src/ir.rs
//! The Layout IR (spec §3, §6): the renderer-agnostic output of both
//! engines. Grounded in the teacher's `igr::NodeData`/`EdgeData` shape
//! (plain structs carrying geometry, `Serialize`/`Deserialize` derived the
//! same way), generalized from "one excalidraw element" to the full closed
//! `EdgePath` variant set spec.md §3 defines.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// JSON schema version of the IR projection (spec §6).
pub const IR_SCHEMA_VERSION: &str = "1.1";

/// Dummy node ids are synthesized in a reserved high range so they can never
/// collide with a caller-supplied id (spec §9 "Dummy-id synthesis").
pub const DUMMY_ID_BASE: u64 = 1 << 31;

/// Synthesize a dummy node id from its owning edge and the level it sits at,
/// deterministically and collision-free among dummies (distinct
/// `(edge_index, level)` pairs never collide because `level` fits in 20
/// bits and `edge_index` is shifted clear of it).
pub fn synthesize_dummy_id(edge_index: usize, level: u32) -> u64 {
    DUMMY_ID_BASE + ((edge_index as u64) << 20) + level as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Explicit,
    /// Reserved: no code path in this crate produces an `Implicit` node
    /// (spec §9 Open Questions — "no observed producer in the source").
    Implicit,
    Dummy,
}

/// One positioned node in the IR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: u64,
    pub label: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub center_x: i32,
    pub level: u32,
    pub level_position: u32,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_index: Option<usize>,
}

impl LayoutNode {
    /// `center_x = x + width/2` (integer division), per spec §3 invariant 4.
    pub fn compute_center_x(x: i32, width: u32) -> i32 {
        x + (width / 2) as i32
    }
}

/// The closed set of edge-path shapes the IR can carry (spec §3, §9 —
/// "adding a variant is a breaking change... bumps the JSON version").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EdgePath {
    Direct,
    Corner {
        horizontal_y: i32,
    },
    /// Reserved: no routing algorithm in this crate emits `SideChannel`
    /// (spec §9 Open Questions).
    SideChannel {
        channel_x: i32,
        start_y: i32,
        end_y: i32,
    },
    MultiSegment {
        waypoints: Vec<(i32, i32)>,
    },
    Spline {
        cp1: (i32, i32),
        cp2: (i32, i32),
    },
}

/// One routed edge in the IR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub from_id: u64,
    pub to_id: u64,
    pub from_x: i32,
    pub from_y: i32,
    pub to_x: i32,
    pub to_y: i32,
    pub path: EdgePath,
    pub edge_index: usize,
    pub directed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_y: Option<i32>,
}

impl LayoutEdge {
    /// Geometric midpoint of the rendered path's start/end, used for label
    /// placement (spec §9: "geometric midpoint... finer placement left to
    /// renderers").
    pub fn midpoint(&self) -> (i32, i32) {
        match &self.path {
            EdgePath::MultiSegment { waypoints } if !waypoints.is_empty() => {
                let mid = waypoints.len() / 2;
                waypoints[mid]
            }
            _ => (
                (self.from_x + self.to_x) / 2,
                (self.from_y + self.to_y) / 2,
            ),
        }
    }

    pub fn with_label_midpoint(mut self) -> Self {
        if self.label.is_some() {
            let (mx, my) = self.midpoint();
            self.label_x = Some(mx);
            self.label_y = Some(my);
        }
        self
    }
}

/// The full output of one `layout()` call (spec §3 "Layout IR entities").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutIr {
    pub version: String,
    pub width: i32,
    pub height: i32,
    pub level_count: u32,
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    /// `levels[L]` enumerates, in left-to-right order, the IR indices of
    /// nodes whose `level == L` (spec §3 invariant 5).
    pub levels: Vec<Vec<usize>>,
    #[serde(skip)]
    pub id_to_index: HashMap<u64, usize>,
}

impl LayoutIr {
    pub fn node_by_id(&self, id: u64) -> Option<&LayoutNode> {
        self.id_to_index.get(&id).map(|&idx| &self.nodes[idx])
    }

    /// Rebuild `id_to_index` after deserializing (the map itself is not
    /// serialized, matching the teacher's pattern of keeping lookup indices
    /// as derived, not wire, data).
    pub fn reindex(&mut self) {
        self.id_to_index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id, idx))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_x_uses_integer_division() {
        assert_eq!(LayoutNode::compute_center_x(0, 7), 3);
        assert_eq!(LayoutNode::compute_center_x(10, 4), 12);
    }

    #[test]
    fn dummy_ids_never_collide_with_real_range() {
        let dummy = synthesize_dummy_id(0, 0);
        assert!(dummy >= DUMMY_ID_BASE);
    }

    #[test]
    fn dummy_ids_distinct_for_distinct_edge_level_pairs() {
        let a = synthesize_dummy_id(1, 2);
        let b = synthesize_dummy_id(1, 3);
        let c = synthesize_dummy_id(2, 2);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn edge_path_json_tag_matches_schema() {
        let path = EdgePath::Corner { horizontal_y: 5 };
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json["type"], "corner");
        assert_eq!(json["horizontal_y"], 5);
    }

    #[test]
    fn multi_segment_midpoint_uses_middle_waypoint() {
        let edge = LayoutEdge {
            from_id: 1,
            to_id: 2,
            from_x: 0,
            from_y: 0,
            to_x: 10,
            to_y: 10,
            path: EdgePath::MultiSegment {
                waypoints: vec![(0, 0), (5, 5), (10, 10)],
            },
            edge_index: 0,
            directed: true,
            label: None,
            label_x: None,
            label_y: None,
        };
        assert_eq!(edge.midpoint(), (5, 5));
    }
}
