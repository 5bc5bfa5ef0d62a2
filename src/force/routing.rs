// src/force/routing.rs
//! Quantisation of simulated positions to IR cell coordinates, and edge
//! routing for the force-directed engine (spec §4.8 "Quantisation to IR").
//! Grounded in `sugiyama::routing`'s direct/spline split, simplified here
//! since FDG has no dummy waypoints to thread through.

use crate::config::EdgeRouting;
use crate::fixed::Point;
use crate::graph::GraphQuery;
use crate::ir::{EdgePath, LayoutEdge, LayoutNode, NodeKind};
use std::collections::HashSet;

/// One quantised body: its integer cell position (taken as the node's
/// centre) before width is folded in.
pub struct Quantized {
    pub cell_x: i32,
    pub cell_y: i32,
}

/// Round every simulated position to the nearest integer cell (positions
/// are already expressed in cell units — `FrParams::k` is specified "in
/// grid cells", spec §4.8 — so no additional scale factor is needed), then
/// nudge any pair whose quantised cell collides apart by one cell (spec
/// §4.8 "ensure any two nodes whose quantised cells collide are nudged
/// apart").
pub fn quantize(positions: &[Point]) -> Vec<Quantized> {
    let mut cells: Vec<Quantized> = positions
        .iter()
        .map(|p| Quantized {
            cell_x: p.x.round_to_int(),
            cell_y: p.y.round_to_int(),
        })
        .collect();

    let mut occupied: HashSet<(i32, i32)> = HashSet::new();
    for cell in cells.iter_mut() {
        let mut candidate = (cell.cell_x, cell.cell_y);
        let mut nudge = 1;
        while occupied.contains(&candidate) {
            candidate = (cell.cell_x + nudge, cell.cell_y);
            nudge += 1;
        }
        occupied.insert(candidate);
        cell.cell_x = candidate.0;
        cell.cell_y = candidate.1;
    }
    cells
}

/// Assemble IR nodes from quantised positions, one per input node (spec
/// §4.9; FDG never produces dummies).
pub fn build_nodes(graph: &impl GraphQuery, cells: &[Quantized]) -> Vec<LayoutNode> {
    (0..graph.node_count())
        .map(|idx| {
            let node = graph.node_at(idx).expect("node index in range");
            let cell = &cells[idx];
            let x = cell.cell_x - (node.width / 2) as i32;
            LayoutNode {
                id: node.id,
                label: node.label.to_string(),
                x,
                y: cell.cell_y,
                width: node.width,
                center_x: LayoutNode::compute_center_x(x, node.width),
                level: 0,
                level_position: idx as u32,
                kind: NodeKind::Explicit,
                edge_index: None,
            }
        })
        .collect()
}

/// Route every edge as `direct` (or `spline` when requested); FDG has no
/// rank structure to route corners through (spec §4.8).
pub fn route(graph: &impl GraphQuery, nodes: &[LayoutNode], routing: EdgeRouting) -> Vec<LayoutEdge> {
    graph
        .edges()
        .iter()
        .enumerate()
        .map(|(edge_idx, e)| {
            let from = &nodes[e.source_idx];
            let to = &nodes[e.target_idx];
            let path = match routing {
                EdgeRouting::Direct => EdgePath::Direct,
                EdgeRouting::Spline => EdgePath::Spline {
                    cp1: (
                        from.center_x + (to.center_x - from.center_x) / 3,
                        from.y + (to.y - from.y) / 3,
                    ),
                    cp2: (
                        from.center_x + 2 * (to.center_x - from.center_x) / 3,
                        from.y + 2 * (to.y - from.y) / 3,
                    ),
                },
            };
            LayoutEdge {
                from_id: from.id,
                to_id: to.id,
                from_x: from.center_x,
                from_y: from.y,
                to_x: to.center_x,
                to_y: to.y,
                path,
                edge_index: edge_idx,
                directed: e.directed,
                label: e.label.clone(),
                label_x: None,
                label_y: None,
            }
            .with_label_midpoint()
        })
        .collect()
}
