// src/sugiyama/mod.rs
//! The hierarchical Sugiyama pipeline (spec §4.2-4.7): cycle-break ->
//! layering -> dummy-node inflation -> crossing reduction -> positioning ->
//! edge routing -> IR assembly. Grounded in the teacher's `DagreLayout`
//! (one `layout()` entry point chaining private phase methods), split here
//! into one module per phase so each phase's contract (admissibility,
//! reducer snapshot, symmetric compaction) is independently testable.

pub mod crossing;
pub mod cycle_break;
pub mod layering;
pub mod positioning;
pub mod routing;
pub mod virtual_levels;

use crate::config::SugiyamaOptions;
use crate::error::Result;
use crate::graph::GraphQuery;
use crate::ir::{synthesize_dummy_id, IR_SCHEMA_VERSION};
use crate::ir::{LayoutIr, LayoutNode, NodeKind as IrNodeKind};
use std::collections::HashMap;

/// A node in a virtual level: either a real graph node or a placeholder for
/// an edge passing through this level (spec §3 "Virtual level").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VNode {
    Real(usize),
    /// `Dummy(edge_idx, level)` — distinct per intermediate level an edge
    /// passes through, so each placeholder carries its own position.
    Dummy(usize, u32),
}

/// Run the full pipeline against `graph` and assemble a [`LayoutIr`] (spec
/// §4.1-4.9).
pub fn run(
    graph: &impl GraphQuery,
    options: &SugiyamaOptions,
    node_spacing: u32,
    level_spacing: u32,
) -> Result<LayoutIr> {
    let n = graph.node_count();
    let reversed = cycle_break::break_cycles(graph);
    let levels = layering::assign_levels(graph, &reversed, options.layering)?;
    let max_level = levels.iter().copied().max().unwrap_or(0);

    let mut virtual_levels = virtual_levels::inflate(graph, &levels, &reversed, max_level);
    let pipeline = crossing::Pipeline::new(options.crossing_reducers.clone());
    pipeline.run(graph, &levels, &reversed, &mut virtual_levels)?;

    let placement = positioning::place(
        graph,
        &virtual_levels,
        &levels,
        &reversed,
        options.positioning,
        node_spacing,
        level_spacing,
    )?;

    let mut center_x_of_real = vec![0i32; n];
    let mut x_of_real = vec![0i32; n];
    for idx in 0..n {
        let v = VNode::Real(idx);
        let x = placement.x.get(&v).copied().unwrap_or(0.0).round_ties_even() as i32;
        let width = placement.width_of.get(&v).copied().unwrap_or(1);
        x_of_real[idx] = x;
        center_x_of_real[idx] = LayoutNode::compute_center_x(x, width);
    }

    let mut nodes = Vec::with_capacity(n);
    let mut id_to_index = HashMap::new();
    let mut levels_out: Vec<Vec<usize>> = vec![Vec::new(); max_level as usize + 1];

    for level in &virtual_levels {
        for &vnode in level {
            match vnode {
                VNode::Real(idx) => {
                    let node = graph.node_at(idx).expect("node index in range");
                    let ir_idx = nodes.len();
                    let level_position = levels_out[levels[idx] as usize].len() as u32;
                    nodes.push(LayoutNode {
                        id: node.id,
                        label: node.label.to_string(),
                        x: x_of_real[idx],
                        y: positioning::y_of_level(levels[idx], level_spacing),
                        width: node.width,
                        center_x: center_x_of_real[idx],
                        level: levels[idx],
                        level_position,
                        kind: IrNodeKind::Explicit,
                        edge_index: None,
                    });
                    id_to_index.insert(node.id, ir_idx);
                    levels_out[levels[idx] as usize].push(ir_idx);
                }
                VNode::Dummy(edge_idx, dummy_level) => {
                    let x = placement
                        .x
                        .get(&vnode)
                        .copied()
                        .unwrap_or(0.0)
                        .round_ties_even() as i32;
                    let id = synthesize_dummy_id(edge_idx, dummy_level);
                    let ir_idx = nodes.len();
                    let level_position = levels_out[dummy_level as usize].len() as u32;
                    nodes.push(LayoutNode {
                        id,
                        label: String::new(),
                        x,
                        y: positioning::y_of_level(dummy_level, level_spacing),
                        width: 0,
                        center_x: x,
                        level: dummy_level,
                        level_position,
                        kind: IrNodeKind::Dummy,
                        edge_index: Some(edge_idx),
                    });
                    id_to_index.insert(id, ir_idx);
                    levels_out[dummy_level as usize].push(ir_idx);
                }
            }
        }
    }

    let edges = routing::route(
        graph,
        &levels,
        &reversed,
        &placement.x,
        &center_x_of_real,
        level_spacing,
        options.routing,
    );

    Ok(LayoutIr {
        version: IR_SCHEMA_VERSION.to_string(),
        width: placement.total_width.max(1),
        height: placement.total_height,
        level_count: max_level + 1,
        nodes,
        edges,
        levels: levels_out,
        id_to_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{presets, Algorithm};
    use crate::graph::Graph;

    #[test]
    fn chain_of_three_produces_three_levels() {
        let mut g = Graph::new();
        g.add_node(1, "A", 1).unwrap();
        g.add_node(2, "B", 1).unwrap();
        g.add_node(3, "C", 1).unwrap();
        g.add_edge(1, 2, true, None).unwrap();
        g.add_edge(2, 3, true, None).unwrap();

        let (config, _) = presets::sugiyama_standard();
        let options = match config.algorithm {
            Algorithm::Sugiyama(opts) => opts,
            _ => unreachable!(),
        };
        let ir = run(&g, &options, 2, 1).unwrap();
        assert_eq!(ir.nodes.len(), 3);
        assert_eq!(ir.edges.len(), 2);
        assert_eq!(ir.level_count, 3);
        assert_eq!(ir.levels, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn skip_level_edge_gets_one_dummy_node() {
        let mut g = Graph::new();
        g.add_node(1, "A", 1).unwrap();
        g.add_node(2, "B", 1).unwrap();
        g.add_node(3, "C", 1).unwrap();
        g.add_edge(1, 2, true, None).unwrap();
        g.add_edge(2, 3, true, None).unwrap();
        g.add_edge(1, 3, true, None).unwrap();

        let (config, _) = presets::sugiyama_quality();
        let options = match config.algorithm {
            Algorithm::Sugiyama(opts) => opts,
            _ => unreachable!(),
        };
        let ir = run(&g, &options, 2, 1).unwrap();
        let dummy_count = ir
            .nodes
            .iter()
            .filter(|n| matches!(n.kind, IrNodeKind::Dummy))
            .count();
        assert_eq!(dummy_count, 1);
    }
}
