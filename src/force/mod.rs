// src/force/mod.rs
//! The force-directed engine (spec §4.8): Fruchterman-Reingold with an
//! optional Barnes-Hut quadtree acceleration, entirely on Q16.16 fixed-point
//! arithmetic so a given seed reproduces byte-identical output across
//! platforms (spec §5 "Ordering guarantees").

pub mod prng;
pub mod quadtree;
pub mod routing;
pub mod simulation;

use crate::config::{EdgeRouting, FrParams, FrVariant};
use crate::error::Result;
use crate::graph::GraphQuery;
use crate::ir::{LayoutIr, IR_SCHEMA_VERSION};
use std::collections::HashMap;

/// Run the force-directed pipeline against `graph` and assemble a
/// [`LayoutIr`] (spec §4.8-4.9). FDG produces no rank structure: every node
/// is reported at `level == 0` and `levels` is the single list of all IR
/// node indices in input order, satisfying invariant 5 trivially.
pub fn run(
    graph: &impl GraphQuery,
    variant: FrVariant,
    params: &FrParams,
    routing: EdgeRouting,
) -> Result<LayoutIr> {
    let positions = simulation::simulate(graph, variant, params);
    let cells = routing::quantize(&positions);
    let nodes = routing::build_nodes(graph, &cells);
    let edges = routing::route(graph, &nodes, routing);

    let width = nodes.iter().map(|n| n.x + n.width as i32).max().unwrap_or(1).max(1);
    let height = nodes.iter().map(|n| n.y).max().unwrap_or(0) + 1;

    let id_to_index: HashMap<u64, usize> =
        nodes.iter().enumerate().map(|(idx, n)| (n.id, idx)).collect();
    let levels = if nodes.is_empty() {
        Vec::new()
    } else {
        vec![(0..nodes.len()).collect()]
    };

    Ok(LayoutIr {
        version: IR_SCHEMA_VERSION.to_string(),
        width,
        height,
        level_count: if nodes.is_empty() { 0 } else { 1 },
        nodes,
        edges,
        levels,
        id_to_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrParams;
    use crate::graph::Graph;

    #[test]
    fn ring_of_four_produces_four_nodes_and_edges() {
        let mut g = Graph::new();
        for i in 1..=4u64 {
            g.add_node(i, format!("n{i}"), 1).unwrap();
        }
        g.add_edge(1, 2, false, None).unwrap();
        g.add_edge(2, 3, false, None).unwrap();
        g.add_edge(3, 4, false, None).unwrap();
        g.add_edge(4, 1, false, None).unwrap();

        let params = FrParams { seed: 42, max_iterations: 300, ..FrParams::default() };
        let ir = run(&g, FrVariant::BarnesHut, &params, EdgeRouting::Direct).unwrap();
        assert_eq!(ir.nodes.len(), 4);
        assert_eq!(ir.edges.len(), 4);
        assert!(ir.edges.iter().all(|e| !e.directed));
        assert_eq!(ir.levels, vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn same_seed_yields_byte_identical_ir() {
        let mut g = Graph::new();
        for i in 1..=4u64 {
            g.add_node(i, format!("n{i}"), 1).unwrap();
        }
        g.add_edge(1, 2, false, None).unwrap();
        g.add_edge(2, 3, false, None).unwrap();
        g.add_edge(3, 4, false, None).unwrap();
        g.add_edge(4, 1, false, None).unwrap();

        let params = FrParams { seed: 42, ..FrParams::default() };
        let a = run(&g, FrVariant::BarnesHut, &params, EdgeRouting::Direct).unwrap();
        let b = run(&g, FrVariant::BarnesHut, &params, EdgeRouting::Direct).unwrap();
        for (na, nb) in a.nodes.iter().zip(b.nodes.iter()) {
            assert_eq!(na.x, nb.x);
            assert_eq!(na.y, nb.y);
        }
    }
}
