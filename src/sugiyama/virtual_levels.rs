// src/sugiyama/virtual_levels.rs
//! Dummy-node inflation (spec §4.4): expands a plain `level[]` array into
//! one virtual level per rank, each holding the real nodes at that rank
//! plus one dummy per edge that spans across it.

use crate::graph::GraphQuery;
use crate::sugiyama::cycle_break::effective_endpoints;
use crate::sugiyama::VNode;

/// `virtual_levels[L]` is the ordered sequence of [`VNode`]s at rank `L`:
/// every `Real(idx)` with `level[idx] == L` (input order), followed by one
/// `Dummy(edge_idx)` for every edge whose effective span crosses `L`.
pub fn inflate(
    graph: &impl GraphQuery,
    levels: &[u32],
    reversed: &[bool],
    max_level: u32,
) -> Vec<Vec<VNode>> {
    let mut virtual_levels: Vec<Vec<VNode>> = vec![Vec::new(); max_level as usize + 1];

    for idx in 0..graph.node_count() {
        virtual_levels[levels[idx] as usize].push(VNode::Real(idx));
    }

    for (edge_idx, e) in graph.edges().iter().enumerate() {
        let (eff_source, eff_target) =
            effective_endpoints(e.source_idx, e.target_idx, edge_idx, reversed);
        let lo = levels[eff_source];
        let hi = levels[eff_target];
        if hi > lo + 1 {
            for l in (lo + 1)..hi {
                virtual_levels[l as usize].push(VNode::Dummy(edge_idx, l));
            }
        }
    }

    virtual_levels
}

/// Every edge's intermediate dummy levels, in ascending order — used by
/// routing to walk an edge's waypoint chain (spec §4.7).
pub fn dummy_levels_for_edge(
    source_level: u32,
    target_level: u32,
) -> std::ops::Range<u32> {
    let lo = source_level.min(target_level);
    let hi = source_level.max(target_level);
    (lo + 1)..hi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn skip_level_edge_gets_one_dummy() {
        let mut g = Graph::new();
        g.add_node(0, "a", 1).unwrap();
        g.add_node(1, "b", 1).unwrap();
        g.add_node(2, "c", 1).unwrap();
        g.add_edge(0, 1, true, None).unwrap();
        g.add_edge(1, 2, true, None).unwrap();
        g.add_edge(0, 2, true, None).unwrap();
        let levels = vec![0u32, 1, 2];
        let reversed = vec![false, false, false];
        let vl = inflate(&g, &levels, &reversed, 2);
        assert_eq!(vl.len(), 3);
        assert_eq!(vl[1].len(), 2); // Real(1) + Dummy(edge 2)
        assert!(vl[1].contains(&VNode::Dummy(2, 1)));
    }

    #[test]
    fn level_count_equals_max_level_plus_one() {
        let mut g = Graph::new();
        g.add_node(0, "a", 1).unwrap();
        let levels = vec![0u32];
        let vl = inflate(&g, &levels, &[], 0);
        assert_eq!(vl.len(), 1);
    }
}
