// src/sugiyama/cycle_break.rs
//! DFS-based back-edge detection (spec §4.2). Produces the `reversed[]`
//! mask the rest of the pipeline consults instead of mutating the input
//! graph. Grounded in `validation::has_cycle`'s iterative three-colour
//! walk, extended here to additionally record which edges closed a cycle.

use crate::graph::GraphQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Run an iterative three-colour DFS over every node, marking each edge
/// that points into a currently-gray node as a back-edge. The input graph
/// is never mutated; downstream layering/positioning/routing consult this
/// mask instead (spec §4.2).
pub fn break_cycles(graph: &impl GraphQuery) -> Vec<bool> {
    let n = graph.node_count();
    let edges = graph.edges();
    let mut reversed = vec![false; edges.len()];

    // edge lookup: (source_idx, child position in children(source_idx)) -> edge_idx
    // children() only gives node indices, so map (source_idx, target_idx) -> edge_idx,
    // taking the first unused match per pair (duplicate (source,target) pairs are
    // rejected at graph-construction time, so this is a 1:1 map).
    let mut edge_of_pair = std::collections::HashMap::new();
    for (idx, e) in edges.iter().enumerate() {
        edge_of_pair.insert((e.source_idx, e.target_idx), idx);
    }

    let mut color = vec![Color::White; n];
    for start in 0..n {
        if color[start] != Color::White {
            continue;
        }
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        color[start] = Color::Gray;
        while let Some(&mut (node, ref mut cursor)) = stack.last_mut() {
            let children = graph.children(node);
            if *cursor < children.len() {
                let next = children[*cursor];
                *cursor += 1;
                match color[next] {
                    Color::White => {
                        color[next] = Color::Gray;
                        stack.push((next, 0));
                    }
                    Color::Gray => {
                        if let Some(&edge_idx) = edge_of_pair.get(&(node, next)) {
                            reversed[edge_idx] = true;
                        }
                    }
                    Color::Black => {}
                }
            } else {
                color[node] = Color::Black;
                stack.pop();
            }
        }
    }
    reversed
}

/// The effective (layering-direction) endpoints of edge `edge_idx`: swapped
/// if the edge was marked a back-edge, identity otherwise.
pub fn effective_endpoints(
    source_idx: usize,
    target_idx: usize,
    edge_idx: usize,
    reversed: &[bool],
) -> (usize, usize) {
    if reversed[edge_idx] {
        (target_idx, source_idx)
    } else {
        (source_idx, target_idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn acyclic_graph_has_no_back_edges() {
        let mut g = Graph::new();
        g.add_node(0, "a", 1).unwrap();
        g.add_node(1, "b", 1).unwrap();
        g.add_edge(0, 1, true, None).unwrap();
        let reversed = break_cycles(&g);
        assert!(reversed.iter().all(|&r| !r));
    }

    #[test]
    fn triangle_cycle_marks_exactly_one_back_edge() {
        let mut g = Graph::new();
        g.add_node(0, "a", 1).unwrap();
        g.add_node(1, "b", 1).unwrap();
        g.add_node(2, "c", 1).unwrap();
        g.add_edge(0, 1, true, None).unwrap();
        g.add_edge(1, 2, true, None).unwrap();
        g.add_edge(2, 0, true, None).unwrap();
        let reversed = break_cycles(&g);
        assert_eq!(reversed.iter().filter(|&&r| r).count(), 1);
        assert!(reversed[2]);
    }
}
