// src/validation.rs
//! Precondition checking (spec §4.2). Runs a three-color DFS (iterative, no
//! recursion — spec §9 "no recursion over caller-controlled graph depth") to
//! detect cycles, then folds in the other `Requirements` checks to build a
//! single [`ValidationFailures`] bitset so a caller sees every violation from
//! one pass instead of stopping at the first.

use crate::config::Requirements;
use crate::error::{LayoutCoreError, Result, ValidationFailures};
use crate::graph::GraphQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Iterative three-color DFS cycle detector. Returns `true` if a back edge
/// (gray -> gray) is found. Uses an explicit stack of `(node, child_cursor)`
/// frames instead of the call stack, so depth is bounded by heap, not by the
/// platform's stack size (spec §9).
pub fn has_cycle(graph: &impl GraphQuery) -> bool {
    let n = graph.node_count();
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
                    Color::Gray => return true,
                    Color::Black => {}
                }
            } else {
                color[node] = Color::Black;
                stack.pop();
            }
        }
    }
    false
}

/// Number of weakly-connected components in `graph`, computed generically
/// over [`GraphQuery`] (spec §4.1 "disconnected" precondition, §7
/// `E.Graph.Component.003`). Walks both `children` and `parents` so
/// direction doesn't matter for connectivity.
pub fn connected_components(graph: &impl GraphQuery) -> usize {
    let n = graph.node_count();
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
            for &next in graph.children(node).iter().chain(graph.parents(node).iter()) {
                if !visited[next] {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }
    }
    components
}

/// Compute the full set of precondition failures for `graph` against `reqs`
/// (spec §4.1, §4.2, §7). Never short-circuits: every requirement that fails
/// sets its own bit.
pub fn validate(graph: &impl GraphQuery, reqs: Requirements) -> ValidationFailures {
    let mut failures = ValidationFailures::NONE;

    if reqs.non_empty && graph.node_count() == 0 {
        failures.insert(ValidationFailures::EMPTY);
    }

    if reqs.acyclic && has_cycle(graph) {
        failures.insert(ValidationFailures::HAS_CYCLE);
    }

    if reqs.all_directed {
        let edges = graph.edges();
        if edges.iter().any(|e| !e.directed) {
            failures.insert(ValidationFailures::HAS_UNDIRECTED_EDGES);
        }
    }

    if reqs.requires_connected && connected_components(graph) > 1 {
        failures.insert(ValidationFailures::DISCONNECTED);
    }

    failures
}

/// Validate and convert to a `Result`, for call sites that want to fail fast
/// on the first `validate()` rather than inspect the bitset themselves.
pub fn validate_or_err(graph: &impl GraphQuery, reqs: Requirements) -> Result<()> {
    let failures = validate(graph, reqs);
    if failures.is_empty() {
        Ok(())
    } else if failures == ValidationFailures::EMPTY {
        Err(LayoutCoreError::EmptyGraph)
    } else if failures == ValidationFailures::HAS_CYCLE {
        Err(LayoutCoreError::CycleDetected)
    } else if failures == ValidationFailures::HAS_UNDIRECTED_EDGES {
        Err(LayoutCoreError::EdgeDirectionMismatch)
    } else {
        Err(LayoutCoreError::Validation(failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    fn chain(len: usize) -> Graph {
        let mut g = Graph::new();
        for i in 0..len {
            g.add_node(i as u64, format!("n{i}"), 10).unwrap();
        }
        for i in 0..len.saturating_sub(1) {
            g.add_edge(i as u64, i as u64 + 1, true, None).unwrap();
        }
        g
    }

    #[test]
    fn acyclic_chain_has_no_cycle() {
        let g = chain(5);
        assert!(!has_cycle(&g));
    }

    #[test]
    fn back_edge_is_detected() {
        let mut g = chain(3);
        g.add_edge(2, 0, true, None).unwrap();
        assert!(has_cycle(&g));
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let mut g = Graph::new();
        g.add_node(0, "a", 10).unwrap();
        g.add_edge(0, 0, true, None).unwrap();
        assert!(has_cycle(&g));
    }

    #[test]
    fn empty_graph_with_non_empty_requirement_sets_empty_bit() {
        let g = Graph::new();
        let reqs = Requirements {
            non_empty: true,
            acyclic: false,
            all_directed: false,
            requires_connected: false,
        };
        let failures = validate(&g, reqs);
        assert!(failures.contains(ValidationFailures::EMPTY));
    }

    #[test]
    fn disjoint_failures_all_reported_together() {
        let mut g = Graph::new();
        g.add_node(0, "a", 10).unwrap();
        g.add_node(1, "b", 10).unwrap();
        g.add_edge(0, 1, true, None).unwrap();
        g.add_edge(1, 0, true, None).unwrap();
        let reqs = Requirements {
            non_empty: true,
            acyclic: true,
            all_directed: true,
            requires_connected: false,
        };
        let failures = validate(&g, reqs);
        assert!(failures.contains(ValidationFailures::HAS_CYCLE));
        assert!(!failures.contains(ValidationFailures::EMPTY));
    }

    #[test]
    fn requires_connected_flags_multiple_components() {
        let mut g = Graph::new();
        g.add_node(0, "a", 10).unwrap();
        g.add_node(1, "b", 10).unwrap();
        g.add_node(2, "c", 10).unwrap();
        g.add_edge(0, 1, true, None).unwrap();
        let reqs = Requirements {
            non_empty: false,
            acyclic: false,
            all_directed: false,
            requires_connected: true,
        };
        let failures = validate(&g, reqs);
        assert!(failures.contains(ValidationFailures::DISCONNECTED));
        assert_eq!(connected_components(&g), 2);
    }
}
