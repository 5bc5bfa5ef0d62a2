// src/sugiyama/layering.rs
//! Layer (rank) assignment (spec §4.3). Three algorithms share one
//! admissibility contract: `level[v] >= level[u] + 1` for every forward
//! edge `(u, v)`, using each edge's *effective* endpoints (source/target
//! swapped when the edge was marked a back-edge by cycle-break).
//!
//! Longest-path is grounded in the teacher's `dfs_rank`/`longest_path_ranking`
//! (a fixed-point relaxation rather than the teacher's plain recursive DFS,
//! so it tolerates arbitrarily deep graphs without recursion). Network
//! simplex follows Gansner et al. 1993 as summarized in the component
//! design: seed from longest-path, grow a tight spanning tree, then pivot
//! on the most-negative cut value until none remain (or the pivot budget
//! for the `fast` variant is exhausted).

use crate::config::Layering;
use crate::error::Result;
use crate::graph::GraphQuery;
use crate::sugiyama::cycle_break::effective_endpoints;
use std::collections::HashMap;

struct EffectiveEdge {
    u: usize,
    v: usize,
    /// 0 for self-loops, 1 otherwise (spec §4.3 "Edge cases").
    min_length: i64,
}

fn effective_edges(graph: &impl GraphQuery, reversed: &[bool]) -> Vec<EffectiveEdge> {
    graph
        .edges()
        .iter()
        .enumerate()
        .map(|(idx, e)| {
            let (u, v) = effective_endpoints(e.source_idx, e.target_idx, idx, reversed);
            let min_length = if u == v { 0 } else { 1 };
            EffectiveEdge { u, v, min_length }
        })
        .collect()
}

/// Dispatch to the configured layering algorithm (spec §4.1, §4.3).
pub fn assign_levels(
    graph: &impl GraphQuery,
    reversed: &[bool],
    algo: Layering,
) -> Result<Vec<u32>> {
    let edges = effective_edges(graph, reversed);
    let seed = longest_path(graph.node_count(), &edges);
    match algo {
        Layering::LongestPath => Ok(seed),
        Layering::NetworkSimplex => Ok(network_simplex(graph.node_count(), &edges, seed, None)),
        Layering::NetworkSimplexFast => {
            let n = graph.node_count();
            let budget = n.max(((n as f64) * (edges.len() as f64).sqrt()) as usize);
            Ok(network_simplex(n, &edges, seed, Some(budget)))
        }
    }
}

/// Fixed-point longest-path relaxation: repeatedly bump
/// `level[v] = max(level[v], level[u] + min_length)` until a full pass makes
/// no change. O(V+E) typical, O(V*E) worst case (spec §4.3).
fn longest_path(n: usize, edges: &[EffectiveEdge]) -> Vec<u32> {
    let mut level = vec![0i64; n];
    let mut changed = true;
    let mut guard = 0usize;
    let limit = n.saturating_mul(edges.len().max(1)).max(1);
    while changed && guard <= limit {
        changed = false;
        guard += 1;
        for e in edges {
            if e.u == e.v {
                continue;
            }
            let candidate = level[e.u] + e.min_length;
            if candidate > level[e.v] {
                level[e.v] = candidate;
                changed = true;
            }
        }
    }
    let min = level.iter().copied().min().unwrap_or(0);
    level.iter().map(|&l| (l - min) as u32).collect()
}

/// Spanning tree used by network simplex: `parent[i]` is the tree parent of
/// node `i` (or `None` for the root of its component), `parent_edge[i]`
/// indexes into `edges` for the tree edge connecting `i` to its parent.
struct Tree {
    parent: Vec<Option<usize>>,
    parent_edge: Vec<Option<usize>>,
    in_tree: Vec<bool>,
    /// DFS pre-order entry/exit numbers, used for O(1) subtree membership
    /// tests (`low[w] <= lim[x] <= lim[w]` iff `x` is in `w`'s subtree).
    low: Vec<u32>,
    lim: Vec<u32>,
}

fn build_tight_tree(n: usize, edges: &[EffectiveEdge], level: &mut [i64]) -> Tree {
    let mut in_tree = vec![false; n];
    let mut parent = vec![None; n];
    let mut parent_edge = vec![None; n];
    if n == 0 {
        return Tree {
            parent,
            parent_edge,
            in_tree,
            low: vec![],
            lim: vec![],
        };
    }

    // adjacency with edge index and direction-neutral endpoint
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (idx, e) in edges.iter().enumerate() {
        if e.u != e.v {
            adj[e.u].push(idx);
            adj[e.v].push(idx);
        }
    }

    in_tree[0] = true;
    let mut tree_size = 1;
    let mut guard = 0usize;
    let guard_limit = n.saturating_mul(n.max(1)) + edges.len() + 16;

    while tree_size < n && guard <= guard_limit {
        guard += 1;
        // Find a tight non-tree edge with exactly one endpoint in the tree.
        let mut found = None;
        for (idx, e) in edges.iter().enumerate() {
            if e.u == e.v {
                continue;
            }
            let (a, b) = (e.u, e.v);
            if in_tree[a] == in_tree[b] {
                continue;
            }
            let slack = (level[b] - level[a] - e.min_length).abs();
            if slack == 0 {
                found = Some(idx);
                break;
            }
        }
        if let Some(idx) = found {
            let e = &edges[idx];
            let (new_node, existing) = if in_tree[e.u] { (e.v, e.u) } else { (e.u, e.v) };
            in_tree[new_node] = true;
            parent[new_node] = Some(existing);
            parent_edge[new_node] = Some(idx);
            tree_size += 1;
            continue;
        }

        // No tight edge: shift all in-tree levels by the minimum slack of
        // any edge crossing the tree boundary (spec §4.3 step 2).
        let mut min_slack: Option<i64> = None;
        for e in edges {
            if e.u == e.v {
                continue;
            }
            if in_tree[e.u] == in_tree[e.v] {
                continue;
            }
            let slack = (level[e.v] - level[e.u] - e.min_length).abs();
            min_slack = Some(min_slack.map_or(slack, |m: i64| m.min(slack)));
        }
        match min_slack {
            Some(shift) if shift > 0 => {
                for i in 0..n {
                    if in_tree[i] {
                        level[i] += shift;
                    }
                }
            }
            _ => break, // disconnected from node 0's component; leave remaining nodes as-is.
        }
    }

    let (low, lim) = dfs_low_lim(n, &parent);
    Tree {
        parent,
        parent_edge,
        in_tree,
        low,
        lim,
    }
}

fn dfs_low_lim(n: usize, parent: &[Option<usize>]) -> (Vec<u32>, Vec<u32>) {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut roots = Vec::new();
    for (node, p) in parent.iter().enumerate() {
        match p {
            Some(par) => children[*par].push(node),
            None => roots.push(node),
        }
    }
    let mut low = vec![0u32; n];
    let mut lim = vec![0u32; n];
    let mut counter = 0u32;
    for root in roots {
        let mut stack = vec![(root, 0usize, counter)];
        low[root] = counter;
        while let Some(&mut (node, ref mut cursor, _entry_lim)) = stack.last_mut() {
            if *cursor < children[node].len() {
                let child = children[node][*cursor];
                *cursor += 1;
                counter += 1;
                low[child] = counter;
                stack.push((child, 0, counter));
            } else {
                counter += 1;
                lim[node] = counter;
                stack.pop();
            }
        }
    }
    (low, lim)
}

fn in_subtree(tree: &Tree, root: usize, node: usize) -> bool {
    tree.low[root] <= tree.low[node] && tree.low[node] <= tree.lim[root]
}

/// Cut value of tree edge `(parent -> child)` equivalently owned by `child`:
/// the signed sum of weights of edges crossing the cut induced by removing
/// that tree edge, where edges going child-subtree -> rest count positive
/// in the tree-edge's own orientation and the rest negative.
fn cut_value(tree: &Tree, child: usize, edges: &[EffectiveEdge]) -> i64 {
    let tree_edge_idx = match tree.parent_edge[child] {
        Some(idx) => idx,
        None => return 0,
    };
    let tree_edge_forward = edges[tree_edge_idx].u == tree.parent[child].unwrap()
        && edges[tree_edge_idx].v == child;
    let mut total = 0i64;
    for e in edges {
        if e.u == e.v {
            continue;
        }
        let u_in = in_subtree(tree, child, e.u);
        let v_in = in_subtree(tree, child, e.v);
        if u_in == v_in {
            continue;
        }
        // Edge leaves the child subtree in the same direction as the tree
        // edge (u outside/in -> matches tree_edge_forward orientation).
        let same_dir = if tree_edge_forward { !u_in } else { u_in };
        total += if same_dir { 1 } else { -1 };
    }
    total
}

/// Full network-simplex ranking (spec §4.3). `pivot_budget` bounds the
/// number of pivots for the `fast` variant; `None` runs to convergence.
fn network_simplex(
    n: usize,
    edges: &[EffectiveEdge],
    seed: Vec<u32>,
    pivot_budget: Option<usize>,
) -> Vec<u32> {
    if n == 0 {
        return seed;
    }
    let mut level: Vec<i64> = seed.iter().map(|&l| l as i64).collect();
    let mut tree = build_tight_tree(n, edges, &mut level);

    let mut pivots = 0usize;
    let budget = pivot_budget.unwrap_or(usize::MAX);
    let mut stalls = 0usize;
    let stall_limit = n.max(1);

    while pivots < budget {
        // Leaving edge: tree edge (by child) with most negative cut value.
        let mut leaving: Option<(usize, i64)> = None;
        for child in 0..n {
            if tree.parent[child].is_none() || !tree.in_tree[child] {
                continue;
            }
            let cv = cut_value(&tree, child, edges);
            if cv < 0 && leaving.map_or(true, |(_, best)| cv < best) {
                leaving = Some((child, cv));
            }
        }
        let (leaving_child, _) = match leaving {
            Some(l) => l,
            None => break,
        };

        // Entering edge: non-tree edge crossing the same cut in the
        // correcting direction, minimum slack.
        let mut entering: Option<(usize, i64)> = None;
        for (idx, e) in edges.iter().enumerate() {
            if e.u == e.v || Some(idx) == tree.parent_edge[leaving_child] {
                continue;
            }
            let u_in = in_subtree(&tree, leaving_child, e.u);
            let v_in = in_subtree(&tree, leaving_child, e.v);
            if u_in == v_in {
                continue;
            }
            // Correcting direction: edge must point INTO the child subtree
            // (opposite direction of the edges that made the cut negative).
            if !u_in {
                continue;
            }
            let slack = level[e.v] - level[e.u] - e.min_length;
            if slack >= 0 && entering.map_or(true, |(_, best)| slack < best) {
                entering = Some((idx, slack));
            }
        }
        let (entering_idx, slack) = match entering {
            Some(e) => e,
            None => break,
        };

        if slack == 0 {
            stalls += 1;
            if stalls > stall_limit {
                break;
            }
        } else {
            stalls = 0;
        }

        // Shift the leaving child's subtree by `slack` so the entering
        // edge becomes tight, then swap it into the tree.
        if slack != 0 {
            for node in 0..n {
                if in_subtree(&tree, leaving_child, node) {
                    level[node] += slack;
                }
            }
        }
        let e = &edges[entering_idx];
        let (new_child, new_parent) = if in_subtree(&tree, leaving_child, e.u) {
            (e.u, e.v)
        } else {
            (e.v, e.u)
        };
        tree.parent[leaving_child] = None;
        tree.parent_edge[leaving_child] = None;
        tree.parent[new_child] = Some(new_parent);
        tree.parent_edge[new_child] = Some(entering_idx);
        let (low, lim) = dfs_low_lim(n, &tree.parent);
        tree.low = low;
        tree.lim = lim;

        pivots += 1;
    }

    let min = level.iter().copied().min().unwrap_or(0);
    level.iter().map(|&l| (l - min) as u32).collect()
}

/// Build an id lookup for levels keyed by node index, convenience for tests
/// and for callers threading `level[]` alongside node ids.
pub fn levels_by_id(graph: &impl GraphQuery, levels: &[u32]) -> HashMap<u64, u32> {
    (0..graph.node_count())
        .filter_map(|idx| graph.node_at(idx).map(|n| (n.id, levels[idx])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::sugiyama::cycle_break::break_cycles;

    fn chain() -> Graph {
        let mut g = Graph::new();
        g.add_node(0, "a", 1).unwrap();
        g.add_node(1, "b", 1).unwrap();
        g.add_node(2, "c", 1).unwrap();
        g.add_edge(0, 1, true, None).unwrap();
        g.add_edge(1, 2, true, None).unwrap();
        g
    }

    #[test]
    fn longest_path_assigns_increasing_levels() {
        let g = chain();
        let reversed = break_cycles(&g);
        let levels = assign_levels(&g, &reversed, Layering::LongestPath).unwrap();
        assert_eq!(levels, vec![0, 1, 2]);
    }

    #[test]
    fn network_simplex_matches_longest_path_on_a_chain() {
        let g = chain();
        let reversed = break_cycles(&g);
        let levels = assign_levels(&g, &reversed, Layering::NetworkSimplex).unwrap();
        assert_eq!(levels, vec![0, 1, 2]);
    }

    #[test]
    fn skip_level_edge_respects_admissibility() {
        let mut g = Graph::new();
        g.add_node(0, "a", 1).unwrap();
        g.add_node(1, "b", 1).unwrap();
        g.add_node(2, "c", 1).unwrap();
        g.add_edge(0, 1, true, None).unwrap();
        g.add_edge(1, 2, true, None).unwrap();
        g.add_edge(0, 2, true, None).unwrap();
        let reversed = break_cycles(&g);
        let levels = assign_levels(&g, &reversed, Layering::LongestPath).unwrap();
        assert!(levels[1] >= levels[0] + 1);
        assert!(levels[2] >= levels[1] + 1);
        assert!(levels[2] >= levels[0] + 1);
    }

    #[test]
    fn isolated_node_defaults_to_level_zero() {
        let mut g = chain();
        g.add_node(99, "isolated", 1).unwrap();
        let reversed = break_cycles(&g);
        let levels = assign_levels(&g, &reversed, Layering::LongestPath).unwrap();
        assert_eq!(levels[3], 0);
    }
}
