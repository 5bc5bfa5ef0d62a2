// src/sugiyama/crossing.rs
//! Crossing reduction (spec §4.5). A [`Reducer`] reorders virtual nodes
//! within levels without changing the multiset of nodes per level; a
//! [`Pipeline`] runs a sequence of them, snapshotting the level structure
//! around each call so a buggy (or user-supplied) reducer is caught rather
//! than silently corrupting the layout — grounded in the design note's
//! "trait/interface + closure pair, not inheritance" guidance, and in the
//! teacher's multi-pass `minimize_crossings`/`sort_layer_by_barycenter`
//! (forward/backward sweep shape), generalized from "barycenter of
//! connected nodes" to the spec's explicit median/adjacent-exchange pair.

use crate::error::{LayoutCoreError, Result};
use crate::graph::GraphQuery;
use crate::sugiyama::cycle_break::effective_endpoints;
use crate::sugiyama::VNode;
use std::collections::HashMap;
use std::sync::Arc;

/// Precomputed level-to-level connectivity: `down[(level, v)]` lists `v`'s
/// neighbours one level below; `up` the symmetric view one level above.
/// Built once per crossing-reduction call; independent of in-level order,
/// so every reducer pass rebuilds only its own per-sweep position map.
pub struct Adjacency {
    down: HashMap<(u32, VNode), Vec<VNode>>,
    up: HashMap<(u32, VNode), Vec<VNode>>,
}

impl Adjacency {
    pub fn build(graph: &impl GraphQuery, levels: &[u32], reversed: &[bool]) -> Self {
        let mut down: HashMap<(u32, VNode), Vec<VNode>> = HashMap::new();
        let mut up: HashMap<(u32, VNode), Vec<VNode>> = HashMap::new();

        for (edge_idx, e) in graph.edges().iter().enumerate() {
            let (eff_source, eff_target) =
                effective_endpoints(e.source_idx, e.target_idx, edge_idx, reversed);
            let lo = levels[eff_source];
            let hi = levels[eff_target];
            if hi <= lo {
                continue;
            }
            let mut chain = vec![(lo, VNode::Real(eff_source))];
            for l in (lo + 1)..hi {
                chain.push((l, VNode::Dummy(edge_idx, l)));
            }
            chain.push((hi, VNode::Real(eff_target)));
            for pair in chain.windows(2) {
                let (l1, v1) = pair[0];
                let (l2, v2) = pair[1];
                down.entry((l1, v1)).or_default().push(v2);
                up.entry((l2, v2)).or_default().push(v1);
            }
        }
        Adjacency { down, up }
    }

    pub(crate) fn neighbors_up(&self, level: u32, v: VNode) -> &[VNode] {
        self.up.get(&(level, v)).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub(crate) fn neighbors_down(&self, level: u32, v: VNode) -> &[VNode] {
        self.down
            .get(&(level, v))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

/// A crossing-reduction step: reorders `virtual_levels` in place. Built-ins
/// are concrete implementations; [`ReducerSpec::Custom`] wraps a
/// caller-supplied closure (design note: "trait/interface + closure pair").
pub trait Reducer {
    fn apply(&self, virtual_levels: &mut [Vec<VNode>], adjacency: &Adjacency);
}

/// Median heuristic (spec §4.5). `passes` full top-down + bottom-up sweeps;
/// each sweep re-sorts every level by the median position of its
/// neighbours in the adjacent (already-fixed) level, keeping nodes with no
/// connections at their current position.
pub struct MedianHeuristic {
    pub passes: u32,
}

impl Reducer for MedianHeuristic {
    fn apply(&self, virtual_levels: &mut [Vec<VNode>], adjacency: &Adjacency) {
        let level_count = virtual_levels.len();
        if level_count == 0 {
            return;
        }
        for _ in 0..self.passes {
            for l in 1..level_count {
                sweep_median(virtual_levels, adjacency, l as u32, true);
            }
            for l in (0..level_count.saturating_sub(1)).rev() {
                sweep_median(virtual_levels, adjacency, l as u32, false);
            }
        }
    }
}

fn sweep_median(
    virtual_levels: &mut [Vec<VNode>],
    adjacency: &Adjacency,
    level: u32,
    top_down: bool,
) {
    let reference_level = if top_down { level - 1 } else { level + 1 };
    let reference = virtual_levels[reference_level as usize].clone();
    let pos_map: HashMap<VNode, usize> = reference
        .iter()
        .enumerate()
        .map(|(i, &v)| (v, i))
        .collect();

    let current = &virtual_levels[level as usize];
    let mut scored: Vec<(VNode, f64)> = current
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let neighbors = if top_down {
                adjacency.neighbors_up(level, v)
            } else {
                adjacency.neighbors_down(level, v)
            };
            let mut positions: Vec<f64> = neighbors
                .iter()
                .filter_map(|n| pos_map.get(n).map(|&p| p as f64))
                .collect();
            let median = if positions.is_empty() {
                i as f64
            } else {
                positions.sort_by(|a, b| a.partial_cmp(b).unwrap());
                let mid = positions.len() / 2;
                if positions.len() % 2 == 1 {
                    positions[mid]
                } else {
                    (positions[mid - 1] + positions[mid]) / 2.0
                }
            };
            (v, median)
        })
        .collect();

    scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
    virtual_levels[level as usize] = scored.into_iter().map(|(v, _)| v).collect();
}

/// Adjacent-exchange heuristic (spec §4.5). Levels of width `2..20` only;
/// repeatedly swaps neighbouring pairs whose swap reduces the pairwise
/// crossing count against a fixed adjacent level, stopping after a pass
/// with no swaps or `2 * width` iterations.
pub struct AdjacentExchange {
    pub passes: u32,
}

impl Reducer for AdjacentExchange {
    fn apply(&self, virtual_levels: &mut [Vec<VNode>], adjacency: &Adjacency) {
        let level_count = virtual_levels.len();
        for _ in 0..self.passes {
            for l in 0..level_count {
                sweep_exchange(virtual_levels, adjacency, l as u32, true);
            }
            for l in (0..level_count).rev() {
                sweep_exchange(virtual_levels, adjacency, l as u32, false);
            }
        }
    }
}

fn sweep_exchange(
    virtual_levels: &mut [Vec<VNode>],
    adjacency: &Adjacency,
    level: u32,
    top_down: bool,
) {
    let width = virtual_levels[level as usize].len();
    if !(2..20).contains(&width) {
        return;
    }
    let reference_level = if top_down {
        if level == 0 {
            return;
        }
        level - 1
    } else {
        if level as usize + 1 >= virtual_levels.len() {
            return;
        }
        level + 1
    };
    let reference = virtual_levels[reference_level as usize].clone();
    let pos_map: HashMap<VNode, usize> = reference
        .iter()
        .enumerate()
        .map(|(i, &v)| (v, i))
        .collect();

    let neighbor_positions = |adjacency: &Adjacency, v: VNode| -> Vec<usize> {
        let ns = if top_down {
            adjacency.neighbors_up(level, v)
        } else {
            adjacency.neighbors_down(level, v)
        };
        ns.iter().filter_map(|n| pos_map.get(n).copied()).collect()
    };

    let mut iterations = 0usize;
    let max_iterations = 2 * width;
    loop {
        let mut swapped = false;
        for i in 0..width - 1 {
            let a = virtual_levels[level as usize][i];
            let b = virtual_levels[level as usize][i + 1];
            let pa = neighbor_positions(adjacency, a);
            let pb = neighbor_positions(adjacency, b);
            let current_crossings = count_inversions(&pa, &pb);
            let swapped_crossings = count_inversions(&pb, &pa);
            if swapped_crossings < current_crossings {
                virtual_levels[level as usize].swap(i, i + 1);
                swapped = true;
            }
        }
        iterations += 1;
        if !swapped || iterations >= max_iterations {
            break;
        }
    }
}

fn count_inversions(left: &[usize], right: &[usize]) -> usize {
    let mut count = 0;
    for &pl in left {
        for &pr in right {
            if pl > pr {
                count += 1;
            }
        }
    }
    count
}

/// Config-facing description of a reducer step (spec §4.1's
/// `crossing_reducers: [Reducer]`). Kept separate from the [`Reducer`]
/// trait so presets and `Config` can be `Clone`d cheaply.
#[derive(Clone)]
pub enum ReducerSpec {
    Median { passes: u32 },
    AdjacentExchange { passes: u32 },
    /// A caller-supplied reducer plus its opaque context, captured by the
    /// closure itself (design note: validation snapshots are by value, so
    /// this is safe even if the closure reallocates its own state).
    Custom(Arc<dyn Fn(&mut [Vec<VNode>], &Adjacency) + Send + Sync>),
}

impl std::fmt::Debug for ReducerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReducerSpec::Median { passes } => {
                f.debug_struct("Median").field("passes", passes).finish()
            }
            ReducerSpec::AdjacentExchange { passes } => f
                .debug_struct("AdjacentExchange")
                .field("passes", passes)
                .finish(),
            ReducerSpec::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl ReducerSpec {
    fn apply(&self, virtual_levels: &mut [Vec<VNode>], adjacency: &Adjacency) {
        match self {
            ReducerSpec::Median { passes } => {
                MedianHeuristic { passes: *passes }.apply(virtual_levels, adjacency)
            }
            ReducerSpec::AdjacentExchange { passes } => {
                AdjacentExchange { passes: *passes }.apply(virtual_levels, adjacency)
            }
            ReducerSpec::Custom(f) => f(virtual_levels, adjacency),
        }
    }
}

/// Named presets (spec §4.5): `none = []`, `fast = [median(2)]`,
/// `balanced = [median(4), exchange(2)]`,
/// `quality = [median(8), exchange(4), median(2)]`.
pub fn preset_none() -> Vec<ReducerSpec> {
    Vec::new()
}

pub fn preset_fast() -> Vec<ReducerSpec> {
    vec![ReducerSpec::Median { passes: 2 }]
}

pub fn preset_balanced() -> Vec<ReducerSpec> {
    vec![
        ReducerSpec::Median { passes: 4 },
        ReducerSpec::AdjacentExchange { passes: 2 },
    ]
}

pub fn preset_quality() -> Vec<ReducerSpec> {
    vec![
        ReducerSpec::Median { passes: 8 },
        ReducerSpec::AdjacentExchange { passes: 4 },
        ReducerSpec::Median { passes: 2 },
    ]
}

struct Snapshot {
    level_count: usize,
    per_level_counts: Vec<usize>,
    total: usize,
    multiset: HashMap<VNode, u32>,
}

impl Snapshot {
    fn capture(virtual_levels: &[Vec<VNode>]) -> Self {
        let per_level_counts: Vec<usize> = virtual_levels.iter().map(|l| l.len()).collect();
        let total = per_level_counts.iter().sum();
        let mut multiset: HashMap<VNode, u32> = HashMap::new();
        for level in virtual_levels {
            for &v in level {
                *multiset.entry(v).or_insert(0) += 1;
            }
        }
        Snapshot {
            level_count: virtual_levels.len(),
            per_level_counts,
            total,
            multiset,
        }
    }

    fn verify(&self, virtual_levels: &[Vec<VNode>]) -> Result<()> {
        if virtual_levels.len() != self.level_count {
            return Err(LayoutCoreError::ReducerCorruptedLevels);
        }
        let new_per_level: Vec<usize> = virtual_levels.iter().map(|l| l.len()).collect();
        let new_total: usize = new_per_level.iter().sum();
        if new_total < self.total {
            return Err(LayoutCoreError::ReducerLostNode);
        }
        let mut new_multiset: HashMap<VNode, u32> = HashMap::new();
        for level in virtual_levels {
            for &v in level {
                *new_multiset.entry(v).or_insert(0) += 1;
            }
        }
        for (v, count) in &new_multiset {
            if *count > self.multiset.get(v).copied().unwrap_or(0) {
                return Err(LayoutCoreError::ReducerDuplicateNode);
            }
        }
        if new_per_level != self.per_level_counts {
            return Err(LayoutCoreError::ReducerNodeCountMismatch);
        }
        Ok(())
    }
}

/// Runs an ordered list of reducers against `virtual_levels`, verifying the
/// level-structure contract around each one (spec §4.5).
pub struct Pipeline {
    reducers: Vec<ReducerSpec>,
}

impl Pipeline {
    pub fn new(reducers: Vec<ReducerSpec>) -> Self {
        Pipeline { reducers }
    }

    pub fn run(
        &self,
        graph: &impl GraphQuery,
        levels: &[u32],
        reversed: &[bool],
        virtual_levels: &mut Vec<Vec<VNode>>,
    ) -> Result<()> {
        let adjacency = Adjacency::build(graph, levels, reversed);
        for reducer in &self.reducers {
            let snapshot = Snapshot::capture(virtual_levels);
            reducer.apply(virtual_levels, &adjacency);
            snapshot.verify(virtual_levels)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    fn diamond() -> Graph {
        let mut g = Graph::new();
        g.add_node(0, "a", 1).unwrap();
        g.add_node(1, "b", 1).unwrap();
        g.add_node(2, "c", 1).unwrap();
        g.add_node(3, "d", 1).unwrap();
        g.add_edge(0, 1, true, None).unwrap();
        g.add_edge(0, 2, true, None).unwrap();
        g.add_edge(1, 3, true, None).unwrap();
        g.add_edge(2, 3, true, None).unwrap();
        g
    }

    #[test]
    fn median_preserves_level_multiset() {
        let g = diamond();
        let levels = vec![0u32, 1, 1, 2];
        let reversed = vec![false; 4];
        let mut vls = vec![
            vec![VNode::Real(0)],
            vec![VNode::Real(1), VNode::Real(2)],
            vec![VNode::Real(3)],
        ];
        let pipeline = Pipeline::new(preset_balanced());
        pipeline.run(&g, &levels, &reversed, &mut vls).unwrap();
        assert_eq!(vls.len(), 3);
        assert_eq!(vls[1].len(), 2);
    }

    #[test]
    fn preset_sizes_match_spec() {
        assert_eq!(preset_none().len(), 0);
        assert_eq!(preset_fast().len(), 1);
        assert_eq!(preset_balanced().len(), 2);
        assert_eq!(preset_quality().len(), 3);
    }

    #[test]
    fn custom_reducer_that_drops_a_node_is_rejected() {
        let g = diamond();
        let levels = vec![0u32, 1, 1, 2];
        let reversed = vec![false; 4];
        let mut vls = vec![
            vec![VNode::Real(0)],
            vec![VNode::Real(1), VNode::Real(2)],
            vec![VNode::Real(3)],
        ];
        let buggy: Arc<dyn Fn(&mut [Vec<VNode>], &Adjacency) + Send + Sync> =
            Arc::new(|vls: &mut [Vec<VNode>], _: &Adjacency| {
                vls[1].pop();
            });
        let pipeline = Pipeline::new(vec![ReducerSpec::Custom(buggy)]);
        let err = pipeline.run(&g, &levels, &reversed, &mut vls).unwrap_err();
        assert_eq!(err.code(), "E.Layout.Reducer.001");
    }
}
