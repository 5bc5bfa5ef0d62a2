// src/force/simulation.rs
//! The Fruchterman-Reingold fixed-point simulation (spec §4.8): grid(+jitter)
//! initialisation, a per-iteration force loop (repulsion, attraction,
//! optional gravity, cooling), and post-loop normalisation. Grounded in the
//! teacher's `ForceLayout::layout` (init positions -> iterate -> normalise
//! shape), rebuilt entirely on `Fixed` arithmetic per the spec's bit-exact
//! contract — the teacher's version runs on `f64` throughout, which this
//! crate only keeps for Sugiyama's positioning phase (spec §9).

use crate::config::{FrParams, FrVariant, GravityKind};
use crate::fixed::{dist, Fixed, Point};
use crate::force::prng::Rng;
use crate::force::quadtree::{self, QuadTree};
use crate::graph::GraphQuery;

/// Place `n` bodies on a `ceil(sqrt(n)) x ceil(sqrt(n))` grid with `spacing`
/// gap between cells (spec §4.8 "Initialisation").
pub fn init_grid(n: usize, spacing: Fixed) -> Vec<Point> {
    if n == 0 {
        return Vec::new();
    }
    let side = (n as f64).sqrt().ceil() as i64;
    let side = side.max(1);
    (0..n)
        .map(|i| {
            let row = (i as i64) / side;
            let col = (i as i64) % side;
            Point::new(
                spacing * Fixed::from_int(col as i32),
                spacing * Fixed::from_int(row as i32),
            )
        })
        .collect()
}

/// Grid placement plus a seeded pseudo-random displacement in
/// `[-spacing/4, +spacing/4]` on each axis (spec §4.8). Bit-exact for a
/// given seed across platforms since [`Rng`] is pure integer arithmetic.
pub fn init_grid_jitter(n: usize, spacing: Fixed, seed: u64) -> Vec<Point> {
    let mut positions = init_grid(n, spacing);
    let mut rng = Rng::new(seed);
    let quarter = spacing.to_bits() / 4;
    for p in positions.iter_mut() {
        let jx = rng.next_signed(quarter as i64);
        let jy = rng.next_signed(quarter as i64);
        p.x = p.x.saturating_add(Fixed::from_bits(jx as i32));
        p.y = p.y.saturating_add(Fixed::from_bits(jy as i32));
    }
    positions
}

fn percent(p: u32) -> Fixed {
    Fixed::from_int(p as i32) / Fixed::from_int(100)
}

/// Run the full fixed-point simulation against `graph` with `params`,
/// returning the final body positions (spec §4.8 "Per-iteration loop").
pub fn simulate(graph: &impl GraphQuery, variant: FrVariant, params: &FrParams) -> Vec<Point> {
    let n = graph.node_count();
    let spacing = Fixed::from_int(params.k.max(1) as i32);
    let mut positions = init_grid_jitter(n, spacing, params.seed);
    if n == 0 {
        return positions;
    }

    let k = Fixed::from_int(params.k.max(1) as i32);
    let k_squared = k.saturating_mul(k);
    let theta = percent(params.theta_percent);
    let decay = percent(params.decay_percent);
    // milli is thousandths (10 == 0.010); converted to raw Q16.16 bits as
    // milli * 65536 / 1000, entirely in integer arithmetic.
    let min_displacement =
        Fixed::from_bits(((params.min_displacement_milli as i64) * 65536 / 1000) as i32);
    let mut temperature = k;

    let center = centroid(&positions);

    for _ in 0..params.max_iterations {
        let mut forces = vec![Point::ZERO; n];

        apply_repulsion(&positions, variant, k_squared, theta, &mut forces);
        apply_attraction(graph, &positions, k, params.lin_log_attraction, &mut forces);
        if let Some(gravity) = params.gravity {
            apply_gravity(&positions, center, gravity, &mut forces);
        }

        let mut max_displacement = Fixed::ZERO;
        for i in 0..n {
            let f = forces[i];
            let magnitude = dist(f.x, f.y);
            if magnitude.to_bits() == 0 {
                continue;
            }
            let clamp = if magnitude < temperature { magnitude } else { temperature };
            let ux = f.x / magnitude;
            let uy = f.y / magnitude;
            let dx = ux * clamp;
            let dy = uy * clamp;
            positions[i] = positions[i] + Point::new(dx, dy);
            if clamp > max_displacement {
                max_displacement = clamp;
            }
        }

        temperature = temperature.saturating_mul(decay);
        if max_displacement < min_displacement {
            break;
        }
    }

    normalize(&mut positions, spacing);
    positions
}

fn centroid(positions: &[Point]) -> Point {
    if positions.is_empty() {
        return Point::ZERO;
    }
    let mut sx = Fixed::ZERO;
    let mut sy = Fixed::ZERO;
    for p in positions {
        sx = sx.saturating_add(p.x);
        sy = sy.saturating_add(p.y);
    }
    let count = Fixed::from_int(positions.len() as i32);
    Point::new(sx / count, sy / count)
}

fn apply_repulsion(
    positions: &[Point],
    variant: FrVariant,
    k_squared: Fixed,
    theta: Fixed,
    forces: &mut [Point],
) {
    match variant {
        FrVariant::Exact => {
            let n = positions.len();
            for i in 0..n {
                for j in (i + 1)..n {
                    let dx = positions[i].x - positions[j].x;
                    let dy = positions[i].y - positions[j].y;
                    let d = dist(dx, dy);
                    if d < 2 {
                        continue;
                    }
                    let magnitude = k_squared / d;
                    let fx = magnitude * dx / d;
                    let fy = magnitude * dy / d;
                    forces[i] = forces[i] + Point::new(fx, fy);
                    forces[j] = forces[j] - Point::new(fx, fy);
                }
            }
        }
        FrVariant::BarnesHut => {
            let tree = QuadTree::build(positions);
            for (i, &p) in positions.iter().enumerate() {
                forces[i] = forces[i] + tree.repulsion_force(i, p, k_squared, theta);
            }
        }
    }
}

fn apply_attraction(
    graph: &impl GraphQuery,
    positions: &[Point],
    k: Fixed,
    lin_log: bool,
    forces: &mut [Point],
) {
    let n = positions.len();
    for u in 0..n {
        for &v in graph.children(u) {
            if v >= n {
                continue;
            }
            let dx = positions[v].x - positions[u].x;
            let dy = positions[v].y - positions[u].y;
            let d = dist(dx, dy);
            if d.to_bits() == 0 {
                continue;
            }
            let softened = if lin_log {
                // log(1+d) ~= 2d / (2+d) (spec §4.8).
                let two = Fixed::from_int(2);
                (two * d) / (two + d)
            } else {
                d
            };
            let magnitude = softened / k;
            let fx = magnitude * dx / d;
            let fy = magnitude * dy / d;
            forces[u] = forces[u] + Point::new(fx, fy);
            forces[v] = forces[v] - Point::new(fx, fy);
        }
    }
}

fn apply_gravity(positions: &[Point], center: Point, gravity: GravityKind, forces: &mut [Point]) {
    for (i, &p) in positions.iter().enumerate() {
        let dx = center.x - p.x;
        let dy = center.y - p.y;
        let d = dist(dx, dy);
        if d.to_bits() == 0 {
            continue;
        }
        let magnitude = match gravity {
            GravityKind::Linear { strength_percent } => percent(strength_percent) * d,
            GravityKind::Strong { strength_percent } => percent(strength_percent),
        };
        let fx = magnitude * dx / d;
        let fy = magnitude * dy / d;
        forces[i] = forces[i] + Point::new(fx, fy);
    }
}

/// Shift positions so the minimum x/y equals `margin` (spec §4.8
/// "Normalisation").
fn normalize(positions: &mut [Point], margin: Fixed) {
    if positions.is_empty() {
        return;
    }
    let mut min_x = positions[0].x;
    let mut min_y = positions[0].y;
    for p in positions.iter() {
        if p.x < min_x {
            min_x = p.x;
        }
        if p.y < min_y {
            min_y = p.y;
        }
    }
    let dx = margin - min_x;
    let dy = margin - min_y;
    for p in positions.iter_mut() {
        p.x = p.x.saturating_add(dx);
        p.y = p.y.saturating_add(dy);
    }
}

/// Re-exported for callers that want to reuse the exact-pass formula
/// directly (e.g. property tests comparing exact vs Barnes-Hut).
pub fn exact_repulsion_between(a: Point, b: Point, k_squared: Fixed) -> Point {
    let mut force = Point::ZERO;
    quadtree::accumulate_force(a, b, 1, k_squared, &mut force);
    force
}
