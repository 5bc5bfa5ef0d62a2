// src/force/quadtree.rs
//! Barnes-Hut quadtree acceleration structure (spec §4.8). Pure Q16.16
//! arithmetic throughout — no floating point — so a repulsion walk against
//! this tree is as deterministic as the exact O(V^2) pass it approximates.

use crate::fixed::{dist, Fixed, Point};

pub const MAX_DEPTH: u32 = 24;

#[derive(Clone, Copy)]
struct Region {
    center: Point,
    half_size: Fixed,
}

enum Node {
    Empty,
    Leaf { body: usize, position: Point },
    Internal {
        mass: u32,
        center_of_mass: Point,
        children: Box<[Node; 4]>,
    },
}

/// A Barnes-Hut quadtree built over a fixed snapshot of body positions.
/// Insertion is recursive; a leaf holding one body subdivides into four
/// children (NW/NE/SW/SE) when a second body arrives, up to `MAX_DEPTH`
/// (spec §4.8).
pub struct QuadTree {
    root: Node,
    half_size: Fixed,
}

impl QuadTree {
    /// Build a tree whose bounding square is 10%-inflated around the
    /// bounding box of `positions` (spec §4.8).
    pub fn build(positions: &[Point]) -> Self {
        let (min_x, max_x, min_y, max_y) = bounding_box(positions);
        let width = (max_x - min_x).abs().max(Fixed::ONE);
        let height = (max_y - min_y).abs().max(Fixed::ONE);
        let span = width.max(height);
        let tenth = span / Fixed::from_int(10);
        let half_size = span / Fixed::from_int(2) + tenth;
        let center = Point::new(
            (min_x + max_x) / Fixed::from_int(2),
            (min_y + max_y) / Fixed::from_int(2),
        );

        let region = Region { center, half_size };
        let mut tree = QuadTree {
            root: Node::Empty,
            half_size,
        };
        for (idx, &p) in positions.iter().enumerate() {
            Self::insert_into(&mut tree.root, region, idx, p, 0);
        }
        tree
    }

    fn insert_into(node: &mut Node, region: Region, body: usize, position: Point, depth: u32) {
        match node {
            Node::Empty => {
                *node = Node::Leaf { body, position };
            }
            Node::Leaf {
                body: existing_body,
                position: existing_position,
            } => {
                let existing_body = *existing_body;
                let existing_position = *existing_position;
                if depth >= MAX_DEPTH {
                    // Depth exhausted: fold both bodies into one point
                    // rather than recursing forever on coincident inputs.
                    *node = Node::Internal {
                        mass: 2,
                        center_of_mass: midpoint(existing_position, position),
                        children: Box::new([Node::Empty, Node::Empty, Node::Empty, Node::Empty]),
                    };
                    return;
                }
                let mut children = [Node::Empty, Node::Empty, Node::Empty, Node::Empty];
                let (idx1, region1) = child_region(&region, existing_position);
                Self::insert_into(&mut children[idx1], region1, existing_body, existing_position, depth + 1);
                let (idx2, region2) = child_region(&region, position);
                Self::insert_into(&mut children[idx2], region2, body, position, depth + 1);
                *node = Node::Internal {
                    mass: 2,
                    center_of_mass: midpoint(existing_position, position),
                    children: Box::new(children),
                };
            }
            Node::Internal {
                mass,
                center_of_mass,
                children,
            } => {
                let new_mass = *mass + 1;
                let old_total = Fixed::from_int(*mass as i32);
                let new_total = Fixed::from_int(new_mass as i32);
                let new_cx = (center_of_mass.x * old_total + position.x) / new_total;
                let new_cy = (center_of_mass.y * old_total + position.y) / new_total;
                *center_of_mass = Point::new(new_cx, new_cy);
                *mass = new_mass;
                let (idx, child_region_value) = child_region(&region, position);
                Self::insert_into(&mut children[idx], child_region_value, body, position, depth + 1);
            }
        }
    }

    /// Sum the repulsive force on `query` from every other body in the
    /// tree, opening cells whose size/distance ratio is below `theta` and
    /// treating everything else as a point mass at its centre of mass
    /// (spec §4.8).
    pub fn repulsion_force(&self, query_idx: usize, query: Point, k_squared: Fixed, theta: Fixed) -> Point {
        let mut force = Point::ZERO;
        Self::walk(&self.root, self.half_size, query_idx, query, k_squared, theta, &mut force);
        force
    }

    #[allow(clippy::too_many_arguments)]
    fn walk(
        node: &Node,
        cell_size: Fixed,
        query_idx: usize,
        query: Point,
        k_squared: Fixed,
        theta: Fixed,
        force: &mut Point,
    ) {
        match node {
            Node::Empty => {}
            Node::Leaf { body, position } => {
                if *body == query_idx {
                    return;
                }
                accumulate_force(query, *position, 1, k_squared, force);
            }
            Node::Internal {
                center_of_mass,
                mass,
                children,
            } => {
                let dx = query.x - center_of_mass.x;
                let dy = query.y - center_of_mass.y;
                let d = dist(dx, dy);
                if d < 2 {
                    return;
                }
                if cell_size / d < theta || *mass <= 1 {
                    accumulate_force(query, *center_of_mass, *mass, k_squared, force);
                    return;
                }
                let half = cell_size / Fixed::from_int(2);
                for child in children.iter() {
                    Self::walk(child, half, query_idx, query, k_squared, theta, force);
                }
            }
        }
    }
}

fn child_region(region: &Region, p: Point) -> (usize, Region) {
    let half = region.half_size / Fixed::from_int(2);
    let east = p.x > region.center.x;
    let south = p.y > region.center.y;
    let (idx, dx, dy): (usize, i32, i32) = match (east, south) {
        (false, false) => (0, -1, -1), // NW
        (true, false) => (1, 1, -1),   // NE
        (false, true) => (2, -1, 1),   // SW
        (true, true) => (3, 1, 1),     // SE
    };
    let cx = region.center.x + half * Fixed::from_int(dx);
    let cy = region.center.y + half * Fixed::from_int(dy);
    (
        idx,
        Region {
            center: Point::new(cx, cy),
            half_size: half,
        },
    )
}

fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / Fixed::from_int(2), (a.y + b.y) / Fixed::from_int(2))
}

fn bounding_box(positions: &[Point]) -> (Fixed, Fixed, Fixed, Fixed) {
    if positions.is_empty() {
        return (Fixed::ZERO, Fixed::ONE, Fixed::ZERO, Fixed::ONE);
    }
    let mut min_x = positions[0].x;
    let mut max_x = positions[0].x;
    let mut min_y = positions[0].y;
    let mut max_y = positions[0].y;
    for p in &positions[1..] {
        if p.x < min_x {
            min_x = p.x;
        }
        if p.x > max_x {
            max_x = p.x;
        }
        if p.y < min_y {
            min_y = p.y;
        }
        if p.y > max_y {
            max_y = p.y;
        }
    }
    (min_x, max_x, min_y, max_y)
}

pub(crate) fn accumulate_force(query: Point, other: Point, mass: u32, k_squared: Fixed, force: &mut Point) {
    let dx = query.x - other.x;
    let dy = query.y - other.y;
    let d = dist(dx, dy);
    if d < 2 {
        return;
    }
    let magnitude = k_squared * Fixed::from_int(mass as i32) / d;
    let fx = magnitude * dx / d;
    let fy = magnitude * dy / d;
    *force = Point::new(force.x + fx, force.y + fy);
}
