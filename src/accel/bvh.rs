//! Bounding volume hierarchy over a flat slice of leaf objects.
//!
//! Used by [`crate::sdf`] to answer closest-point queries against the
//! (possibly large) triangle set of a mesh without a full linear scan. The
//! tree is built once, bottom-up is not needed: construction is top-down,
//! splitting along the longest axis using the Surface-Area Heuristic.

use crate::accel::aabb::{Aabb, HasAabb};
use crate::core::types::{Number, Point3};
use getset::{CopyGetters, Getters};
use indextree::{Arena, NodeId};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Something a [`Bvh`] can return the closest point on, given a query point.
///
/// Implemented by mesh triangles (for the SDF oracle) and by anything else
/// that needs accelerated closest-point lookups against a static leaf set.
pub trait ClosestPoint {
    /// Returns the closest point on `self` to `query`, and the (unsigned)
    /// distance to it.
    fn closest_point(&self, query: Point3) -> (Point3, Number);
}

#[derive(Getters, CopyGetters, Clone, Debug)]
pub struct Bvh<Leaf: HasAabb> {
    #[get = "pub"]
    arena: Arena<BvhNode<Leaf>>,
    #[get_copy = "pub"]
    root_id: Option<NodeId>,
}

#[derive(Clone, Debug)]
pub enum BvhNode<Leaf: HasAabb> {
    Nested(Aabb),
    Leaf(Leaf),
}

impl<Leaf: HasAabb> HasAabb for BvhNode<Leaf> {
    fn aabb(&self) -> Aabb {
        match self {
            BvhNode::Nested(aabb) => *aabb,
            BvhNode::Leaf(leaf) => leaf.aabb(),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, PartialEq, Eq, Hash)]
enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn coord(self, p: Point3) -> Number {
        match self {
            Axis::X => p.x(),
            Axis::Y => p.y(),
            Axis::Z => p.z(),
        }
    }
}

/// Above this many leaves in a node, we stop splitting and just store them
/// all as direct children; scanning a handful of triangles linearly is
/// cheaper than the extra tree depth.
const MAX_LEAF_SIZE: usize = 4;

impl<Leaf: HasAabb + Clone> Bvh<Leaf> {
    pub fn new(leaves: impl IntoIterator<Item = Leaf>) -> Self {
        let leaves: Vec<Leaf> = leaves.into_iter().collect();
        let mut arena = Arena::with_capacity(leaves.len() * 2);
        let root_id = if leaves.is_empty() {
            None
        } else {
            Some(Self::build(leaves, &mut arena))
        };
        Self { arena, root_id }
    }

    pub fn is_empty(&self) -> bool { self.root_id.is_none() }

    fn build(mut leaves: Vec<Leaf>, arena: &mut Arena<BvhNode<Leaf>>) -> NodeId {
        if leaves.len() == 1 {
            return arena.new_node(BvhNode::Leaf(leaves.remove(0)));
        }
        if leaves.len() <= MAX_LEAF_SIZE {
            let aabb = Aabb::encompass_iter(leaves.iter().map(HasAabb::aabb));
            let node = arena.new_node(BvhNode::Nested(aabb));
            for leaf in leaves {
                node.append_value(BvhNode::Leaf(leaf), arena);
            }
            return node;
        }

        let aabb = Aabb::encompass_iter(leaves.iter().map(HasAabb::aabb));
        let node = arena.new_node(BvhNode::Nested(aabb));

        let split = Self::best_split(&mut leaves);
        let right = leaves.split_off(split);
        let left = leaves;

        let left_id = Self::build(left, arena);
        let right_id = Self::build(right, arena);
        node.append(left_id, arena);
        node.append(right_id, arena);
        node
    }

    /// Chooses the axis and split index minimising the SAH cost
    /// `area(left) * |left| + area(right) * |right|`, sorting the leaves
    /// along the winning axis as a side effect.
    fn best_split(leaves: &mut [Leaf]) -> usize {
        let mut best: Option<(Axis, usize, Number)> = None;

        for axis in Axis::iter() {
            leaves.sort_unstable_by(|a, b| {
                axis.coord(a.aabb().center())
                    .partial_cmp(&axis.coord(b.aabb().center()))
                    .expect("aabb centres should not be nan")
            });

            // Evaluate every split position once sorted along this axis; with
            // MAX_LEAF_SIZE capping the tail case, this stays cheap even for
            // meshes with hundreds of thousands of triangles, since it only
            // runs at build time, once per mesh.
            for split in 1..leaves.len() {
                let (left, right) = leaves.split_at(split);
                let cost = left.len() as Number * Aabb::encompass_iter(left.iter().map(HasAabb::aabb)).area()
                    + right.len() as Number * Aabb::encompass_iter(right.iter().map(HasAabb::aabb)).area();
                let better = match &best {
                    None => true,
                    Some((_, _, best_cost)) => cost < *best_cost,
                };
                if better {
                    best = Some((axis, split, cost));
                }
            }
        }

        let (best_axis, best_split, _) = best.expect("non-empty leaf slice should yield a split");
        leaves.sort_unstable_by(|a, b| {
            best_axis
                .coord(a.aabb().center())
                .partial_cmp(&best_axis.coord(b.aabb().center()))
                .expect("aabb centres should not be nan")
        });
        best_split
    }
}

impl<Leaf: HasAabb + ClosestPoint + Clone> Bvh<Leaf> {
    /// Finds the closest leaf to `query`, using the AABB distance bound to
    /// prune subtrees that can't possibly beat the current best.
    ///
    /// Returns `(leaf, closest point on it, distance)`; `None` only if the
    /// tree is empty.
    pub fn closest_point(&self, query: Point3) -> Option<(Leaf, Point3, Number)> {
        let root = self.root_id?;
        let mut best: Option<(Leaf, Point3, Number)> = None;
        self.visit(root, query, &mut best);
        best
    }

    fn visit(&self, node_id: NodeId, query: Point3, best: &mut Option<(Leaf, Point3, Number)>) {
        let node = self.arena.get(node_id).expect("node id from own arena").get();

        let bound = node.aabb().distance_to_point(query);
        if let Some((_, _, best_dist)) = best {
            if bound >= *best_dist {
                return;
            }
        }

        match node {
            BvhNode::Leaf(leaf) => {
                let (point, dist) = leaf.closest_point(query);
                let improves = match best {
                    Some((_, _, best_dist)) => dist < *best_dist,
                    None => true,
                };
                if improves {
                    *best = Some((leaf.clone(), point, dist));
                }
            }
            BvhNode::Nested(_) => {
                for child in node_id.children(&self.arena) {
                    self.visit(child, query, best);
                }
            }
        }
    }
}
