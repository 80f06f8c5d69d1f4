//! k-d tree over a static point cloud, for nearest-neighbour queries.
//!
//! Used by point-to-plane ICP (closest reference point per source sample)
//! and by normal/FPFH estimation (k-nearest-neighbour radius search). Built
//! once per cloud and queried many times, so a simple median-split static
//! tree (no rebalancing) is the right trade-off.

use crate::core::types::{Number, Point3};

#[derive(Clone, Debug)]
pub struct KdTree {
    nodes: Vec<Node>,
}

#[derive(Clone, Debug)]
struct Node {
    point: Point3,
    /// Index of this point in the original input slice, so callers can
    /// look up associated data (normals, fpfh, ...).
    index: usize,
    axis: u8,
    left: Option<usize>,
    right: Option<usize>,
}

impl KdTree {
    pub fn build(points: &[Point3]) -> Self {
        let mut items: Vec<(usize, Point3)> = points.iter().copied().enumerate().collect();
        let mut nodes = Vec::with_capacity(points.len());
        if !items.is_empty() {
            Self::build_recursive(&mut items, 0, &mut nodes);
        }
        Self { nodes }
    }

    /// Builds the subtree for `items`, appending nodes to `nodes` and
    /// returning the index of the subtree root within `nodes`.
    fn build_recursive(items: &mut [(usize, Point3)], depth: usize, nodes: &mut Vec<Node>) -> usize {
        let axis = (depth % 3) as u8;
        items.sort_unstable_by(|a, b| {
            Self::coord(a.1, axis)
                .partial_cmp(&Self::coord(b.1, axis))
                .expect("point coordinates should not be nan")
        });

        let mid = items.len() / 2;
        let (index, point) = items[mid];

        let node_idx = nodes.len();
        nodes.push(Node { point, index, axis, left: None, right: None });

        let (left_items, rest) = items.split_at_mut(mid);
        let right_items = &mut rest[1..];

        let left = if !left_items.is_empty() {
            Some(Self::build_recursive(left_items, depth + 1, nodes))
        } else {
            None
        };
        let right = if !right_items.is_empty() {
            Some(Self::build_recursive(right_items, depth + 1, nodes))
        } else {
            None
        };

        nodes[node_idx].left = left;
        nodes[node_idx].right = right;
        node_idx
    }

    fn coord(p: Point3, axis: u8) -> Number {
        match axis {
            0 => p.x(),
            1 => p.y(),
            _ => p.z(),
        }
    }

    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    /// Returns `(index into the original points slice, squared distance)`
    /// of the nearest point to `query`.
    ///
    /// `None` only when the tree was built from an empty slice.
    pub fn nearest(&self, query: Point3) -> Option<(usize, Number)> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut best: Option<(usize, Number)> = None;
        self.visit(0, query, &mut best);
        best
    }

    /// Returns up to `k` nearest neighbours, sorted by increasing squared
    /// distance. Implemented as a linear-scan partial sort over a recursive
    /// collection pass; adequate for the modest (`k` in the tens) neighbour
    /// counts used by normal estimation and FPFH.
    pub fn k_nearest(&self, query: Point3, k: usize) -> Vec<(usize, Number)> {
        if self.nodes.is_empty() || k == 0 {
            return Vec::new();
        }
        let mut found = Vec::new();
        self.collect_all(0, query, &mut found);
        found.sort_unstable_by(|a, b| a.1.partial_cmp(&b.1).expect("distances should not be nan"));
        found.truncate(k);
        found
    }

    /// Returns all points within `radius` of `query`, sorted by increasing
    /// squared distance.
    pub fn radius_search(&self, query: Point3, radius: Number) -> Vec<(usize, Number)> {
        let r2 = radius * radius;
        let mut found = Vec::new();
        if !self.nodes.is_empty() {
            self.collect_all(0, query, &mut found);
        }
        found.retain(|(_, d2)| *d2 <= r2);
        found.sort_unstable_by(|a, b| a.1.partial_cmp(&b.1).expect("distances should not be nan"));
        found
    }

    fn collect_all(&self, node_idx: usize, query: Point3, out: &mut Vec<(usize, Number)>) {
        let node = &self.nodes[node_idx];
        let d2 = (node.point - query).length_squared();
        out.push((node.index, d2));
        if let Some(left) = node.left {
            self.collect_all(left, query, out);
        }
        if let Some(right) = node.right {
            self.collect_all(right, query, out);
        }
    }

    fn visit(&self, node_idx: usize, query: Point3, best: &mut Option<(usize, Number)>) {
        let node = &self.nodes[node_idx];
        let d2 = (node.point - query).length_squared();
        let improves = match best {
            Some((_, best_d2)) => d2 < *best_d2,
            None => true,
        };
        if improves {
            *best = Some((node.index, d2));
        }

        let axis_delta = KdTree::coord(query, node.axis) - KdTree::coord(node.point, node.axis);
        let (near, far) = if axis_delta <= 0.0 { (node.left, node.right) } else { (node.right, node.left) };

        if let Some(near) = near {
            self.visit(near, query, best);
        }
        if let Some(far) = far {
            let prune = match best {
                Some((_, best_d2)) => axis_delta * axis_delta >= *best_d2,
                None => false,
            };
            if !prune {
                self.visit(far, query, best);
            }
        }
    }
}
