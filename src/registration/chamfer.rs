//! Symmetric Chamfer distance between two point clouds (component C6).

use crate::accel::kdtree::KdTree;
use crate::core::types::Number;
use crate::sample::PointCloud;

/// Returned when either cloud is empty, in place of an undefined mean.
pub const EMPTY_CLOUD_SENTINEL: Number = 1e9;

/// `mean_{a in A} d(a, B) + mean_{b in B} d(b, A)`, each half computed via a
/// k-d tree nearest-neighbour query.
pub fn chamfer_distance(a: &PointCloud, b: &PointCloud) -> Number {
    if a.is_empty() || b.is_empty() {
        return EMPTY_CLOUD_SENTINEL;
    }

    let tree_a = KdTree::build(&a.points);
    let tree_b = KdTree::build(&b.points);

    let mean_a_to_b = mean_nearest_distance(&a.points, &tree_b);
    let mean_b_to_a = mean_nearest_distance(&b.points, &tree_a);

    mean_a_to_b + mean_b_to_a
}

fn mean_nearest_distance(points: &[crate::core::types::Point3], tree: &KdTree) -> Number {
    let sum: Number = points
        .iter()
        .map(|&p| tree.nearest(p).map(|(_, d2)| d2.sqrt()).unwrap_or(0.0))
        .sum();
    sum / points.len() as Number
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Point3;
    use approx::assert_relative_eq;

    #[test]
    fn identical_clouds_have_zero_chamfer() {
        let cloud = PointCloud::from_points(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]);
        assert_relative_eq!(chamfer_distance(&cloud, &cloud), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_cloud_returns_sentinel() {
        let empty = PointCloud::default();
        let cloud = PointCloud::from_points(vec![Point3::new(0.0, 0.0, 0.0)]);
        assert_relative_eq!(chamfer_distance(&empty, &cloud), EMPTY_CLOUD_SENTINEL);
    }
}
