//! Per-point normal estimation (component C3a).

use crate::accel::kdtree::KdTree;
use crate::core::types::{Number, Point3, Vector3};
use crate::feature::pca::{covariance, eigen_symmetric_3x3};

/// Up to this many neighbours are used for the plane fit, even if more lie
/// within `radius`.
const MAX_NEIGHBOURS: usize = 60;

/// Below this many neighbours a normal can't be fit; the estimate at that
/// point is left undefined.
const MIN_NEIGHBOURS_FOR_FIT: usize = 3;

/// Estimates a unit normal per point, by fitting a plane (smallest-eigenvalue
/// eigenvector of the local covariance) to up to [`MAX_NEIGHBOURS`] points
/// within `radius`.
///
/// Orientation is not propagated consistently between points:
/// downstream point-to-plane ICP tolerates a sign flip. Points with fewer
/// than [`MIN_NEIGHBOURS_FOR_FIT`] neighbours fall back to the last valid
/// estimate, or `(0,0,1)` if none has been found yet.
pub fn estimate_normals(points: &[Point3], radius: Number) -> Vec<Vector3> {
    if points.is_empty() {
        return Vec::new();
    }

    let tree = KdTree::build(points);
    let mut normals = Vec::with_capacity(points.len());
    let mut last_valid = Vector3::Z;

    for &p in points {
        let mut neighbours = tree.radius_search(p, radius);
        neighbours.truncate(MAX_NEIGHBOURS);

        if neighbours.len() < MIN_NEIGHBOURS_FOR_FIT {
            normals.push(last_valid);
            continue;
        }

        let local: Vec<Point3> = neighbours.iter().map(|&(i, _)| points[i]).collect();
        let Some((cov, _centroid)) = covariance(&local) else {
            normals.push(last_valid);
            continue;
        };
        let (_eigenvalues, eigenvectors) = eigen_symmetric_3x3(cov);
        // Ascending eigenvalue order: index 0 is the smallest-variance
        // direction, i.e. the plane normal.
        let normal = match eigenvectors[0].try_normalize() {
            Some(n) => n,
            None => last_valid,
        };

        last_valid = normal;
        normals.push(normal);
    }

    normals
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn flat_grid_has_z_normals() {
        let mut points = Vec::new();
        for i in 0..5 {
            for j in 0..5 {
                points.push(Point3::new(i as Number * 0.1, j as Number * 0.1, 0.0));
            }
        }
        let normals = estimate_normals(&points, 0.3);
        for n in normals {
            assert_relative_eq!(n.z().abs(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn isolated_point_falls_back_to_default() {
        let points = vec![Point3::new(0.0, 0.0, 0.0)];
        let normals = estimate_normals(&points, 0.01);
        assert_eq!(normals.len(), 1);
        assert_relative_eq!(normals[0].z(), 1.0);
    }
}
