//! Point-to-plane Iterative Closest Point refinement (component C5).

use crate::accel::kdtree::KdTree;
use crate::core::types::{Matrix4, Number, Point3, Vector3};
use crate::registration::transform::RigidTransform;
use crate::sample::PointCloud;
use glam::{DMat3, DQuat};

const MAX_ITERATIONS: usize = 50;
const FITNESS_EPSILON: Number = 1e-7;

/// Refines `initial` by point-to-plane ICP of `source` against `target`
/// (target must carry normals). Correspondences further than `thr` apart
/// (after the current transform) are discarded each iteration. Stops when
/// the mean residual stops improving by more than [`FITNESS_EPSILON`], or
/// after [`MAX_ITERATIONS`].
///
/// Deterministic given `initial`: no randomness is involved.
pub fn refine(source: &PointCloud, target: &PointCloud, initial: RigidTransform, thr: Number) -> RigidTransform {
    let Some(target_normals) = &target.normals else {
        return initial;
    };
    if source.points.is_empty() || target.points.is_empty() {
        return initial;
    }

    let target_tree = KdTree::build(&target.points);
    let mut transform = initial;
    let mut last_residual = Number::INFINITY;

    for _ in 0..MAX_ITERATIONS {
        let mut correspondences = Vec::with_capacity(source.points.len());
        for &s in &source.points {
            let mapped = transform.apply_point(s);
            if let Some((idx, dist_sq)) = target_tree.nearest(mapped) {
                if dist_sq.sqrt() <= thr {
                    correspondences.push((mapped, target.points[idx], target_normals[idx]));
                }
            }
        }

        if correspondences.len() < 6 {
            break;
        }

        let residual: Number = correspondences
            .iter()
            .map(|&(s, t, n)| Vector3::dot(s - t, n).powi(2))
            .sum::<Number>()
            / correspondences.len() as Number;

        let Some(delta) = solve_gauss_newton(&correspondences) else {
            break;
        };
        transform = transform.then(&delta);

        if (last_residual - residual).abs() < FITNESS_EPSILON {
            last_residual = residual;
            break;
        }
        last_residual = residual;
    }

    transform
}

/// Solves one Gauss-Newton step over the 6-d twist `(rx, ry, rz, tx, ty, tz)`
/// minimising `sum ((s_i + twist(s_i) - t_i) . n_i)^2`, linearising the
/// rotation about identity (small-angle approximation, standard for ICP).
fn solve_gauss_newton(correspondences: &[(Point3, Point3, Vector3)]) -> Option<RigidTransform> {
    let mut jtj = [[0.0; 6]; 6];
    let mut jtr = [0.0; 6];

    for &(s, t, n) in correspondences {
        let cross = Vector3::cross(s.to_vector(), n);
        let row = [cross.x(), cross.y(), cross.z(), n.x(), n.y(), n.z()];
        let residual = Vector3::dot(s - t, n);

        for i in 0..6 {
            jtr[i] -= row[i] * residual;
            for j in 0..6 {
                jtj[i][j] += row[i] * row[j];
            }
        }
    }

    // Tiny Tikhonov regularisation keeps the 6x6 solve stable when the
    // correspondence set is close to degenerate (e.g. near-planar patch).
    for i in 0..6 {
        jtj[i][i] += 1e-9;
    }

    let twist = solve_6x6(jtj, jtr)?;
    let rotation = DMat3::from_euler(glam::EulerRot::XYZ, twist[0], twist[1], twist[2]);
    let translation = Vector3::new(twist[3], twist[4], twist[5]);

    let quat = DQuat::from_mat3(&rotation);
    Some(RigidTransform::from_matrix(Matrix4::from_rotation_translation(quat, translation.0)))
}

/// Gaussian elimination with partial pivoting for a small dense linear
/// system. Returns `None` if the matrix is (numerically) singular.
fn solve_6x6(mut a: [[Number; 6]; 6], mut b: [Number; 6]) -> Option<[Number; 6]> {
    for col in 0..6 {
        let pivot_row = (col..6).max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))?;
        if a[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..6 {
            let factor = a[row][col] / a[col][col];
            for k in col..6 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; 6];
    for row in (0..6).rev() {
        let mut sum = b[row];
        for k in (row + 1)..6 {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::estimate_normals;

    fn grid_cloud() -> Vec<Point3> {
        let mut points = Vec::new();
        for i in -3..=3 {
            for j in -3..=3 {
                points.push(Point3::new(i as Number * 0.1, j as Number * 0.1, 0.0));
            }
        }
        points
    }

    #[test]
    fn refines_small_translation_back_to_near_zero_residual() {
        let target_points = grid_cloud();
        let normals = estimate_normals(&target_points, 0.3);
        let target = PointCloud { points: target_points.clone(), normals: Some(normals), fpfh: None };

        let offset = Vector3::new(0.0, 0.0, 0.05);
        let source = PointCloud::from_points(target_points.iter().map(|&p| p + offset).collect());

        let result = refine(&source, &target, RigidTransform::identity(), 0.5);
        let mut residual = 0.0;
        for &s in &source.points {
            let mapped = result.apply_point(s);
            let nearest = target
                .points
                .iter()
                .zip(target.normals.as_ref().unwrap())
                .min_by(|(a, _), (b, _)| (mapped - **a).length_squared().total_cmp(&(mapped - **b).length_squared()))
                .unwrap();
            residual += Vector3::dot(mapped - *nearest.0, *nearest.1).powi(2);
        }
        assert!(residual / source.points.len() as Number < 0.05 * 0.05);
    }
}
