//! Least-squares rigid alignment between two ordered point sets (no
//! scaling), used by RANSAC's minimal-model estimator (C4) and available to
//! any other exact-correspondence fit.
//!
//! Implemented via the Kabsch algorithm: form the cross-covariance `H`
//! between the centred point sets, and recover its rotation from the
//! eigendecomposition of the symmetric `H^T H` (the route taken when no
//! general SVD routine is on hand — singular values are `sqrt` of the
//! eigenvalues of `H^T H`, and `U = H V diag(1/sigma)`).

use crate::core::types::{Matrix4, Number, Point3, Vector3};
use crate::feature::pca::eigen_symmetric_3x3;
use crate::registration::transform::RigidTransform;
use glam::{DMat3, DVec3};

/// Fits the rigid transform minimising `sum ||T*src_i - dst_i||^2`.
///
/// Returns `None` if fewer than 3 correspondences are given, or the
/// configuration is degenerate (covariance has a zero singular value, e.g.
/// all source points collinear).
pub fn fit(src: &[Point3], dst: &[Point3]) -> Option<RigidTransform> {
    if src.len() != dst.len() || src.len() < 3 {
        return None;
    }

    let n = src.len() as Number;
    let centroid_src = centroid(src);
    let centroid_dst = centroid(dst);

    let mut h = [[0.0; 3]; 3];
    for (&s, &d) in src.iter().zip(dst) {
        let a = (s - centroid_src).to_array();
        let b = (d - centroid_dst).to_array();
        for i in 0..3 {
            for j in 0..3 {
                h[i][j] += a[i] * b[j];
            }
        }
    }
    for row in h.iter_mut() {
        for v in row.iter_mut() {
            *v /= n;
        }
    }

    let hth = mat_transpose_mul(&h, &h);
    let (eigenvalues, eigenvectors) = eigen_symmetric_3x3(hth);

    // eigen_symmetric_3x3 returns ascending order; singular values wanted
    // descending, so walk the columns in reverse.
    let mut v_cols = [eigenvectors[2], eigenvectors[1], eigenvectors[0]];
    let singular_values: [Number; 3] =
        [eigenvalues[2].max(0.0).sqrt(), eigenvalues[1].max(0.0).sqrt(), eigenvalues[0].max(0.0).sqrt()];

    if singular_values[2] < 1e-9 {
        return None;
    }

    let mut u_cols = [Vector3::ZERO; 3];
    for k in 0..3 {
        let hv = mat_vec_mul(&h, v_cols[k]);
        u_cols[k] = hv / singular_values[k];
    }

    let mut det = DMat3::from_cols(to_dvec3(u_cols[0]), to_dvec3(u_cols[1]), to_dvec3(u_cols[2]))
        .determinant()
        * DMat3::from_cols(to_dvec3(v_cols[0]), to_dvec3(v_cols[1]), to_dvec3(v_cols[2])).determinant();
    if det < 0.0 {
        // Flip the smallest-singular-value column to keep a proper
        // rotation (no reflection) — the standard Kabsch correction.
        v_cols[2] = -v_cols[2];
        u_cols[2] = -u_cols[2];
        det = -det;
    }
    debug_assert!(det > 0.0);

    let u = DMat3::from_cols(to_dvec3(u_cols[0]), to_dvec3(u_cols[1]), to_dvec3(u_cols[2]));
    let v = DMat3::from_cols(to_dvec3(v_cols[0]), to_dvec3(v_cols[1]), to_dvec3(v_cols[2]));
    let rotation = u * v.transpose();

    let translation = centroid_dst.to_vector() - Vector3(rotation * centroid_src.0);

    let linear = Matrix4::from_mat3(rotation);
    let matrix = Matrix4::from_translation(translation.0) * linear;
    Some(RigidTransform::from_matrix(matrix))
}

fn centroid(points: &[Point3]) -> Point3 {
    let sum = points.iter().fold(Vector3::ZERO, |acc, &p| acc + p.to_vector());
    (sum / points.len() as Number).to_point()
}

fn mat_transpose_mul(a: &[[Number; 3]; 3], b: &[[Number; 3]; 3]) -> [[Number; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            let mut sum = 0.0;
            for k in 0..3 {
                sum += a[k][i] * b[k][j];
            }
            out[i][j] = sum;
        }
    }
    out
}

fn mat_vec_mul(m: &[[Number; 3]; 3], v: Vector3) -> Vector3 {
    let a = v.to_array();
    Vector3::new(
        m[0][0] * a[0] + m[0][1] * a[1] + m[0][2] * a[2],
        m[1][0] * a[0] + m[1][1] * a[1] + m[1][2] * a[2],
        m[2][0] * a[0] + m[2][1] * a[1] + m[2][2] * a[2],
    )
}

fn to_dvec3(v: Vector3) -> DVec3 { v.0 }

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn recovers_pure_translation() {
        let src = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, 0.0, 1.0)];
        let offset = Vector3::new(2.0, -1.0, 0.5);
        let dst: Vec<Point3> = src.iter().map(|&p| p + offset).collect();

        let t = fit(&src, &dst).expect("non-degenerate tetrahedron should fit");
        for (&s, &d) in src.iter().zip(&dst) {
            let mapped = t.apply_point(s);
            assert_relative_eq!(mapped.x(), d.x(), epsilon = 1e-8);
            assert_relative_eq!(mapped.y(), d.y(), epsilon = 1e-8);
            assert_relative_eq!(mapped.z(), d.z(), epsilon = 1e-8);
        }
    }
}
