//! A small symmetric eigensolver, shared by normal estimation (C3), thin
//! region clustering (C12b), and anatomical labelling.
//!
//! 3x3 symmetric matrices are small enough that a general numerical linear
//! algebra crate would be overkill; the classic cyclic Jacobi rotation
//! method converges in a handful of sweeps and needs no external dependency.

use crate::core::types::{Number, Point3, Vector3};

/// Eigenvalues (ascending) and corresponding unit eigenvectors of a
/// symmetric 3x3 matrix, via the cyclic Jacobi eigenvalue algorithm.
pub fn eigen_symmetric_3x3(mut a: [[Number; 3]; 3]) -> ([Number; 3], [Vector3; 3]) {
    let mut v = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    for _ in 0..64 {
        let (p, q) = off_diagonal_pivot(&a);
        let off = a[p][q].abs();
        if off < 1e-14 {
            break;
        }

        let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
        let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
        let c = 1.0 / (t * t + 1.0).sqrt();
        let s = t * c;

        let app = a[p][p];
        let aqq = a[q][q];
        let apq = a[p][q];
        a[p][p] = c * c * app - 2.0 * s * c * apq + s * s * aqq;
        a[q][q] = s * s * app + 2.0 * s * c * apq + c * c * aqq;
        a[p][q] = 0.0;
        a[q][p] = 0.0;

        for i in 0..3 {
            if i != p && i != q {
                let aip = a[i][p];
                let aiq = a[i][q];
                a[i][p] = c * aip - s * aiq;
                a[p][i] = a[i][p];
                a[i][q] = s * aip + c * aiq;
                a[q][i] = a[i][q];
            }
        }

        for i in 0..3 {
            let vip = v[i][p];
            let viq = v[i][q];
            v[i][p] = c * vip - s * viq;
            v[i][q] = s * vip + c * viq;
        }
    }

    let mut eigenvalues = [a[0][0], a[1][1], a[2][2]];
    let mut eigenvectors = [
        Vector3::new(v[0][0], v[1][0], v[2][0]),
        Vector3::new(v[0][1], v[1][1], v[2][1]),
        Vector3::new(v[0][2], v[1][2], v[2][2]),
    ];

    // Sort ascending by eigenvalue (insertion sort: only 3 elements).
    for i in 1..3 {
        let mut j = i;
        while j > 0 && eigenvalues[j - 1] > eigenvalues[j] {
            eigenvalues.swap(j - 1, j);
            eigenvectors.swap(j - 1, j);
            j -= 1;
        }
    }

    (eigenvalues, eigenvectors)
}

fn off_diagonal_pivot(a: &[[Number; 3]; 3]) -> (usize, usize) {
    let candidates = [(0, 1), (0, 2), (1, 2)];
    candidates
        .into_iter()
        .max_by(|&(i1, j1), &(i2, j2)| a[i1][j1].abs().total_cmp(&a[i2][j2].abs()))
        .expect("fixed 3-element candidate list is never empty")
}

/// Covariance matrix of a set of points about their centroid, plus the
/// centroid itself. Returns `None` for an empty slice.
pub fn covariance(points: &[Point3]) -> Option<([[Number; 3]; 3], Point3)> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as Number;
    let sum = points.iter().fold(Vector3::ZERO, |acc, &p| acc + p.to_vector());
    let centroid = (sum / n).to_point();

    let mut cov = [[0.0; 3]; 3];
    for &p in points {
        let d = (p - centroid).to_array();
        for i in 0..3 {
            for j in 0..3 {
                cov[i][j] += d[i] * d[j];
            }
        }
    }
    for row in cov.iter_mut() {
        for v in row.iter_mut() {
            *v /= n;
        }
    }

    Some((cov, centroid))
}
