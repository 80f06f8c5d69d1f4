//! Fast Point Feature Histogram descriptors (component C3b).
//!
//! Standard two-pass FPFH (Rusu et al.): a Simplified Point Feature
//! Histogram (SPFH) is computed per point from its neighbourhood, then each
//! point's final descriptor re-weights its own SPFH against its neighbours'
//! SPFH values by inverse distance.

use crate::accel::kdtree::KdTree;
use crate::core::types::{Number, Point3, Vector3};

/// Up to this many neighbours feed the histogram.
const MAX_NEIGHBOURS: usize = 100;

/// Bins per feature angle; three angles -> 33 total dimensions.
const BINS_PER_FEATURE: usize = 11;

pub const FPFH_DIMS: usize = 3 * BINS_PER_FEATURE;

/// Computes a 33-d FPFH descriptor per point, using up to
/// [`MAX_NEIGHBOURS`] neighbours within `radius` and the supplied per-point
/// normals.
pub fn compute_fpfh(points: &[Point3], normals: &[Vector3], radius: Number) -> Vec<[f32; FPFH_DIMS]> {
    assert_eq!(points.len(), normals.len(), "one normal required per point");
    if points.is_empty() {
        return Vec::new();
    }

    let tree = KdTree::build(points);
    let neighbourhoods: Vec<Vec<(usize, Number)>> = points
        .iter()
        .map(|&p| {
            let mut n = tree.radius_search(p, radius);
            n.truncate(MAX_NEIGHBOURS);
            n
        })
        .collect();

    let spfh: Vec<[f32; FPFH_DIMS]> = points
        .iter()
        .zip(normals)
        .zip(&neighbourhoods)
        .map(|((&p, &n_p), neighbours)| simplified_histogram(p, n_p, normals, points, neighbours))
        .collect();

    (0..points.len())
        .map(|i| {
            let neighbours = &neighbourhoods[i];
            if neighbours.is_empty() {
                return spfh[i];
            }

            let mut acc = [0.0f32; FPFH_DIMS];
            let mut weight_sum = 0.0f32;
            for &(j, dist_sq) in neighbours {
                if j == i {
                    continue;
                }
                let dist = (dist_sq as f32).sqrt().max(1e-9);
                let w = 1.0 / dist;
                for (a, &s) in acc.iter_mut().zip(spfh[j].iter()) {
                    *a += w * s;
                }
                weight_sum += w;
            }
            if weight_sum > 0.0 {
                for a in acc.iter_mut() {
                    *a /= weight_sum;
                }
            }

            let mut out = spfh[i];
            for (o, a) in out.iter_mut().zip(acc.iter()) {
                *o += *a;
            }
            normalize(&mut out);
            out
        })
        .collect()
}

/// Builds the SPFH histogram at point `i`'s neighbourhood: for every
/// neighbour pair, the Darboux-frame angles `(alpha, phi, theta)` are binned
/// into an `11x3` histogram.
fn simplified_histogram(
    p: Point3,
    n_p: Vector3,
    normals: &[Vector3],
    points: &[Point3],
    neighbours: &[(usize, Number)],
) -> [f32; FPFH_DIMS] {
    let mut hist = [0.0f32; FPFH_DIMS];
    if neighbours.len() < 2 {
        return hist;
    }

    let mut count = 0.0f32;
    for &(j, _) in neighbours {
        let q = points[j];
        if q.as_array() == p.as_array() {
            continue;
        }
        let diff = q - p;
        let dist = diff.length();
        if dist < 1e-12 {
            continue;
        }
        let dir = diff / dist;
        let n_q = normals[j];

        let u = n_p;
        let v = Vector3::cross(u, dir).try_normalize().unwrap_or(Vector3::X);
        let w = Vector3::cross(u, v);

        let alpha = Vector3::dot(v, n_q);
        let phi = Vector3::dot(u, dir);
        let theta = Number::atan2(Vector3::dot(w, n_q), Vector3::dot(u, n_q));

        bin_into(&mut hist[0..BINS_PER_FEATURE], alpha, -1.0, 1.0);
        bin_into(&mut hist[BINS_PER_FEATURE..2 * BINS_PER_FEATURE], phi, -1.0, 1.0);
        bin_into(
            &mut hist[2 * BINS_PER_FEATURE..3 * BINS_PER_FEATURE],
            theta,
            -std::f64::consts::FRAC_PI_2,
            std::f64::consts::FRAC_PI_2,
        );
        count += 1.0;
    }

    if count > 0.0 {
        normalize(&mut hist);
    }
    hist
}

fn bin_into(bins: &mut [f32], value: Number, lo: Number, hi: Number) {
    let clamped = value.clamp(lo, hi);
    let frac = (clamped - lo) / (hi - lo);
    let idx = ((frac * bins.len() as Number) as usize).min(bins.len() - 1);
    bins[idx] += 1.0;
}

fn normalize(hist: &mut [f32]) {
    let sum: f32 = hist.iter().sum();
    if sum > 0.0 {
        for v in hist.iter_mut() {
            *v /= sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_is_normalised() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.1, 0.0, 0.0),
            Point3::new(0.0, 0.1, 0.0),
            Point3::new(-0.1, 0.0, 0.0),
        ];
        let normals = vec![Vector3::Z; 4];
        let descriptors = compute_fpfh(&points, &normals, 0.5);
        for d in descriptors {
            let sum: f32 = d.iter().sum();
            assert!((sum - 1.0).abs() < 1e-4 || sum == 0.0);
        }
    }
}
