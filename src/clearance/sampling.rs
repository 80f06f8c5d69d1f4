//! Surface-sample signed-distance clearance evaluator (component C9).

use crate::clearance::ClearanceParams;
use crate::core::types::Number;
use crate::mesh::TriMesh;
use crate::sample::sample_surface;
use crate::sdf::SdfScene;

/// Stream tag for the clearance evaluator's own surface sampling, distinct
/// from registration's sampling stream so the two don't correlate.
const CLEARANCE_SAMPLE_STREAM: u64 = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct SamplingReport {
    pub pass: bool,
    pub inside_ratio: Number,
    pub min_clearance: Option<Number>,
    pub mean_clearance: Option<Number>,
    pub p01_clearance: Option<Number>,
}

/// Samples `params.samples` points on `target`'s surface, and checks each
/// against the candidate's SDF. `pass` requires both an
/// `inside_ratio >= 0.999` and `min_clearance >= clearance + safety_delta`.
pub fn clearance_sampling(target: &TriMesh, candidate: &TriMesh, params: &ClearanceParams) -> SamplingReport {
    let samples = sample_surface(target, params.samples, CLEARANCE_SAMPLE_STREAM);
    let scene = SdfScene::build(candidate);

    let mut interior_clearances: Vec<Number> = Vec::with_capacity(samples.len());
    for &p in &samples.points {
        if scene.occupancy(p) {
            // Occupancy and signed_distance both key off the same winding
            // number; `sd` is negative here, so clearance is its magnitude.
            let sd = scene.signed_distance(p);
            let clearance = sd.abs();
            crate::shared::validate::clearance(clearance);
            interior_clearances.push(clearance);
        }
    }

    let total = samples.len().max(1) as Number;
    let inside_ratio = interior_clearances.len() as Number / total;

    if interior_clearances.is_empty() {
        return SamplingReport { pass: false, inside_ratio, min_clearance: None, mean_clearance: None, p01_clearance: None };
    }

    interior_clearances.sort_unstable_by(|a, b| a.total_cmp(b));
    let n = interior_clearances.len();
    let min_clearance = interior_clearances[0];
    let mean_clearance = interior_clearances.iter().sum::<Number>() / n as Number;
    let p01_index = ((0.01 * n as Number).floor() as usize).min(n - 1);
    let p01_clearance = interior_clearances[p01_index];

    let required = params.clearance + params.safety_delta;
    let pass = inside_ratio >= 0.999 && min_clearance >= required;

    SamplingReport {
        pass,
        inside_ratio,
        min_clearance: Some(min_clearance),
        mean_clearance: Some(mean_clearance),
        p01_clearance: Some(p01_clearance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Point3;

    fn cube(half_extent: Number) -> TriMesh {
        let h = half_extent;
        let v = vec![
            Point3::new(-h, -h, -h),
            Point3::new(h, -h, -h),
            Point3::new(h, h, -h),
            Point3::new(-h, h, -h),
            Point3::new(-h, -h, h),
            Point3::new(h, -h, h),
            Point3::new(h, h, h),
            Point3::new(-h, h, h),
        ];
        let f = vec![
            [0, 2, 1], [0, 3, 2],
            [4, 5, 6], [4, 6, 7],
            [0, 1, 5], [0, 5, 4],
            [2, 3, 7], [2, 7, 6],
            [1, 2, 6], [1, 6, 5],
            [0, 4, 7], [0, 7, 3],
        ];
        TriMesh::ingest(v, f).unwrap()
    }

    #[test]
    fn nested_cubes_report_expected_inside_ratio_and_clearance() {
        let target = cube(0.5);
        let candidate = cube(0.6);
        let params = ClearanceParams { clearance: 0.0, safety_delta: 0.0, samples: 500 };
        let report = clearance_sampling(&target, &candidate, &params);
        assert!(report.inside_ratio > 0.99);
        assert!(report.min_clearance.unwrap() > 0.0);
    }

    #[test]
    fn identical_surfaces_fail_strict_clearance() {
        let target = cube(0.5);
        let candidate = cube(0.5);
        let params = ClearanceParams { clearance: 0.05, safety_delta: 0.0, samples: 300 };
        let report = clearance_sampling(&target, &candidate, &params);
        assert!(!report.pass);
    }
}
