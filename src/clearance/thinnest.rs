//! Thinnest-point locator (component C11).

use crate::core::types::{Number, Point3};
use crate::mesh::TriMesh;
use crate::sdf::SdfScene;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThinnestPoint {
    pub vertex_index: usize,
    pub min_clearance: Number,
    pub target_point: Point3,
    pub candidate_point: Point3,
}

/// For every target vertex interior to the candidate, finds the one with
/// the smallest clearance. `None` if no vertex is interior.
pub fn min_clearance_point(target: &TriMesh, candidate: &TriMesh) -> Option<ThinnestPoint> {
    let scene = SdfScene::build(candidate);
    if scene.is_empty() {
        return None;
    }

    target
        .vertices()
        .iter()
        .enumerate()
        .filter_map(|(idx, &v)| {
            let sd = scene.signed_distance(v);
            if sd > 0.0 {
                return None;
            }
            let (candidate_point, _) = scene.closest_point(v)?;
            let min_clearance = sd.abs();
            crate::shared::validate::clearance(min_clearance);
            Some(ThinnestPoint { vertex_index: idx, min_clearance, target_point: v, candidate_point })
        })
        .min_by(|a, b| a.min_clearance.total_cmp(&b.min_clearance))
}
