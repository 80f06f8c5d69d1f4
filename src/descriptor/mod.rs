//! Coarse feature descriptor (component C14): volume, area, AABB extents
//! and an 8x16 normal-orientation histogram, used upstream of this crate to
//! pre-filter candidates before the expensive registration/clearance
//! pipeline runs.

use crate::accel::aabb::Aabb;
use crate::core::types::{Number, Vector3};
use crate::mesh::TriMesh;
use std::f64::consts::PI;

/// Polar bins (`theta`, measured from `+Z`).
const THETA_BINS: usize = 8;
/// Azimuthal bins (`phi`, measured in the XY plane).
const PHI_BINS: usize = 16;
pub const NORMAL_HIST_BINS: usize = THETA_BINS * PHI_BINS;

#[derive(Clone, Debug, PartialEq)]
pub struct CoarseFeatures {
    pub volume: Number,
    pub area: Number,
    pub extents: Vector3,
    /// Row-major `[theta][phi]` histogram flattened to `THETA_BINS * PHI_BINS`
    /// bins, normalised so the bins sum to `1` (all zero if the mesh has no
    /// positive-area triangle).
    pub normal_hist: [Number; NORMAL_HIST_BINS],
}

/// Computes volume, surface area, AABB extents and a normal-orientation
/// histogram for `mesh`.
///
/// `volume` is the signed tetrahedron-sum `|sum a.(b x c)| / 6` taken over
/// every triangle with the origin as the shared apex; this is invariant
/// under rigid motion (and choice of origin) whenever `mesh` is a closed
/// surface, by the divergence theorem — the per-triangle, origin-dependent
/// terms cancel in the sum.
pub fn coarse_features(mesh: &TriMesh) -> CoarseFeatures {
    let mut signed_volume_sum = 0.0;
    let mut area = 0.0;
    let mut hist = [0.0; NORMAL_HIST_BINS];

    for tri in mesh.iter_triangles() {
        let [a, b, c] = tri.positions;
        signed_volume_sum += Vector3::dot(a.to_vector(), Vector3::cross(b.to_vector(), c.to_vector()));

        let Some(normal) = tri.normal() else { continue };
        area += tri.area();

        let theta = Number::acos(normal.z().clamp(-1.0, 1.0));
        let mut phi = Number::atan2(normal.y(), normal.x());
        if phi < 0.0 {
            phi += 2.0 * PI;
        }

        let i = ((theta / PI) * THETA_BINS as Number) as usize;
        let j = ((phi / (2.0 * PI)) * PHI_BINS as Number) as usize;
        let i = i.min(THETA_BINS - 1);
        let j = j.min(PHI_BINS - 1);
        hist[i * PHI_BINS + j] += 1.0;
    }

    let hist_sum: Number = hist.iter().sum();
    if hist_sum > 0.0 {
        for v in hist.iter_mut() {
            *v /= hist_sum;
        }
    }

    let extents = if mesh.is_empty() { Vector3::ZERO } else { Aabb::encompass_points(mesh.vertices().iter().copied()).size() };

    CoarseFeatures { volume: signed_volume_sum.abs() / 6.0, area, extents, normal_hist: hist }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Point3;
    use crate::registration::RigidTransform;
    use approx::assert_relative_eq;

    fn unit_cube() -> TriMesh {
        let v = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
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
    fn unit_cube_has_unit_volume_and_area_six() {
        let features = coarse_features(&unit_cube());
        assert_relative_eq!(features.volume, 1.0, epsilon = 1e-9);
        assert_relative_eq!(features.area, 6.0, epsilon = 1e-9);
        assert_relative_eq!(features.extents.x(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn volume_is_invariant_under_rigid_transform() {
        let mesh = unit_cube();
        let before = coarse_features(&mesh);

        let rotation = glam::DMat3::from_euler(glam::EulerRot::XYZ, 0.3, 0.7, -0.2);
        let translation = crate::core::types::Vector3::new(5.0, -3.0, 2.0);
        let transform = RigidTransform::from_rotation_translation(rotation, translation);

        let moved_vertices: Vec<_> = mesh.vertices().iter().map(|&p| transform.apply_point(p)).collect();
        let moved = TriMesh::ingest(moved_vertices, mesh.triangles().to_vec()).unwrap();
        let after = coarse_features(&moved);

        assert_relative_eq!(before.volume, after.volume, epsilon = 1e-8);
        assert_relative_eq!(before.area, after.area, epsilon = 1e-8);
    }

    #[test]
    fn normal_histogram_sums_to_one_for_cube() {
        let features = coarse_features(&unit_cube());
        let sum: Number = features.normal_hist.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_mesh_has_zero_histogram() {
        let empty = TriMesh::ingest(Vec::new(), Vec::new()).unwrap();
        let features = coarse_features(&empty);
        assert_eq!(features.normal_hist, [0.0; NORMAL_HIST_BINS]);
        assert_relative_eq!(features.volume, 0.0);
    }
}
