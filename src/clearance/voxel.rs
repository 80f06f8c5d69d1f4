//! Narrow-band voxel SDF verifier (component C10) — the authoritative
//! clearance check, with a provable worst-case error bound.

use crate::accel::aabb::Aabb;
use crate::clearance::VoxelParams;
use crate::core::error::{CoreError, CoreResult};
use crate::core::types::{Number, Point3};
use crate::mesh::TriMesh;
use crate::sdf::SdfScene;
use rayon::prelude::*;

/// Cells beyond this count are refused rather than allocated.
const MAX_VOXEL_CELLS: u64 = 64_000_000;

#[derive(Clone, Debug, PartialEq)]
pub struct VoxelVerdict {
    pub pass: bool,
    pub min_clearance: Option<Number>,
    pub mean_clearance: Option<Number>,
    pub inside_ratio: Option<Number>,
    pub eps: Number,
    pub reason: Option<String>,
}

impl VoxelVerdict {
    fn failed(eps: Number, reason: &str) -> Self {
        Self { pass: false, min_clearance: None, mean_clearance: None, inside_ratio: None, eps, reason: Some(reason.to_string()) }
    }
}

/// Voxel narrow-band verification. Grids the target's
/// (padded) bounding box at pitch `voxel.voxel`, keeps cells within
/// `voxel.band_mm` of the target surface, and evaluates signed distance to
/// the candidate on that band only.
///
/// Error bound `eps = (sqrt(3)/2) * voxel` bounds how much the discretised
/// `min_clearance` can under-report the true minimum; the verdict subtracts
/// it before comparing against `clearance`.
pub fn clearance_sdf_volume(target: &TriMesh, candidate: &TriMesh, clearance: Number, voxel: &VoxelParams) -> CoreResult<VoxelVerdict> {
    voxel.validate()?;
    let eps = (3.0f64.sqrt() / 2.0) * voxel.voxel;

    if target.is_empty() {
        return Ok(VoxelVerdict::failed(eps, "target mesh is empty"));
    }

    let bbox = Aabb::encompass_points(target.vertices().iter().copied());
    let padded_min = bbox.min() - crate::core::types::Vector3::splat(voxel.band_mm);
    let padded_max = bbox.max() + crate::core::types::Vector3::splat(voxel.band_mm);
    let extent = padded_max - padded_min;

    let nx = (extent.x() / voxel.voxel).ceil().max(1.0) as u64;
    let ny = (extent.y() / voxel.voxel).ceil().max(1.0) as u64;
    let nz = (extent.z() / voxel.voxel).ceil().max(1.0) as u64;
    let total_cells = nx * ny * nz;

    if total_cells > MAX_VOXEL_CELLS {
        return Err(CoreError::VoxelGridTooLarge { nx: nx as usize, ny: ny as usize, nz: nz as usize, total: total_cells, cap: MAX_VOXEL_CELLS });
    }

    let target_scene = SdfScene::build(target);
    let candidate_scene = SdfScene::build(candidate);

    let cell_centres: Vec<Point3> = (0..nx)
        .flat_map(|ix| {
            (0..ny).flat_map(move |iy| {
                (0..nz).map(move |iz| (ix, iy, iz))
            })
        })
        .map(|(ix, iy, iz)| {
            Point3::new(
                padded_min.x() + (ix as Number + 0.5) * voxel.voxel,
                padded_min.y() + (iy as Number + 0.5) * voxel.voxel,
                padded_min.z() + (iz as Number + 0.5) * voxel.voxel,
            )
        })
        .collect();

    // Data-parallel per-cell evaluation: independent cells, no
    // shared mutable state, order-preserving collection so the subsequent
    // reduction is deterministic.
    let band_signed_distances: Vec<Number> = cell_centres
        .par_iter()
        .filter_map(|&p| {
            let d_target = target_scene.unsigned_distance(p);
            if d_target > voxel.band_mm {
                return None;
            }
            Some(candidate_scene.signed_distance(p))
        })
        .collect();

    if band_signed_distances.is_empty() {
        return Ok(VoxelVerdict::failed(eps, "no samples in band"));
    }

    let inside: Vec<Number> = band_signed_distances.iter().copied().filter(|&sd| sd <= 0.0).map(Number::abs).collect();
    let inside_ratio = inside.len() as Number / band_signed_distances.len() as Number;

    if inside.is_empty() {
        return Ok(VoxelVerdict {
            pass: false,
            min_clearance: None,
            mean_clearance: None,
            inside_ratio: Some(inside_ratio),
            eps,
            reason: Some("no band cells interior to the candidate".to_string()),
        });
    }

    let min_clearance = inside.iter().copied().fold(Number::INFINITY, Number::min);
    // Deterministic reduction: fixed left-to-right fold over an
    // index-ordered vector, rather
    // than an unordered parallel sum.
    let mean_clearance = inside.iter().fold(0.0, |acc, &v| acc + v) / inside.len() as Number;

    let pass = (min_clearance - eps) >= clearance;

    Ok(VoxelVerdict { pass, min_clearance: Some(min_clearance), mean_clearance: Some(mean_clearance), inside_ratio: Some(inside_ratio), eps, reason: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Point3;

    fn cube(half_extent: Number) -> TriMesh {
        let h = half_extent;
        let v = vec![
            Point3::new(-h, -h, -h), Point3::new(h, -h, -h), Point3::new(h, h, -h), Point3::new(-h, h, -h),
            Point3::new(-h, -h, h), Point3::new(h, -h, h), Point3::new(h, h, h), Point3::new(-h, h, h),
        ];
        let f = vec![
            [0, 2, 1], [0, 3, 2], [4, 5, 6], [4, 6, 7], [0, 1, 5], [0, 5, 4],
            [2, 3, 7], [2, 7, 6], [1, 2, 6], [1, 6, 5], [0, 4, 7], [0, 7, 3],
        ];
        TriMesh::ingest(v, f).unwrap()
    }

    #[test]
    fn nested_cubes_error_bound_matches_scenario_a() {
        // Inner edge 1.0, outer edge 1.2 -> true clearance 0.1.
        let target = cube(0.5);
        let candidate = cube(0.6);
        let params = VoxelParams { voxel: 0.05, band_mm: 0.3, ..Default::default() };
        let verdict = clearance_sdf_volume(&target, &candidate, 0.08, &params).unwrap();
        let min_clearance = verdict.min_clearance.unwrap();
        assert!((min_clearance - 0.1).abs() < 0.02);
        let eps = (3.0f64.sqrt() / 2.0) * 0.05;
        assert_eq!(verdict.pass, (min_clearance - eps) >= 0.08);
    }

    #[test]
    fn identical_surfaces_fail_after_epsilon_correction() {
        let target = cube(0.5);
        let candidate = cube(0.5);
        let params = VoxelParams { voxel: 0.05, band_mm: 0.3, ..Default::default() };
        let verdict = clearance_sdf_volume(&target, &candidate, 0.01, &params).unwrap();
        assert!(!verdict.pass);
    }
}
