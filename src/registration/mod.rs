//! Rigid registration: coarse RANSAC (C4), fine point-to-plane ICP (C5), the
//! Chamfer scorer (C6), and the mirror-aware aligner (C7) that ties them
//! together.

pub mod chamfer;
pub mod icp;
pub mod kabsch;
pub mod ransac;
pub mod transform;

pub use transform::RigidTransform;

use crate::core::error::{CoreError, CoreResult};
use crate::core::targets;
use crate::core::types::Number;
use crate::feature::featurize;
use crate::mesh::TriMesh;
use crate::sample::{sample_surface, voxel_downsample, PointCloud, SURFACE_SAMPLE_STREAM};

/// Per-call parameters shared by coarse and fine registration.
#[derive(Copy, Clone, Debug)]
pub struct RegistrationParams {
    pub voxel: Number,
    pub fpfh_radius: Number,
    pub icp_thr: Number,
    pub samples: usize,
}

impl Default for RegistrationParams {
    fn default() -> Self { Self { voxel: 0.30, fpfh_radius: 0.30, icp_thr: 0.90, samples: 2000 } }
}

impl RegistrationParams {
    pub fn validate(&self) -> CoreResult<()> {
        if self.voxel <= 0.0 {
            return Err(CoreError::NonPositiveParameter { name: "voxel", value: self.voxel });
        }
        if self.fpfh_radius <= 0.0 {
            return Err(CoreError::NonPositiveParameter { name: "fpfh_radius", value: self.fpfh_radius });
        }
        if self.icp_thr <= 0.0 {
            return Err(CoreError::NonPositiveParameter { name: "icp_thr", value: self.icp_thr });
        }
        if self.samples < 1 {
            return Err(CoreError::SubUnitParameter { name: "samples", value: self.samples });
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct RegistrationResult {
    pub transform: RigidTransform,
    pub chamfer: Number,
}

#[derive(Clone, Debug)]
pub struct MirrorRegistrationResult {
    pub transform: RigidTransform,
    pub chamfer: Number,
    pub mirrored: bool,
}

fn prepare_cloud(mesh: &TriMesh, params: &RegistrationParams, stream: u64) -> PointCloud {
    let sampled = sample_surface(mesh, params.samples, stream);
    let mut down = voxel_downsample(&sampled, params.voxel);
    featurize(&mut down, params.fpfh_radius, params.fpfh_radius);
    down
}

/// Coarse RANSAC (C4) followed by fine point-to-plane ICP (C5): aligns
/// `source` onto `target`.
pub fn align_icp(source: &TriMesh, target: &TriMesh, params: &RegistrationParams) -> RegistrationResult {
    let source_cloud = prepare_cloud(source, params, SURFACE_SAMPLE_STREAM);
    let target_cloud = prepare_cloud(target, params, SURFACE_SAMPLE_STREAM ^ 0xA);

    let coarse = ransac::coarse_register(&source_cloud, &target_cloud, params.voxel);
    tracing::debug!(target: targets::REGISTRATION, "ransac coarse alignment complete");

    let fine = icp::refine(&source_cloud, &target_cloud, coarse, params.icp_thr);
    tracing::debug!(target: targets::REGISTRATION, "icp refinement complete");

    let aligned = PointCloud::from_points(source_cloud.points.iter().map(|&p| fine.apply_point(p)).collect());
    let chamfer = chamfer::chamfer_distance(&aligned, &target_cloud);

    RegistrationResult { transform: fine, chamfer }
}

/// Mirror-aware aligner (C7): runs [`align_icp`] on `source` and on its
/// YZ-mirror, keeping whichever achieves the lower Chamfer distance. Ties
/// favour the non-mirrored transform.
pub fn align_icp_with_mirror(
    source: &TriMesh,
    target: &TriMesh,
    params: &RegistrationParams,
) -> MirrorRegistrationResult {
    let direct = align_icp(source, target, params);

    let mirror = RigidTransform::mirror_yz();
    let mirrored_vertices: Vec<_> = source.vertices().iter().map(|&p| mirror.apply_point(p)).collect();
    let mirrored_source =
        TriMesh::ingest(mirrored_vertices, source.triangles().to_vec()).expect("mirroring a valid mesh stays valid");

    let mirrored_result = align_icp(&mirrored_source, target, params);

    if mirrored_result.chamfer < direct.chamfer {
        tracing::info!(target: targets::REGISTRATION, chamfer = mirrored_result.chamfer, "mirror variant selected");
        MirrorRegistrationResult {
            transform: mirror.then(&mirrored_result.transform),
            chamfer: mirrored_result.chamfer,
            mirrored: true,
        }
    } else {
        MirrorRegistrationResult { transform: direct.transform, chamfer: direct.chamfer, mirrored: false }
    }
}
