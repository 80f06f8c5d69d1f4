//! Normal estimation and FPFH feature descriptors (component C3), used to
//! drive RANSAC correspondence matching in [`crate::registration`].

pub mod fpfh;
pub mod normals;
pub mod pca;

pub use fpfh::{compute_fpfh, FPFH_DIMS};
pub use normals::estimate_normals;

use crate::core::types::Number;
use crate::sample::PointCloud;

/// Populates a cloud's `normals` and `fpfh` fields in place,
/// using `normal_radius` for the plane fit and `fpfh_radius` for the
/// histogram neighbourhood.
pub fn featurize(cloud: &mut PointCloud, normal_radius: Number, fpfh_radius: Number) {
    let normals = estimate_normals(&cloud.points, normal_radius);
    let fpfh = compute_fpfh(&cloud.points, &normals, fpfh_radius);
    cloud.normals = Some(normals);
    cloud.fpfh = Some(fpfh);
}
