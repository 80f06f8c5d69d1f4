//! Rigid transforms in SE(3).

use crate::core::types::{transform_point, transform_vector, Matrix4, Number, Point3, Vector3};
use glam::{DMat3, DQuat, DVec3};

/// A 4x4 homogeneous rigid transform. Identity on construction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RigidTransform(Matrix4);

impl Default for RigidTransform {
    fn default() -> Self { Self::identity() }
}

impl RigidTransform {
    pub fn identity() -> Self { Self(Matrix4::IDENTITY) }

    pub fn from_matrix(m: Matrix4) -> Self { Self(m) }

    pub fn from_rotation_translation(rotation: DMat3, translation: Vector3) -> Self {
        let quat = DQuat::from_mat3(&rotation);
        Self(Matrix4::from_rotation_translation(quat, translation.0))
    }

    /// The reflection `diag(-1, 1, 1, 1)` about the YZ plane.
    pub fn mirror_yz() -> Self { Self(Matrix4::from_scale(DVec3::new(-1.0, 1.0, 1.0))) }

    pub fn apply_point(&self, p: Point3) -> Point3 { transform_point(&self.0, p) }

    pub fn apply_vector(&self, v: Vector3) -> Vector3 { transform_vector(&self.0, v) }

    /// Composes `self` followed by `other`: applying the result to a point
    /// is equivalent to `other.apply_point(self.apply_point(p))`.
    pub fn then(&self, other: &Self) -> Self { Self(other.0 * self.0) }

    pub fn inverse(&self) -> Self { Self(self.0.inverse()) }

    pub fn matrix(&self) -> Matrix4 { self.0 }

    /// Row-major 4x4 matrix, for the external interface.
    pub fn to_rows(&self) -> [[Number; 4]; 4] {
        let cols = self.0.to_cols_array_2d();
        std::array::from_fn(|r| std::array::from_fn(|c| cols[c][r]))
    }
}
