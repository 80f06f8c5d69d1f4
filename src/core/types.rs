//! Core numeric and geometric types shared across the whole crate.
//!
//! [`Point3`] and [`Vector3`] are thin newtypes over [`glam::DVec3`]. They are
//! kept distinct (rather than using a single `DVec3` everywhere) so that affine
//! point arithmetic (`Point3 - Point3 = Vector3`) can't be silently confused
//! with linear vector arithmetic (`Vector3 + Vector3 = Vector3`) the way a bare
//! `DVec3` would allow.

use auto_ops::{impl_op_ex, impl_op_ex_commutative};
use glam::DVec3;
use std::ops::Index;

/// Numeric type used for all geometric calculations in the crate.
pub type Number = f64;

/// Numeric identifier used to uniquely mark meshes/candidates in batch results.
pub type IdToken = u64;

#[derive(Copy, Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point3(pub DVec3);

#[derive(Copy, Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vector3(pub DVec3);

/// A 4x4 homogeneous transform matrix, expressed with [`Number`] (`f64`) precision.
pub type Matrix4 = glam::DMat4;

macro_rules! vec3_like {
    ($ty:ident) => {
        impl $ty {
            pub const ZERO: Self = Self(DVec3::ZERO);
            pub const ONE: Self = Self(DVec3::ONE);
            pub const X: Self = Self(DVec3::X);
            pub const Y: Self = Self(DVec3::Y);
            pub const Z: Self = Self(DVec3::Z);
            pub const INFINITY: Self = Self(DVec3::INFINITY);
            pub const NEG_INFINITY: Self = Self(DVec3::NEG_INFINITY);

            pub const fn new(x: Number, y: Number, z: Number) -> Self { Self(DVec3::new(x, y, z)) }
            pub const fn splat(v: Number) -> Self { Self(DVec3::splat(v)) }
            pub fn min(a: Self, b: Self) -> Self { Self(DVec3::min(a.0, b.0)) }
            pub fn max(a: Self, b: Self) -> Self { Self(DVec3::max(a.0, b.0)) }
            pub fn as_array(&self) -> [Number; 3] { self.0.to_array() }
            pub fn to_array(self) -> [Number; 3] { self.0.to_array() }
            pub fn is_nan(&self) -> bool { self.0.is_nan() }
            pub fn is_finite(&self) -> bool { self.0.is_finite() }
            pub fn x(&self) -> Number { self.0.x }
            pub fn y(&self) -> Number { self.0.y }
            pub fn z(&self) -> Number { self.0.z }
        }

        impl From<[Number; 3]> for $ty {
            fn from(value: [Number; 3]) -> Self { Self(DVec3::from_array(value)) }
        }
        impl From<(Number, Number, Number)> for $ty {
            fn from(value: (Number, Number, Number)) -> Self { Self(DVec3::new(value.0, value.1, value.2)) }
        }
        impl Index<usize> for $ty {
            type Output = Number;
            fn index(&self, index: usize) -> &Number { &self.0[index] }
        }
    };
}

vec3_like!(Point3);
vec3_like!(Vector3);

impl Point3 {
    pub fn to_vector(self) -> Vector3 { Vector3(self.0) }
}

impl Vector3 {
    pub fn to_point(self) -> Point3 { Point3(self.0) }
    pub fn dot(a: Self, b: Self) -> Number { a.0.dot(b.0) }
    pub fn cross(a: Self, b: Self) -> Self { Self(a.0.cross(b.0)) }
    pub fn length(&self) -> Number { self.0.length() }
    pub fn length_squared(&self) -> Number { self.0.length_squared() }
    pub fn normalize(&self) -> Self { Self(self.0.normalize()) }
    pub fn try_normalize(&self) -> Option<Self> {
        let n = self.0.normalize_or_zero();
        if n == DVec3::ZERO { None } else { Some(Self(n)) }
    }
    pub fn is_normalized(&self) -> bool { self.0.is_normalized() }
    pub fn recip(&self) -> Self { Self(self.0.recip()) }
}

// region Operator overloads

impl_op_ex!(-|a: &Point3, b: &Point3| -> Vector3 { Vector3(a.0 - b.0) });
impl_op_ex!(+ |a: &Point3, b: &Vector3| -> Point3 { Point3(a.0 + b.0) });
impl_op_ex!(-|a: &Point3, b: &Vector3| -> Point3 { Point3(a.0 - b.0) });
impl_op_ex!(+= |a: &mut Point3, b: &Vector3| { a.0 += b.0 });
impl_op_ex!(+ |a: &Vector3, b: &Vector3| -> Vector3 { Vector3(a.0 + b.0) });
impl_op_ex!(-|a: &Vector3, b: &Vector3| -> Vector3 { Vector3(a.0 - b.0) });
impl_op_ex!(+= |a: &mut Vector3, b: &Vector3| { a.0 += b.0 });
impl_op_ex!(-a: &Vector3 |->Vector3 { Vector3(-a.0) });
impl_op_ex_commutative!(*|a: &Vector3, b: &Number| -> Vector3 { Vector3(a.0 * *b) });
impl_op_ex!(/ |a: &Vector3, b: &Number| -> Vector3 { Vector3(a.0 / *b) });
impl_op_ex_commutative!(*|a: &Point3, b: &Number| -> Point3 { Point3(a.0 * *b) });

// endregion Operator overloads

/// Applies a rigid (or small-scale-augmented) homogeneous transform to a point.
pub fn transform_point(t: &Matrix4, p: Point3) -> Point3 { Point3(t.transform_point3(p.0)) }

/// Applies only the rotational/scaling part of a homogeneous transform to a vector (no translation).
pub fn transform_vector(t: &Matrix4, v: Vector3) -> Vector3 { Vector3(t.transform_vector3(v.0)) }
