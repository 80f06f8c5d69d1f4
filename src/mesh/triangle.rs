//! A single triangle, addressable back into its owning [`super::TriMesh`].
//!
//! This is the leaf type stored in the [`crate::accel::bvh::Bvh`] built over
//! a mesh: it carries just enough (positions + originating index) to answer
//! closest-point queries and to be attributed back to a triangle index
//! afterwards.

use crate::accel::aabb::{Aabb, HasAabb};
use crate::accel::bvh::ClosestPoint;
use crate::core::types::{Number, Point3, Vector3};

#[derive(Copy, Clone, Debug)]
pub struct Triangle {
    pub positions: [Point3; 3],
    /// Index of this triangle within the owning mesh's `triangles` array.
    pub index: usize,
}

impl Triangle {
    pub fn new(positions: [Point3; 3], index: usize) -> Self { Self { positions, index } }

    /// Unnormalised normal (`(b-a) x (c-a)`); length is twice the triangle area.
    pub fn normal_unnormalized(&self) -> Vector3 {
        let [a, b, c] = self.positions;
        Vector3::cross(b - a, c - a)
    }

    /// Unit normal, or `None` for a degenerate (zero-area) triangle.
    pub fn normal(&self) -> Option<Vector3> { self.normal_unnormalized().try_normalize() }

    pub fn area(&self) -> Number { self.normal_unnormalized().length() / 2.0 }

    /// Closest point to `p` on the (filled) triangle, via barycentric
    /// clamping of the projection onto the triangle's plane.
    ///
    /// Standard real-time-rendering closest-point-on-triangle routine:
    /// project onto the plane, then clamp into the triangle by checking
    /// the three vertex/edge Voronoi regions.
    pub fn closest_point_on(&self, p: Point3) -> Point3 {
        let [a, b, c] = self.positions;
        let ab = b - a;
        let ac = c - a;
        let ap = p - a;

        let d1 = Vector3::dot(ab, ap);
        let d2 = Vector3::dot(ac, ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - b;
        let d3 = Vector3::dot(ab, bp);
        let d4 = Vector3::dot(ac, bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + ab * v;
        }

        let cp = p - c;
        let d5 = Vector3::dot(ab, cp);
        let d6 = Vector3::dot(ac, cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        a + ab * v + ac * w
    }
}

impl HasAabb for Triangle {
    fn aabb(&self) -> Aabb {
        Aabb::encompass_points(self.positions).with_min_padding(1e-9)
    }
}

impl ClosestPoint for Triangle {
    fn closest_point(&self, query: Point3) -> (Point3, Number) {
        let point = self.closest_point_on(query);
        (point, (point - query).length())
    }
}
