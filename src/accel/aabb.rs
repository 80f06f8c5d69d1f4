//! **Axis-Aligned Bounding Box** (AABB), used to accelerate closest-point and
//! nearest-neighbour queries by letting the BVH/KD-tree skip subtrees that
//! obviously can't contain the answer.

use crate::core::types::{Number, Point3, Vector3};
use getset::CopyGetters;
use std::borrow::Borrow;

/// The box spans between the two corners `min` and `max`.
#[derive(CopyGetters, Copy, Clone, Debug, PartialEq)]
#[getset(get_copy = "pub")]
pub struct Aabb {
    /// The lower corner of the [Aabb]; the corner with the smallest coordinates.
    min: Point3,
    /// The upper corner of the [Aabb]; the corner with the largest coordinates.
    max: Point3,
}

pub trait HasAabb {
    fn aabb(&self) -> Aabb;
}

// region Constructors

impl Aabb {
    pub fn new(a: Point3, b: Point3) -> Self {
        let min = Point3::min(a, b);
        let max = Point3::max(a, b);
        Self { min, max }
    }

    /// Returns an [Aabb] that surrounds the two given boxes.
    pub fn encompass(a: impl Borrow<Self>, b: impl Borrow<Self>) -> Self {
        let (a, b) = (a.borrow(), b.borrow());
        Self::new(Point3::min(a.min, b.min), Point3::max(a.max, b.max))
    }

    /// [`Self::encompass`] but for an arbitrary number of boxes.
    pub fn encompass_iter<B: Borrow<Self>>(iter: impl IntoIterator<Item = B>) -> Self {
        let mut min = Point3::splat(Number::INFINITY);
        let mut max = Point3::splat(Number::NEG_INFINITY);
        for b in iter {
            let b = b.borrow();
            min = Point3::min(min, b.min);
            max = Point3::max(max, b.max);
        }
        Self { min, max }
    }

    /// [`Self::encompass`] but for an arbitrary number of points.
    pub fn encompass_points<B: Borrow<Point3>>(iter: impl IntoIterator<Item = B>) -> Self {
        let mut min = Point3::splat(Number::INFINITY);
        let mut max = Point3::splat(Number::NEG_INFINITY);
        for p in iter {
            let p = *p.borrow();
            min = Point3::min(min, p);
            max = Point3::max(max, p);
        }
        Self { min, max }
    }

    /// Ensures every side of the AABB is at least `thresh` thick, expanding
    /// away from the centre if needed. Used for degenerate (planar) triangles.
    pub fn with_min_padding(&self, thresh: Number) -> Self {
        let centre = self.center();
        let half = self.size() / 2.0;
        let half = Vector3::new(half.x().max(thresh / 2.0), half.y().max(thresh / 2.0), half.z().max(thresh / 2.0));
        Self::new(centre - half, centre + half)
    }
}

// endregion Constructors

// region Helpers

impl Aabb {
    pub fn corners(&self) -> [Point3; 8] {
        let (l, h) = (self.min, self.max);
        [
            Point3::new(l.x(), l.y(), l.z()),
            Point3::new(l.x(), l.y(), h.z()),
            Point3::new(l.x(), h.y(), l.z()),
            Point3::new(l.x(), h.y(), h.z()),
            Point3::new(h.x(), l.y(), l.z()),
            Point3::new(h.x(), l.y(), h.z()),
            Point3::new(h.x(), h.y(), l.z()),
            Point3::new(h.x(), h.y(), h.z()),
        ]
    }

    pub fn size(&self) -> Vector3 { self.max - self.min }
    pub fn center(&self) -> Point3 { self.min + (self.max - self.min) / 2.0 }
    pub fn volume(&self) -> Number {
        let s = self.size();
        s.x() * s.y() * s.z()
    }
    pub fn area(&self) -> Number {
        let s = self.size();
        2.0 * (s.x() * s.y() + s.y() * s.z() + s.z() * s.x())
    }
}

// endregion Helpers

impl Aabb {
    /// Unsigned distance from `p` to the nearest point on (or in) this box. Zero if `p` is inside.
    pub fn distance_to_point(&self, p: Point3) -> Number {
        let dx = (self.min.x() - p.x()).max(0.0).max(p.x() - self.max.x());
        let dy = (self.min.y() - p.y()).max(0.0).max(p.y() - self.max.y());
        let dz = (self.min.z() - p.z()).max(0.0).max(p.z() - self.max.z());
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}
