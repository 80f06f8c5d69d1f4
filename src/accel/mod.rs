//! Spatial acceleration structures used by the registration and clearance
//! pipelines: an axis-aligned bounding box primitive, a bounding volume
//! hierarchy over mesh triangles (closest-point queries for the SDF oracle),
//! and a k-d tree over point clouds (nearest-neighbour queries for ICP and
//! FPFH).

pub mod aabb;
pub mod bvh;
pub mod kdtree;

pub use aabb::{Aabb, HasAabb};
