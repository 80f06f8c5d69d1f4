//! Crate-wide error type for fatal, call-boundary failures.
//!
//! Shape/validation problems and resource limits are [`CoreError`]s,
//! returned as `Result::Err` from the
//! ingest/top-level layer. Numeric degeneracies encountered *inside* a
//! geometric operation (undefined normals, empty bands, no interior samples)
//! are never errors — they are represented as data in the corresponding
//! result type (see `clearance`, `registration`).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("vertex array and triangle index array have inconsistent lengths: {vertices} vertices, {triangles} triangles referencing them")]
    ShapeMismatch { vertices: usize, triangles: usize },

    #[error("triangle {triangle} references vertex index {index}, but the mesh only has {num_vertices} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        num_vertices: usize,
    },

    #[error("mesh must have at least one vertex")]
    EmptyMesh,

    #[error("parameter `{name}` must be > 0, got {value}")]
    NonPositiveParameter { name: &'static str, value: f64 },

    #[error("parameter `{name}` must be >= 0, got {value}")]
    NegativeParameter { name: &'static str, value: f64 },

    #[error("parameter `{name}` must be >= 1, got {value}")]
    SubUnitParameter { name: &'static str, value: usize },

    #[error(
        "voxel grid of {nx}x{ny}x{nz} = {total} cells exceeds the implementation cap of {cap}; choose a larger `voxel` or smaller `band_mm`"
    )]
    VoxelGridTooLarge {
        nx: usize,
        ny: usize,
        nz: usize,
        total: u64,
        cap: u64,
    },
}

pub type CoreResult<T> = Result<T, CoreError>;
