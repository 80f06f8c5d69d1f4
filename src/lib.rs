//! Rigid registration and clearance verification between a finished last
//! surface (the target) and candidate blank surfaces.
//!
//! This crate is the geometric matching engine only: it consumes triangle
//! meshes (vertex array + triangle-index array) already produced by an
//! outer CAD/ingest layer, and emits numeric results. It performs no file
//! I/O and installs no global state.

pub mod accel;
pub mod batch;
pub mod clearance;
pub mod core;
pub mod descriptor;
pub mod feature;
pub mod mesh;
pub mod registration;
pub mod sample;
pub mod sdf;
pub mod section;
pub mod shared;
