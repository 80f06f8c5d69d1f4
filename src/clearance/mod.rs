//! Clearance evaluation: the surface-sample evaluator (C9), the voxel
//! narrow-band verifier (C10), the thinnest-point locator (C11), and the
//! thin-region clusterer/labeller (C12).

pub mod regions;
pub mod sampling;
pub mod thinnest;
pub mod voxel;

pub use regions::{label_regions, thin_regions, LabelledThinRegion, ThinRegion};
pub use sampling::{clearance_sampling, SamplingReport};
pub use thinnest::{min_clearance_point, ThinnestPoint};
pub use voxel::{clearance_sdf_volume, VoxelVerdict};

use crate::core::error::{CoreError, CoreResult};
use crate::core::types::Number;

/// Parameters for the surface-sample clearance evaluator (C9).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClearanceParams {
    pub clearance: Number,
    pub safety_delta: Number,
    pub samples: usize,
}

impl Default for ClearanceParams {
    fn default() -> Self { Self { clearance: 0.0, safety_delta: 0.0, samples: 5000 } }
}

impl ClearanceParams {
    pub fn validate(&self) -> CoreResult<()> {
        if self.clearance < 0.0 {
            return Err(CoreError::NegativeParameter { name: "clearance", value: self.clearance });
        }
        if self.safety_delta < 0.0 {
            return Err(CoreError::NegativeParameter { name: "safety_delta", value: self.safety_delta });
        }
        if self.samples < 1 {
            return Err(CoreError::SubUnitParameter { name: "samples", value: self.samples });
        }
        Ok(())
    }
}

/// Parameters for the voxel narrow-band verifier (C10). Defaults
/// (`voxel = 0.30`, `band_mm = 8.0`) suit blank-clearance checks at shoe-last
/// scale.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VoxelParams {
    pub voxel: Number,
    pub band_mm: Number,
}

impl Default for VoxelParams {
    fn default() -> Self { Self { voxel: 0.30, band_mm: 8.0 } }
}

impl VoxelParams {
    pub fn validate(&self) -> CoreResult<()> {
        if self.voxel <= 0.0 {
            return Err(CoreError::NonPositiveParameter { name: "voxel", value: self.voxel });
        }
        if self.band_mm <= 0.0 {
            return Err(CoreError::NonPositiveParameter { name: "band_mm", value: self.band_mm });
        }
        Ok(())
    }
}
