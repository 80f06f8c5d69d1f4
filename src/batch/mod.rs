//! Batch driver (component C15): runs the mirror-aware aligner followed by
//! either clearance evaluator over many candidates, with bounded
//! parallelism and per-item error isolation.

use crate::clearance::{clearance_sampling, clearance_sdf_volume, ClearanceParams, SamplingReport, VoxelParams, VoxelVerdict};
use crate::core::error::{CoreError, CoreResult};
use crate::core::targets;
use crate::core::types::Number;
use crate::mesh::TriMesh;
use crate::registration::{align_icp_with_mirror, RegistrationParams, RigidTransform};
use rayon::prelude::*;
use std::panic::AssertUnwindSafe;

/// Parameters controlling the batch driver's worker pool.
///
/// `threads = None` lets `rayon` pick automatically (its default: one
/// worker per logical CPU), matching spec §6's `threads = -1` convention.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchParams {
    pub threads: Option<usize>,
}

impl BatchParams {
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(0) = self.threads {
            return Err(CoreError::SubUnitParameter { name: "threads", value: 0 });
        }
        Ok(())
    }
}

/// One candidate's outcome: either it ran to completion (against either
/// clearance evaluator), or it failed and is reported instead of aborting
/// the batch.
#[derive(Clone, Debug)]
pub enum BatchOutcome {
    Sampling { transform: RigidTransform, chamfer: Number, mirrored: bool, report: SamplingReport },
    Voxel { transform: RigidTransform, chamfer: Number, mirrored: bool, verdict: VoxelVerdict },
    Error { message: String },
}

impl BatchOutcome {
    /// `true` for a verdict that is both well-formed and passing; `false`
    /// for a verdict that ran but failed, or one that didn't run at all.
    pub fn passed(&self) -> bool {
        match self {
            BatchOutcome::Sampling { report, .. } => report.pass,
            BatchOutcome::Voxel { verdict, .. } => verdict.pass,
            BatchOutcome::Error { .. } => false,
        }
    }
}

/// A batch record tied back to its input position; `index` always matches
/// the candidate's position in the input slice, regardless of worker
/// completion order.
#[derive(Clone, Debug)]
pub struct BatchRecord {
    pub index: usize,
    pub outcome: BatchOutcome,
}

fn run_pool<T: Send>(params: &BatchParams, f: impl FnOnce() -> T + Send) -> CoreResult<T> {
    params.validate()?;
    match params.threads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|_| CoreError::SubUnitParameter { name: "threads", value: n })?;
            Ok(pool.install(f))
        }
        None => Ok(f()),
    }
}

/// Per-candidate pipeline C7 -> C9: mirror-aware alignment followed by the
/// surface-sample clearance evaluator, with `clearance + safety_delta` as
/// the pass threshold (spec §4.15, §9).
pub fn batch_align_and_check(
    target: &TriMesh,
    candidates: &[TriMesh],
    reg: &RegistrationParams,
    clr: &ClearanceParams,
    batch: &BatchParams,
) -> CoreResult<Vec<BatchRecord>> {
    reg.validate()?;
    clr.validate()?;

    run_pool(batch, || {
        candidates
            .par_iter()
            .enumerate()
            .map(|(index, candidate)| {
                let outcome = run_candidate(index, target, candidate, reg, |aligned, transform, chamfer, mirrored| {
                    let report = clearance_sampling(target, aligned, clr);
                    BatchOutcome::Sampling { transform, chamfer, mirrored, report }
                });
                BatchRecord { index, outcome }
            })
            .collect()
    })
}

/// Per-candidate pipeline C7 -> C10: mirror-aware alignment followed by the
/// authoritative voxel narrow-band verifier.
pub fn batch_formal_check(
    target: &TriMesh,
    candidates: &[TriMesh],
    reg: &RegistrationParams,
    clearance: Number,
    voxel: &VoxelParams,
    batch: &BatchParams,
) -> CoreResult<Vec<BatchRecord>> {
    reg.validate()?;
    voxel.validate()?;

    run_pool(batch, || {
        candidates
            .par_iter()
            .enumerate()
            .map(|(index, candidate)| {
                let outcome = run_candidate(index, target, candidate, reg, |aligned, transform, chamfer, mirrored| {
                    match clearance_sdf_volume(target, aligned, clearance, voxel) {
                        Ok(verdict) => BatchOutcome::Voxel { transform, chamfer, mirrored, verdict },
                        Err(e) => BatchOutcome::Error { message: e.to_string() },
                    }
                });
                BatchRecord { index, outcome }
            })
            .collect()
    })
}

/// Runs one candidate's C7 -> evaluator pipeline: aligns `candidate` onto
/// `target`, applies the resulting transform to the candidate's vertices,
/// and hands the *aligned* mesh (plus transform, Chamfer and mirror flag)
/// to `evaluate`. Isolates any panic (e.g. an internal invariant violated
/// by a pathological candidate) to this slot, per spec §7's per-candidate
/// failure isolation.
fn run_candidate(
    index: usize,
    target: &TriMesh,
    candidate: &TriMesh,
    reg: &RegistrationParams,
    evaluate: impl FnOnce(&TriMesh, RigidTransform, Number, bool) -> BatchOutcome,
) -> BatchOutcome {
    if target.is_empty() || candidate.is_empty() {
        return BatchOutcome::Error { message: "target or candidate mesh is empty".to_string() };
    }

    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
        let (transform, chamfer, mirrored) = align(target, candidate, reg);
        let aligned = apply_transform(candidate, &transform);
        evaluate(&aligned, transform, chamfer, mirrored)
    }));
    match result {
        Ok(outcome) => {
            tracing::info!(target: targets::BATCH, index, passed = outcome.passed(), "candidate processed");
            outcome
        }
        Err(_) => {
            tracing::warn!(target: targets::BATCH, index, "candidate raised an internal error");
            BatchOutcome::Error { message: format!("candidate {index} failed: internal error") }
        }
    }
}

/// Runs the mirror-aware aligner and returns the transform, Chamfer score
/// and mirror flag for `candidate` onto `target`.
fn align(target: &TriMesh, candidate: &TriMesh, reg: &RegistrationParams) -> (RigidTransform, Number, bool) {
    let result = align_icp_with_mirror(candidate, target, reg);
    (result.transform, result.chamfer, result.mirrored)
}

/// Applies `transform` to every vertex of `mesh`, re-ingesting the result
/// (topology is untouched by a rigid motion, so cleanup is a no-op beyond
/// re-validating the invariant).
fn apply_transform(mesh: &TriMesh, transform: &RigidTransform) -> TriMesh {
    let vertices: Vec<_> = mesh.vertices().iter().map(|&p| transform.apply_point(p)).collect();
    TriMesh::ingest(vertices, mesh.triangles().to_vec()).expect("transforming a valid mesh stays valid")
}
