//! Feature-matched RANSAC coarse registration (component C4).

use crate::accel::kdtree::KdTree;
use crate::core::rng;
use crate::core::types::{Number, Point3};
use crate::registration::kabsch;
use crate::registration::transform::RigidTransform;
use crate::sample::PointCloud;
use rand::seq::SliceRandom;

/// Stream tag for RANSAC's correspondence draws; see
/// [`crate::core::rng::seeded_rng`].
pub const RANSAC_STREAM: u64 = 2;

const MAX_ITERATIONS: usize = 8000;
const MAX_VALIDATIONS: usize = 1000;
const CORRESPONDENCES_PER_ITERATION: usize = 4;

/// Coarse rigid alignment of `source` onto `target` by RANSAC over
/// feature-matched correspondences. Both clouds must already
/// carry `fpfh` (see [`crate::feature::featurize`]).
///
/// Fails soft: if no sampled transform ever passes the distance checker,
/// the identity transform is returned.
pub fn coarse_register(source: &PointCloud, target: &PointCloud, voxel: Number) -> RigidTransform {
    let threshold = 3.0 * voxel;

    let (Some(src_fpfh), Some(tgt_fpfh)) = (&source.fpfh, &target.fpfh) else {
        return RigidTransform::identity();
    };
    if source.points.len() < CORRESPONDENCES_PER_ITERATION || target.points.is_empty() {
        return RigidTransform::identity();
    }

    let target_tree = KdTree::build(&target.points);
    let matches = match_features(src_fpfh, tgt_fpfh);

    let mut rng = rng::seeded_rng(RANSAC_STREAM);
    let mut best: Option<(RigidTransform, usize)> = None;
    let mut validations = 0usize;

    let source_indices: Vec<usize> = (0..source.points.len()).collect();

    for _ in 0..MAX_ITERATIONS {
        if validations >= MAX_VALIDATIONS {
            break;
        }

        let draw: Vec<usize> = source_indices.choose_multiple(&mut rng, CORRESPONDENCES_PER_ITERATION).copied().collect();
        if draw.len() < CORRESPONDENCES_PER_ITERATION {
            break;
        }

        let src_pts: Vec<Point3> = draw.iter().map(|&i| source.points[i]).collect();
        let dst_pts: Vec<Point3> = draw.iter().map(|&i| target.points[matches[i]]).collect();

        let Some(candidate) = kabsch::fit(&src_pts, &dst_pts) else {
            continue;
        };

        // Distance checker: every drawn pair must remain within `threshold`
        // after applying the candidate transform.
        let checker_ok = src_pts
            .iter()
            .zip(&dst_pts)
            .all(|(&s, &d)| (candidate.apply_point(s) - d).length() <= threshold);
        if !checker_ok {
            continue;
        }
        validations += 1;

        let inliers = count_inliers(source, &candidate, &target_tree, threshold);
        let better = match &best {
            Some((_, best_inliers)) => inliers > *best_inliers,
            None => true,
        };
        if better {
            best = Some((candidate, inliers));
        }
    }

    best.map(|(t, _)| t).unwrap_or_else(RigidTransform::identity)
}

/// Matches each source point to the target point with the closest FPFH
/// descriptor (brute-force nearest neighbour in 33-d feature space — the
/// descriptor dimensionality is too low to benefit from a tree).
fn match_features(src_fpfh: &[[f32; 33]], tgt_fpfh: &[[f32; 33]]) -> Vec<usize> {
    src_fpfh
        .iter()
        .map(|s| {
            tgt_fpfh
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| feature_distance(s, a).total_cmp(&feature_distance(s, b)))
                .map(|(idx, _)| idx)
                .unwrap_or(0)
        })
        .collect()
}

fn feature_distance(a: &[f32; 33], b: &[f32; 33]) -> f32 { a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum() }

fn count_inliers(source: &PointCloud, transform: &RigidTransform, target_tree: &KdTree, threshold: Number) -> usize {
    source
        .points
        .iter()
        .filter(|&&p| {
            let mapped = transform.apply_point(p);
            target_tree.nearest(mapped).map(|(_, d2)| d2.sqrt() <= threshold).unwrap_or(false)
        })
        .count()
}
