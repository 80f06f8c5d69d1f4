//! Thin-region clusterer & anatomical labeller (component C12).

use crate::core::types::{Number, Point3, Vector3};
use crate::feature::pca::{covariance, eigen_symmetric_3x3};
use crate::mesh::TriMesh;
use crate::sdf::SdfScene;

#[derive(Clone, Debug, PartialEq)]
pub struct ThinRegion {
    pub indices: Vec<usize>,
    pub min_clearance: Number,
    pub centroid: Point3,
    pub endpoints: (Point3, Point3),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabelledThinRegion {
    pub region: ThinRegion,
    pub label: String,
}

/// Selects target vertices interior to the candidate with clearance under
/// `thr_mm`, then greedily partitions them into connected clusters under a
/// `radius_mm` linking distance.
pub fn thin_regions(target: &TriMesh, candidate: &TriMesh, thr_mm: Number, radius_mm: Number) -> Vec<ThinRegion> {
    let scene = SdfScene::build(candidate);
    if scene.is_empty() {
        return Vec::new();
    }

    let signed: Vec<Number> = target.vertices().iter().map(|&v| scene.signed_distance(v)).collect();
    let thin_indices: Vec<usize> = (0..signed.len()).filter(|&i| signed[i] <= 0.0 && signed[i].abs() < thr_mm).collect();

    greedy_radius_cluster(&thin_indices, target.vertices(), radius_mm)
        .into_iter()
        .map(|cluster| {
            let min_clearance = cluster.iter().map(|&i| signed[i].abs()).fold(Number::INFINITY, Number::min);
            let points: Vec<Point3> = cluster.iter().map(|&i| target.vertices()[i]).collect();
            let centroid = centroid_of(&points);
            let endpoints = pca_endpoints(&points, centroid);
            ThinRegion { indices: cluster, min_clearance, centroid, endpoints }
        })
        .collect()
}

/// Greedy connected-component clustering under a fixed link radius: seed
/// with the first unlabeled index, repeatedly absorb any unlabeled point
/// within `r` of an already-included one, until fixpoint, then start a new
/// cluster. `O(n^2)` worst case, acceptable for the modest
/// thin-vertex counts this selects.
fn greedy_radius_cluster(indices: &[usize], vertices: &[Point3], r: Number) -> Vec<Vec<usize>> {
    let mut remaining: Vec<usize> = indices.to_vec();
    let mut clusters = Vec::new();

    while !remaining.is_empty() {
        let seed = remaining.remove(0);
        let mut cluster = vec![seed];
        let mut frontier = vec![seed];

        while let Some(i) = frontier.pop() {
            let vi = vertices[i];
            let mut j = 0;
            while j < remaining.len() {
                let vj = vertices[remaining[j]];
                if (vi - vj).length() <= r {
                    let absorbed = remaining.remove(j);
                    cluster.push(absorbed);
                    frontier.push(absorbed);
                } else {
                    j += 1;
                }
            }
        }

        clusters.push(cluster);
    }

    clusters
}

fn centroid_of(points: &[Point3]) -> Point3 {
    let sum = points.iter().fold(Vector3::ZERO, |acc, &p| acc + p.to_vector());
    (sum / points.len() as Number).to_point()
}

/// Dominant-axis endpoints of a cluster: project each point onto the
/// largest-eigenvalue eigenvector of the cluster's covariance, and take the
/// extreme projections.
fn pca_endpoints(points: &[Point3], centroid: Point3) -> (Point3, Point3) {
    if points.len() < 2 {
        let p = points.first().copied().unwrap_or(centroid);
        return (p, p);
    }
    let (cov, _) = covariance(points).expect("non-empty cluster");
    let (_, eigenvectors) = eigen_symmetric_3x3(cov);
    let dominant = eigenvectors[2];

    let mut min_proj = Number::INFINITY;
    let mut max_proj = Number::NEG_INFINITY;
    let mut p_min = points[0];
    let mut p_max = points[0];
    for &p in points {
        let proj = Vector3::dot(p - centroid, dominant);
        if proj < min_proj {
            min_proj = proj;
            p_min = p;
        }
        if proj > max_proj {
            max_proj = proj;
            p_max = p;
        }
    }
    (p_min, p_max)
}

/// Anatomical labelling (C12b). PCA on the *whole* target vertex set fixes
/// the length axis (largest variance, toe/heel) and width axis (second
/// largest, medial/lateral); each region is labelled by the sign of its
/// centroid's displacement from the target centroid along those axes.
pub fn label_regions(target: &TriMesh, regions: &[ThinRegion]) -> Vec<LabelledThinRegion> {
    let (cov, mean) = covariance(target.vertices()).expect("labelling requires a non-empty target");
    let (_, eigenvectors) = eigen_symmetric_3x3(cov);
    let length_axis = eigenvectors[2];
    let width_axis = eigenvectors[1];

    regions
        .iter()
        .map(|region| {
            let d = region.centroid - mean;
            let length_label = if Vector3::dot(length_axis, d) > 0.0 { "toe" } else { "heel" };
            let width_label = if Vector3::dot(width_axis, d) > 0.0 { "lateral" } else { "medial" };
            LabelledThinRegion { region: region.clone(), label: format!("{length_label}/{width_label}") }
        })
        .collect()
}
