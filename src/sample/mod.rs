//! Point sampling and downsampling (component C2): uniform area-weighted
//! surface sampling of a mesh, and voxel-grid downsampling of a point cloud.

use crate::core::rng;
use crate::core::types::{Number, Point3, Vector3};
use crate::mesh::TriMesh;
use rand::Rng;
use std::collections::HashMap;

/// A cloud of points, optionally carrying per-point unit normals and FPFH
/// feature descriptors (populated by [`crate::feature`]).
#[derive(Clone, Debug, Default)]
pub struct PointCloud {
    pub points: Vec<Point3>,
    pub normals: Option<Vec<Vector3>>,
    pub fpfh: Option<Vec<[f32; 33]>>,
}

impl PointCloud {
    pub fn from_points(points: Vec<Point3>) -> Self { Self { points, normals: None, fpfh: None } }

    pub fn len(&self) -> usize { self.points.len() }

    pub fn is_empty(&self) -> bool { self.points.is_empty() }
}

/// Stream tag for surface-sampling draws; see [`crate::core::rng::seeded_rng`].
pub const SURFACE_SAMPLE_STREAM: u64 = 1;

/// Uniform area-weighted surface sampling. Draws `k` points,
/// each landing on a uniformly-random barycentric coordinate of a triangle
/// chosen with probability proportional to its area. Falls back to
/// returning the mesh's vertices verbatim when it has no triangles (or no
/// triangle has positive area).
pub fn sample_surface(mesh: &TriMesh, k: usize, stream: u64) -> PointCloud {
    if mesh.triangles().is_empty() {
        return PointCloud::from_points(mesh.vertices().to_vec());
    }

    let areas: Vec<Number> = mesh.iter_triangles().map(|t| t.area()).collect();
    let total: Number = areas.iter().sum();
    if total <= 0.0 {
        return PointCloud::from_points(mesh.vertices().to_vec());
    }

    let mut cumulative = Vec::with_capacity(areas.len());
    let mut running = 0.0;
    for a in &areas {
        running += a;
        cumulative.push(running);
    }

    let mut rng = rng::seeded_rng(stream);
    let mut points = Vec::with_capacity(k);
    for _ in 0..k {
        let target = rng.gen::<Number>() * total;
        let tri_idx = cumulative.partition_point(|&c| c < target).min(areas.len() - 1);
        let [a, b, c] = mesh.triangle_positions(mesh.triangles()[tri_idx]);

        let (mut u, mut v): (Number, Number) = (rng.gen(), rng.gen());
        if u + v > 1.0 {
            u = 1.0 - u;
            v = 1.0 - v;
        }
        points.push(a + (b - a) * u + (c - a) * v);
    }

    PointCloud::from_points(points)
}

/// Voxel-grid downsampling: partitions space into cells of side
/// `voxel`, emitting one point per non-empty cell at the centroid of the
/// points it contains.
pub fn voxel_downsample(cloud: &PointCloud, voxel: Number) -> PointCloud {
    debug_assert!(voxel > 0.0, "voxel size must be positive");

    let mut cells: HashMap<(i64, i64, i64), (Vector3, usize)> = HashMap::new();
    for &p in &cloud.points {
        let key = ((p.x() / voxel).floor() as i64, (p.y() / voxel).floor() as i64, (p.z() / voxel).floor() as i64);
        let entry = cells.entry(key).or_insert((Vector3::ZERO, 0));
        entry.0 += p.to_vector();
        entry.1 += 1;
    }

    let mut points: Vec<Point3> =
        cells.into_values().map(|(sum, count)| (sum / count as Number).to_point()).collect();
    // HashMap iteration order isn't stable across runs; a fixed output
    // ordering keeps downstream equality-based tests reproducible even
    // though ICP/FPFH themselves are permutation-invariant over the cloud.
    points.sort_unstable_by(|a, b| a.to_array().partial_cmp(&b.to_array()).expect("coordinates should not be nan"));

    PointCloud::from_points(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Point3;
    use approx::assert_relative_eq;

    fn unit_triangle_mesh() -> TriMesh {
        let v = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
        TriMesh::ingest(v, vec![[0, 1, 2]]).unwrap()
    }

    #[test]
    fn sample_surface_stays_within_the_triangle() {
        let mesh = unit_triangle_mesh();
        let cloud = sample_surface(&mesh, 200, SURFACE_SAMPLE_STREAM);
        assert_eq!(cloud.len(), 200);
        for p in cloud.points {
            assert!(p.x() >= -1e-9 && p.y() >= -1e-9 && p.x() + p.y() <= 1.0 + 1e-9);
            assert_relative_eq!(p.z(), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn sample_surface_is_deterministic() {
        let mesh = unit_triangle_mesh();
        let a = sample_surface(&mesh, 50, SURFACE_SAMPLE_STREAM);
        let b = sample_surface(&mesh, 50, SURFACE_SAMPLE_STREAM);
        for (pa, pb) in a.points.iter().zip(b.points.iter()) {
            assert_relative_eq!(pa.x(), pb.x());
            assert_relative_eq!(pa.y(), pb.y());
            assert_relative_eq!(pa.z(), pb.z());
        }
    }

    #[test]
    fn voxel_downsample_merges_nearby_points() {
        let cloud = PointCloud::from_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.01, 0.0, 0.0),
            Point3::new(5.0, 5.0, 5.0),
        ]);
        let down = voxel_downsample(&cloud, 0.1);
        assert_eq!(down.len(), 2);
    }
}
