//! Mesh-plane section (component C13): triangle/plane intersection,
//! producing line segments.

use crate::core::types::{Number, Point3, Vector3};
use crate::mesh::TriMesh;

#[derive(Copy, Clone, Debug)]
pub struct Plane {
    pub point: Point3,
    pub normal: Vector3,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment(pub Point3, pub Point3);

/// Intersects every triangle of `mesh` with `plane`, emitting one segment
/// per triangle that the plane strictly crosses. Triangles
/// entirely on one (strict) side, and triangles with a vertex exactly on
/// the plane, contribute no segment — the latter is a documented
/// limitation, not an omission.
pub fn mesh_section(mesh: &TriMesh, plane: Plane) -> Vec<Segment> {
    mesh.iter_triangles().filter_map(|tri| section_triangle(tri.positions, plane)).collect()
}

fn section_triangle(positions: [Point3; 3], plane: Plane) -> Option<Segment> {
    let d: [Number; 3] = positions.map(|v| Vector3::dot(plane.normal, v - plane.point));

    if d.iter().all(|&x| x > 0.0) || d.iter().all(|&x| x < 0.0) {
        return None;
    }

    let edges = [(0usize, 1usize), (1, 2), (2, 0)];
    let mut crossings = Vec::with_capacity(2);
    for (i, j) in edges {
        let (di, dj) = (d[i], d[j]);
        if (di > 0.0 && dj < 0.0) || (di < 0.0 && dj > 0.0) {
            let t = di / (di - dj);
            crossings.push(positions[i] + (positions[j] - positions[i]) * t);
        }
    }

    match crossings.as_slice() {
        [a, b] => Some(Segment(*a, *b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planar_triangle_at_z0() -> TriMesh {
        let v = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
        TriMesh::ingest(v, vec![[0, 1, 2]]).unwrap()
    }

    /// A triangle spanning `z` from `-1` to `1`, so a plane at `z = -0.5`
    /// strictly separates one vertex from the other two instead of missing
    /// the triangle entirely.
    fn triangle_spanning_z() -> TriMesh {
        let v = vec![Point3::new(0.0, 0.0, -1.0), Point3::new(1.0, 0.0, 1.0), Point3::new(0.0, 1.0, 1.0)];
        TriMesh::ingest(v, vec![[0, 1, 2]]).unwrap()
    }

    #[test]
    fn coplanar_triangle_emits_no_segment() {
        let mesh = planar_triangle_at_z0();
        let plane = Plane { point: Point3::new(0.0, 0.0, 0.0), normal: Vector3::Z };
        assert!(mesh_section(&mesh, plane).is_empty());
    }

    #[test]
    fn offset_plane_emits_one_segment() {
        let mesh = triangle_spanning_z();
        let plane = Plane { point: Point3::new(0.0, 0.0, -0.5), normal: Vector3::Z };
        let segments = mesh_section(&mesh, plane);
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn strictly_separating_plane_through_unit_tetrahedron_face_emits_one_segment() {
        let v = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let mesh = TriMesh::ingest(v, vec![[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]]).unwrap();
        let plane = Plane { point: Point3::new(0.25, 0.25, 0.25), normal: Vector3::new(1.0, 1.0, 1.0) };
        // The plane strictly separates vertex 0 from the other three.
        let segments = mesh_section(&mesh, plane);
        assert_eq!(segments.len(), 3);
    }
}
