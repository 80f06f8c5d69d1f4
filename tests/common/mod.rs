use lastfit_core::core::types::Point3;
use lastfit_core::mesh::TriMesh;

/// Axis-aligned cube of the given half-extent, centred on the origin, with
/// outward-facing triangle winding throughout.
pub fn cube(half_extent: f64) -> TriMesh {
    let h = half_extent;
    let v = vec![
        Point3::new(-h, -h, -h),
        Point3::new(h, -h, -h),
        Point3::new(h, h, -h),
        Point3::new(-h, h, -h),
        Point3::new(-h, -h, h),
        Point3::new(h, -h, h),
        Point3::new(h, h, h),
        Point3::new(-h, h, h),
    ];
    let f = vec![
        [0, 2, 1], [0, 3, 2], // bottom (-z)
        [4, 5, 6], [4, 6, 7], // top (+z)
        [0, 1, 5], [0, 5, 4], // front (-y)
        [2, 3, 7], [2, 7, 6], // back (+y)
        [1, 2, 6], [1, 6, 5], // right (+x)
        [0, 4, 7], [0, 7, 3], // left (-x)
    ];
    TriMesh::ingest(v, f).unwrap()
}

/// Axis-aligned box with independent per-axis half-extents, centred on the
/// origin, with the same outward winding as [`cube`].
pub fn box_mesh(hx: f64, hy: f64, hz: f64) -> TriMesh {
    let v = vec![
        Point3::new(-hx, -hy, -hz),
        Point3::new(hx, -hy, -hz),
        Point3::new(hx, hy, -hz),
        Point3::new(-hx, hy, -hz),
        Point3::new(-hx, -hy, hz),
        Point3::new(hx, -hy, hz),
        Point3::new(hx, hy, hz),
        Point3::new(-hx, hy, hz),
    ];
    let f = vec![
        [0, 2, 1], [0, 3, 2],
        [4, 5, 6], [4, 6, 7],
        [0, 1, 5], [0, 5, 4],
        [2, 3, 7], [2, 7, 6],
        [1, 2, 6], [1, 6, 5],
        [0, 4, 7], [0, 7, 3],
    ];
    TriMesh::ingest(v, f).unwrap()
}

/// A box like [`box_mesh`], but with its `+x` face pushed inward to
/// `hx - dent`. Used for the thin-region scenario, where clearance must
/// collapse on that one face and stay large elsewhere.
pub fn box_with_dented_face(hx: f64, hy: f64, hz: f64, dent: f64) -> TriMesh {
    let v = vec![
        Point3::new(-hx, -hy, -hz),
        Point3::new(hx - dent, -hy, -hz),
        Point3::new(hx - dent, hy, -hz),
        Point3::new(-hx, hy, -hz),
        Point3::new(-hx, -hy, hz),
        Point3::new(hx - dent, -hy, hz),
        Point3::new(hx - dent, hy, hz),
        Point3::new(-hx, hy, hz),
    ];
    let f = vec![
        [0, 2, 1], [0, 3, 2],
        [4, 5, 6], [4, 6, 7],
        [0, 1, 5], [0, 5, 4],
        [2, 3, 7], [2, 7, 6],
        [1, 2, 6], [1, 6, 5],
        [0, 4, 7], [0, 7, 3],
    ];
    TriMesh::ingest(v, f).unwrap()
}

/// A crude asymmetric "foot-like" wedge: longer and taller on `-x`, so that
/// its YZ mirror is distinguishable from the original by Chamfer distance.
pub fn asymmetric_wedge() -> TriMesh {
    let v = vec![
        Point3::new(-1.5, -0.4, -0.2), // toe, medial-low
        Point3::new(-1.5, 0.4, -0.2),  // toe, lateral-low
        Point3::new(-1.5, 0.0, 0.3),   // toe, top
        Point3::new(1.0, -0.6, -0.2),  // heel, medial-low
        Point3::new(1.0, 0.6, -0.2),   // heel, lateral-low
        Point3::new(1.0, 0.1, 0.4),    // heel, top (offset +y: breaks mirror symmetry)
    ];
    let f = vec![
        [0, 1, 2],
        [3, 5, 4],
        [0, 3, 4], [0, 4, 1],
        [1, 4, 5], [1, 5, 2],
        [2, 5, 3], [2, 3, 0],
    ];
    TriMesh::ingest(v, f).unwrap()
}
