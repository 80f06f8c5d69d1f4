//! Mesh ingest & cleanup, and the triangle-mesh data type itself.
//!
//! [`TriMesh::ingest`] is the only public constructor: every other module in
//! this crate (sampling, the SDF oracle, sectioning) assumes cleanup has
//! already run, so there is no way to build a `TriMesh` that skips it.

pub mod triangle;

pub use triangle::Triangle;

use crate::core::error::{CoreError, CoreResult};
use crate::core::types::Point3;
use std::collections::{HashMap, HashSet};

/// A triangle mesh: an ordered vertex array and an ordered triangle index
/// array. When `triangles` is empty the mesh degenerates to a point set.
#[derive(Clone, Debug, Default)]
pub struct TriMesh {
    vertices: Vec<Point3>,
    triangles: Vec<[u32; 3]>,
}

impl TriMesh {
    pub fn vertices(&self) -> &[Point3] { &self.vertices }

    pub fn triangles(&self) -> &[[u32; 3]] { &self.triangles }

    pub fn is_empty(&self) -> bool { self.vertices.is_empty() }

    pub fn triangle_positions(&self, tri: [u32; 3]) -> [Point3; 3] { tri.map(|i| self.vertices[i as usize]) }

    /// Triangles as [`Triangle`] leaves, each tagged with its index into
    /// [`Self::triangles`] — the shape the BVH and SDF oracle consume.
    pub fn iter_triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.triangles
            .iter()
            .enumerate()
            .map(|(index, &tri)| Triangle::new(self.triangle_positions(tri), index))
    }

    /// Ingests a raw `(vertices, triangles)` pair (component C1).
    ///
    /// Validates that every triangle index is in range, then deterministically:
    /// 1. merges bit-identical vertices (remapping triangles to the survivor),
    /// 2. drops triangles with two equal indices or two coincident corners
    ///    (equivalent once step 1 has run),
    /// 3. drops triangles that are index-multiset duplicates of an earlier one,
    /// 4. drops vertices no remaining triangle references.
    ///
    /// Running `ingest` again on the result is a no-op.
    pub fn ingest(vertices: Vec<Point3>, triangles: Vec<[u32; 3]>) -> CoreResult<Self> {
        if vertices.is_empty() && !triangles.is_empty() {
            return Err(CoreError::ShapeMismatch { vertices: 0, triangles: triangles.len() });
        }
        for (t_idx, tri) in triangles.iter().enumerate() {
            for &i in tri {
                if i as usize >= vertices.len() {
                    return Err(CoreError::IndexOutOfRange { triangle: t_idx, index: i, num_vertices: vertices.len() });
                }
            }
        }

        let (vertices, remap) = Self::dedup_vertices(vertices);

        let mut seen = HashSet::with_capacity(triangles.len());
        let mut cleaned = Vec::with_capacity(triangles.len());
        for tri in triangles {
            let tri = tri.map(|i| remap[i as usize]);
            let [a, b, c] = tri;
            if a == b || b == c || c == a {
                continue;
            }
            let mut key = tri;
            key.sort_unstable();
            if seen.insert(key) {
                cleaned.push(tri);
            }
        }

        let (vertices, triangles) = Self::drop_unreferenced(vertices, cleaned);
        Ok(Self { vertices, triangles })
    }

    /// Merges vertices under exact (bit-pattern) equality, keeping the first
    /// occurrence; returns the surviving vertices plus an old-index ->
    /// new-index remap table.
    fn dedup_vertices(vertices: Vec<Point3>) -> (Vec<Point3>, Vec<u32>) {
        let mut unique = Vec::with_capacity(vertices.len());
        let mut index_of: HashMap<[u64; 3], u32> = HashMap::with_capacity(vertices.len());
        let mut remap = Vec::with_capacity(vertices.len());

        for v in vertices {
            let key = v.to_array().map(f64::to_bits);
            let new_index = *index_of.entry(key).or_insert_with(|| {
                let idx = unique.len() as u32;
                unique.push(v);
                idx
            });
            remap.push(new_index);
        }

        (unique, remap)
    }

    /// Drops vertices not referenced by any remaining triangle, remapping
    /// triangle indices to match. A triangle-free mesh keeps every vertex —
    /// it is a valid point-cloud-shaped mesh, not garbage.
    fn drop_unreferenced(vertices: Vec<Point3>, triangles: Vec<[u32; 3]>) -> (Vec<Point3>, Vec<[u32; 3]>) {
        if triangles.is_empty() {
            return (vertices, triangles);
        }

        let mut referenced = vec![false; vertices.len()];
        for tri in &triangles {
            for &i in tri {
                referenced[i as usize] = true;
            }
        }

        let mut remap = vec![0u32; vertices.len()];
        let mut kept = Vec::with_capacity(vertices.len());
        for (old_idx, v) in vertices.into_iter().enumerate() {
            if referenced[old_idx] {
                remap[old_idx] = kept.len() as u32;
                kept.push(v);
            }
        }

        let triangles = triangles.into_iter().map(|tri| tri.map(|i| remap[i as usize])).collect();
        (kept, triangles)
    }
}
