// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Edge incidence and vertex adjacency
//!
//! A single pass over the faces classifies degenerate triangles and, for every
//! other face, counts edge incidence, per-vertex face incidence and collects the
//! edge neighbours of each vertex.

use super::Geometry;
use ahash::{AHashMap, AHashSet};
use nalgebra::Point3;

/// Undirected edge, canonicalized so that `(a, b)` and `(b, a)` are one key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(u64);

impl EdgeKey {
    pub fn new(v0: u32, v1: u32) -> Self {
        let (lo, hi) = if v0 < v1 { (v0, v1) } else { (v1, v0) };
        Self(((lo as u64) << 32) | hi as u64)
    }

    /// Smaller and larger endpoint
    pub fn vertices(&self) -> (u32, u32) {
        ((self.0 >> 32) as u32, self.0 as u32)
    }

    pub fn packed(&self) -> u64 {
        self.0
    }

    pub fn from_packed(packed: u64) -> Self {
        let key = Self(packed);
        let (lo, hi) = key.vertices();
        Self::new(lo, hi)
    }
}

/// The three edges of a face, in winding order
pub fn face_edges(face: [u32; 3]) -> [EdgeKey; 3] {
    [
        EdgeKey::new(face[0], face[1]),
        EdgeKey::new(face[1], face[2]),
        EdgeKey::new(face[2], face[0]),
    ]
}

/// Whether a face repeats a vertex or has (near) zero area
///
/// The area test compares the squared length of the edge cross product against
/// `tolerance²`.
pub fn is_degenerate(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>, tolerance: f64) -> bool {
    let cross = (b - a).cross(&(c - a));
    cross.norm_squared() < tolerance * tolerance
}

/// Degenerate test for a face of `geometry`
pub fn face_is_degenerate(geometry: &Geometry, face: [u32; 3], tolerance: f64) -> bool {
    let [a, b, c] = face;
    if a == b || b == c || a == c {
        return true;
    }
    is_degenerate(
        geometry.position(a as usize),
        geometry.position(b as usize),
        geometry.position(c as usize),
        tolerance,
    )
}

/// Adjacency tables of one geometry
#[derive(Debug, Clone)]
pub struct Adjacency {
    /// Number of faces using each edge
    pub edge_incidence: AHashMap<EdgeKey, u32>,
    /// Number of faces using each vertex
    pub vertex_face_count: Vec<u32>,
    /// Edge neighbours of each vertex
    pub vertex_neighbors: Vec<AHashSet<u32>>,
    /// Faces skipped as degenerate
    pub degenerate_faces: usize,
}

impl Adjacency {
    /// Build the tables in one pass over `geometry`'s faces
    pub fn build(geometry: &Geometry, tolerance: f64) -> Self {
        let vertex_count = geometry.vertex_count();
        let mut edge_incidence: AHashMap<EdgeKey, u32> =
            AHashMap::with_capacity(geometry.face_count() * 3 / 2);
        let mut vertex_face_count = vec![0u32; vertex_count];
        let mut vertex_neighbors = vec![AHashSet::new(); vertex_count];
        let mut degenerate_faces = 0;

        for face in geometry.faces() {
            if face_is_degenerate(geometry, face, tolerance) {
                degenerate_faces += 1;
                continue;
            }

            for &v in &face {
                vertex_face_count[v as usize] += 1;
            }

            for edge in face_edges(face) {
                *edge_incidence.entry(edge).or_insert(0) += 1;
                let (a, b) = edge.vertices();
                vertex_neighbors[a as usize].insert(b);
                vertex_neighbors[b as usize].insert(a);
            }
        }

        Self {
            edge_incidence,
            vertex_face_count,
            vertex_neighbors,
            degenerate_faces,
        }
    }

    /// Faces using `edge`
    pub fn incidence(&self, v0: u32, v1: u32) -> u32 {
        self.edge_incidence
            .get(&EdgeKey::new(v0, v1))
            .copied()
            .unwrap_or(0)
    }

    /// Edges with exactly one face
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_incidence.values().filter(|&&c| c == 1).count()
    }

    /// Edges with more than two faces
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_incidence.values().filter(|&&c| c > 2).count()
    }

    /// Vertices whose incident faces cannot form a single fan
    ///
    /// A fan of `k` faces has `k` distinct neighbours when closed and `k + 1`
    /// when open, so more than `k + 1` neighbours means several fans meet at the
    /// vertex. This is a counting heuristic: a pinched vertex whose counts happen
    /// to match is not detected.
    pub fn non_manifold_vertex_count(&self) -> usize {
        self.vertex_neighbors
            .iter()
            .zip(&self.vertex_face_count)
            .filter(|(neighbors, &faces)| neighbors.len() > faces as usize + 1)
            .count()
    }

    /// Vertices referenced by no (non-degenerate) face
    pub fn unreferenced_vertex_count(&self) -> usize {
        self.vertex_face_count.iter().filter(|&&c| c == 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Geometry {
        Geometry::indexed(
            vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
                0.0, 1.0, 0.0,
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
        .unwrap()
    }

    #[test]
    fn test_edge_key_is_symmetric() {
        assert_eq!(EdgeKey::new(3, 7), EdgeKey::new(7, 3));
        assert_eq!(EdgeKey::new(3, 7).vertices(), (3, 7));
        let packed = EdgeKey::new(9, 2).packed();
        assert_eq!(EdgeKey::from_packed(packed), EdgeKey::new(2, 9));
    }

    #[test]
    fn test_edge_key_handles_large_indices() {
        let key = EdgeKey::new(u32::MAX, u32::MAX - 1);
        assert_eq!(key.vertices(), (u32::MAX - 1, u32::MAX));
    }

    #[test]
    fn test_quad_adjacency() {
        let adjacency = Adjacency::build(&quad(), 1e-6);
        assert_eq!(adjacency.incidence(0, 2), 2);
        assert_eq!(adjacency.incidence(2, 0), 2);
        assert_eq!(adjacency.boundary_edge_count(), 4);
        assert_eq!(adjacency.non_manifold_edge_count(), 0);
        assert_eq!(adjacency.vertex_face_count, vec![2, 1, 2, 1]);
        assert_eq!(adjacency.vertex_neighbors[0].len(), 3);
        assert_eq!(adjacency.non_manifold_vertex_count(), 0);
    }

    #[test]
    fn test_degenerate_faces_do_not_contribute() {
        let geometry = Geometry::indexed(
            vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                2.0, 0.0, 0.0,
            ],
            vec![0, 0, 1, 0, 1, 2],
        )
        .unwrap();
        let adjacency = Adjacency::build(&geometry, 1e-6);
        assert_eq!(adjacency.degenerate_faces, 2);
        assert!(adjacency.edge_incidence.is_empty());
        assert_eq!(adjacency.unreferenced_vertex_count(), 3);
    }

    #[test]
    fn test_bowtie_vertex_is_flagged() {
        // Two triangles touching only at vertex 0
        let geometry = Geometry::indexed(
            vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
                -1.0, 0.0, 0.0, //
                -1.0, -1.0, 0.0,
            ],
            vec![0, 1, 2, 0, 3, 4],
        )
        .unwrap();
        let adjacency = Adjacency::build(&geometry, 1e-6);
        assert_eq!(adjacency.vertex_neighbors[0].len(), 4);
        assert_eq!(adjacency.vertex_face_count[0], 2);
        assert_eq!(adjacency.non_manifold_vertex_count(), 1);
    }
}
