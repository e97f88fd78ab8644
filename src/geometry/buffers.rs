// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle geometry buffers
//!
//! `Geometry` owns flattened position, normal and uv buffers plus an optional
//! index buffer. Every constructor checks the buffer invariants, and the repair
//! passes never patch fields in place: they rebuild a whole new `Geometry` so the
//! attribute arrays cannot drift out of step with the positions.

use crate::error::GeometryError;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Triangle geometry with parallel vertex attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    positions: Vec<f64>,
    normals: Option<Vec<f64>>,
    uvs: Option<Vec<f64>>,
    indices: Option<Vec<u32>>,
}

impl Geometry {
    /// Create indexed geometry
    pub fn indexed(positions: Vec<f64>, indices: Vec<u32>) -> Result<Self, GeometryError> {
        Self::new(positions, None, None, Some(indices))
    }

    /// Create non-indexed geometry: every three consecutive vertices form a triangle
    pub fn non_indexed(positions: Vec<f64>) -> Result<Self, GeometryError> {
        Self::new(positions, None, None, None)
    }

    /// Create geometry from all buffers, validating every invariant
    pub fn new(
        positions: Vec<f64>,
        normals: Option<Vec<f64>>,
        uvs: Option<Vec<f64>>,
        indices: Option<Vec<u32>>,
    ) -> Result<Self, GeometryError> {
        if positions.len() % 3 != 0 {
            return Err(GeometryError::PositionLength(positions.len()));
        }
        let vertex_count = positions.len() / 3;

        if let Some(normals) = &normals {
            check_attribute("normal", normals.len(), vertex_count * 3)?;
        }
        if let Some(uvs) = &uvs {
            check_attribute("uv", uvs.len(), vertex_count * 2)?;
        }

        match &indices {
            Some(indices) => {
                if indices.len() % 3 != 0 {
                    return Err(GeometryError::IndexLength(indices.len()));
                }
                if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                    return Err(GeometryError::IndexOutOfRange {
                        index,
                        vertex_count,
                    });
                }
            }
            None => {
                if vertex_count % 3 != 0 {
                    return Err(GeometryError::IncompleteTriangle(vertex_count));
                }
            }
        }

        Ok(Self {
            positions,
            normals,
            uvs,
            indices,
        })
    }

    /// Assemble buffers produced inside the crate; invariants are only
    /// re-checked in debug builds
    pub(crate) fn from_trusted(
        positions: Vec<f64>,
        normals: Option<Vec<f64>>,
        uvs: Option<Vec<f64>>,
        indices: Option<Vec<u32>>,
    ) -> Self {
        let geometry = Self {
            positions,
            normals,
            uvs,
            indices,
        };
        debug_assert!(geometry.check().is_ok(), "inconsistent geometry buffers");
        geometry
    }

    /// Attach a normal buffer
    pub fn with_normals(mut self, normals: Vec<f64>) -> Result<Self, GeometryError> {
        check_attribute("normal", normals.len(), self.positions.len())?;
        self.normals = Some(normals);
        Ok(self)
    }

    /// Attach a uv buffer
    pub fn with_uvs(mut self, uvs: Vec<f64>) -> Result<Self, GeometryError> {
        check_attribute("uv", uvs.len(), self.vertex_count() * 2)?;
        self.uvs = Some(uvs);
        Ok(self)
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn normals(&self) -> Option<&[f64]> {
        self.normals.as_deref()
    }

    pub fn uvs(&self) -> Option<&[f64]> {
        self.uvs.as_deref()
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Triangle count: `indices / 3` when indexed, `positions / 9` otherwise
    pub fn face_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 9,
        }
    }

    /// Position of vertex `index`
    pub fn position(&self, index: usize) -> Point3<f64> {
        let i = index * 3;
        Point3::new(self.positions[i], self.positions[i + 1], self.positions[i + 2])
    }

    /// Normal of vertex `index`, if the geometry carries normals
    pub fn normal(&self, index: usize) -> Option<Vector3<f64>> {
        self.normals.as_ref().map(|normals| {
            let i = index * 3;
            Vector3::new(normals[i], normals[i + 1], normals[i + 2])
        })
    }

    /// Face `face` as three vertex indices; non-indexed geometry uses the
    /// implicit `(3f, 3f + 1, 3f + 2)` triple
    pub fn face(&self, face: usize) -> [u32; 3] {
        match &self.indices {
            Some(indices) => {
                let i = face * 3;
                [indices[i], indices[i + 1], indices[i + 2]]
            }
            None => {
                let base = (face * 3) as u32;
                [base, base + 1, base + 2]
            }
        }
    }

    /// Iterate over all faces
    pub fn faces(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        (0..self.face_count()).map(move |f| self.face(f))
    }

    /// Index buffer, materialising the implicit one for non-indexed geometry
    pub fn index_buffer(&self) -> Vec<u32> {
        match &self.indices {
            Some(indices) => indices.clone(),
            None => (0..self.vertex_count() as u32).collect(),
        }
    }

    /// Rebuild the vertex set: keep the vertices listed in `survivors` (old
    /// indices, in the order they should appear) together with all of their
    /// attributes, and install `indices` which must already refer to the new
    /// numbering.
    pub(crate) fn rebuild_vertices(&self, survivors: &[u32], indices: Option<Vec<u32>>) -> Self {
        let mut positions = Vec::with_capacity(survivors.len() * 3);
        let mut normals = self
            .normals
            .as_ref()
            .map(|_| Vec::with_capacity(survivors.len() * 3));
        let mut uvs = self
            .uvs
            .as_ref()
            .map(|_| Vec::with_capacity(survivors.len() * 2));

        for &old in survivors {
            let v = old as usize;
            positions.extend_from_slice(&self.positions[v * 3..v * 3 + 3]);
            if let (Some(out), Some(src)) = (normals.as_mut(), self.normals.as_ref()) {
                out.extend_from_slice(&src[v * 3..v * 3 + 3]);
            }
            if let (Some(out), Some(src)) = (uvs.as_mut(), self.uvs.as_ref()) {
                out.extend_from_slice(&src[v * 2..v * 2 + 2]);
            }
        }

        Self::from_trusted(positions, normals, uvs, indices)
    }

    /// Keep the vertex buffers and install a new index buffer
    pub(crate) fn rebuild_indices(&self, indices: Vec<u32>) -> Self {
        Self::from_trusted(
            self.positions.clone(),
            self.normals.clone(),
            self.uvs.clone(),
            Some(indices),
        )
    }

    /// Keep everything but replace the normal buffer
    pub(crate) fn rebuild_normals(&self, normals: Vec<f64>) -> Self {
        Self::from_trusted(
            self.positions.clone(),
            Some(normals),
            self.uvs.clone(),
            self.indices.clone(),
        )
    }

    /// Re-run the constructor checks
    pub fn check(&self) -> Result<(), GeometryError> {
        Self::new(
            self.positions.clone(),
            self.normals.clone(),
            self.uvs.clone(),
            self.indices.clone(),
        )
        .map(|_| ())
    }
}

fn check_attribute(
    attribute: &'static str,
    actual: usize,
    expected: usize,
) -> Result<(), GeometryError> {
    if actual != expected {
        return Err(GeometryError::AttributeLength {
            attribute,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_ragged_positions() {
        let err = Geometry::non_indexed(vec![0.0; 8]).unwrap_err();
        assert_eq!(err, GeometryError::PositionLength(8));
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let err = Geometry::indexed(vec![0.0; 9], vec![0, 1, 3]).unwrap_err();
        assert_eq!(
            err,
            GeometryError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        );
    }

    #[test]
    fn test_rejects_misaligned_uvs() {
        let geometry = Geometry::indexed(vec![0.0; 9], vec![0, 1, 2]).unwrap();
        assert!(geometry.with_uvs(vec![0.0; 4]).is_err());
    }

    #[test]
    fn test_non_indexed_faces() {
        let geometry = Geometry::non_indexed(vec![0.0; 18]).unwrap();
        assert_eq!(geometry.face_count(), 2);
        assert_eq!(geometry.face(1), [3, 4, 5]);
        assert_eq!(geometry.index_buffer(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_rebuild_keeps_attributes_aligned() {
        let positions = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 5.0, 5.0, 5.0];
        let uvs = vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.5, 0.5];
        let geometry = Geometry::indexed(positions, vec![0, 1, 3])
            .unwrap()
            .with_uvs(uvs)
            .unwrap();

        let rebuilt = geometry.rebuild_vertices(&[0, 1, 3], Some(vec![0, 1, 2]));
        assert_eq!(rebuilt.vertex_count(), 3);
        assert_eq!(rebuilt.position(2), Point3::new(5.0, 5.0, 5.0));
        assert_eq!(rebuilt.uvs().unwrap(), &[0.0, 0.0, 1.0, 0.0, 0.5, 0.5]);
        assert!(rebuilt.check().is_ok());
    }
}
