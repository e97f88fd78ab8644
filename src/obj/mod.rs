// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Wavefront OBJ support
//!
//! A self-contained repair path that works on the parsed OBJ model directly:
//! positions, texture coordinates and normals stay in separate pools and faces
//! reference them per corner, the way the file stores them.

mod parser;
mod repair;
mod writer;

pub use parser::parse_obj;
pub use repair::{repair_obj, repair_obj_text, ObjRepairSummary};
pub use writer::write_obj;

use crate::error::{GeometryError, Result};
use crate::geometry::Geometry;
use nalgebra::{Point3, Vector3};
use std::fs;
use std::path::Path;

/// One face corner; all indices are 0-based into the model's pools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCorner {
    pub vertex: usize,
    pub tex_coord: Option<usize>,
    pub normal: Option<usize>,
}

impl FaceCorner {
    pub fn new(vertex: usize) -> Self {
        Self {
            vertex,
            tex_coord: None,
            normal: None,
        }
    }
}

/// A triangle; polygons are fan-triangulated on load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjFace {
    pub corners: [FaceCorner; 3],
}

impl ObjFace {
    pub fn vertices(&self) -> [usize; 3] {
        self.corners.map(|c| c.vertex)
    }
}

/// Parsed OBJ content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjModel {
    pub name: Option<String>,
    pub positions: Vec<Point3<f64>>,
    pub tex_coords: Vec<[f64; 2]>,
    pub normals: Vec<Vector3<f64>>,
    pub faces: Vec<ObjFace>,
}

impl ObjModel {
    /// Indexed geometry over the position pool; used for analysis
    pub fn to_geometry(&self) -> std::result::Result<Geometry, GeometryError> {
        let positions = self.positions.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
        let indices = self
            .faces
            .iter()
            .flat_map(|f| f.vertices().map(|v| v as u32))
            .collect();
        Geometry::indexed(positions, indices)
    }

    /// Model with one position, normal and uv per geometry vertex
    pub fn from_geometry(geometry: &Geometry, name: Option<String>) -> Self {
        let positions = (0..geometry.vertex_count())
            .map(|v| geometry.position(v))
            .collect();
        let normals = geometry
            .normals()
            .map(|n| {
                n.chunks_exact(3)
                    .map(|c| Vector3::new(c[0], c[1], c[2]))
                    .collect()
            })
            .unwrap_or_default();
        let tex_coords = geometry
            .uvs()
            .map(|uv| uv.chunks_exact(2).map(|c| [c[0], c[1]]).collect())
            .unwrap_or_default();

        let has_normals = geometry.normals().is_some();
        let has_uvs = geometry.uvs().is_some();
        let faces = geometry
            .faces()
            .map(|face| ObjFace {
                corners: face.map(|v| {
                    let v = v as usize;
                    FaceCorner {
                        vertex: v,
                        tex_coord: has_uvs.then_some(v),
                        normal: has_normals.then_some(v),
                    }
                }),
            })
            .collect();

        Self {
            name,
            positions,
            tex_coords,
            normals,
            faces,
        }
    }
}

/// Read and parse an OBJ file
pub fn load_obj(path: impl AsRef<Path>) -> Result<ObjModel> {
    let text = fs::read_to_string(path)?;
    parse_obj(&text)
}

/// Serialize a model to an OBJ file
pub fn save_obj(model: &ObjModel, path: impl AsRef<Path>) -> Result<()> {
    fs::write(path, write_obj(model))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;

    #[test]
    fn test_geometry_conversion_keeps_topology() {
        let quad = Primitive::quad(1.0).to_geometry();
        let model = ObjModel::from_geometry(&quad, Some("quad".into()));

        assert_eq!(model.positions.len(), 4);
        assert_eq!(model.faces.len(), 2);
        assert!(model.normals.is_empty());
        assert_eq!(model.faces[1].vertices(), [0, 2, 3]);
        assert_eq!(model.to_geometry().unwrap(), quad);
    }
}
