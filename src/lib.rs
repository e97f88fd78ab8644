// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! meshdoctor
//!
//! Triangle mesh defect analysis and repair. Geometry lives in flat position,
//! normal and index buffers; the analyzer reports duplicate, loose and
//! degenerate elements along with non-manifold edges and vertices, and the
//! repair pipeline fixes them in a fixed order. Meshes can be read from and
//! written to Wavefront OBJ, organized in a scene graph, and imaged with a
//! simple synthetic aperture radar model.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod obj;
pub mod radar;
pub mod repair;
pub mod scene;
pub mod utils;

#[cfg(feature = "wasm")]
pub mod ffi;

pub use analysis::{
    analyze_geometries, analyze_geometry, analyze_scene, validate_manifold_geometry,
    AggregateDefectReport, DefectReport,
};
pub use error::{Error, Result};
pub use geometry::{Geometry, Primitive};
pub use obj::{parse_obj, write_obj, ObjModel};
pub use radar::{synthesize, synthesize_geometry};
pub use repair::{repair_geometries, repair_geometry, RepairOptions, Repairer};
pub use scene::{Scene, SceneNode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Analyze OBJ text as a single mesh
pub fn analyze_obj(source: &str, tolerance: f64) -> Result<DefectReport> {
    let geometry = parse_obj(source)?.to_geometry()?;
    Ok(analyze_geometry(&geometry, tolerance))
}
