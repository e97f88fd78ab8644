// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Topological defect analysis

mod report;

pub use report::{AggregateDefectReport, DefectReport, MeshDefects};

use crate::geometry::{Adjacency, Geometry, VertexClasses};
use crate::scene::Scene;
use rayon::prelude::*;
use tracing::debug;

/// Analyze one geometry
pub fn analyze_geometry(geometry: &Geometry, tolerance: f64) -> DefectReport {
    let classes = VertexClasses::build(geometry.positions(), tolerance);
    let adjacency = Adjacency::build(geometry, tolerance);

    // Every vertex of a non-indexed geometry belongs to its own triangle.
    let loose_vertex_count = if geometry.is_indexed() {
        adjacency.unreferenced_vertex_count()
    } else {
        0
    };

    let report = DefectReport {
        vertex_count: geometry.vertex_count(),
        face_count: geometry.face_count(),
        duplicate_vertex_count: classes.duplicate_count(),
        loose_vertex_count,
        non_manifold_edge_count: adjacency.non_manifold_edge_count(),
        non_manifold_vertex_count: adjacency.non_manifold_vertex_count(),
        degenerate_face_count: adjacency.degenerate_faces,
        boundary_edge_count: adjacency.boundary_edge_count(),
    };
    debug!(?report, "analyzed geometry");
    report
}

/// Analyze named geometries; mesh order in the result follows the input
pub fn analyze_named<'a, I>(meshes: I, tolerance: f64) -> AggregateDefectReport
where
    I: IntoIterator<Item = (String, &'a Geometry)>,
{
    let meshes: Vec<(String, &Geometry)> = meshes.into_iter().collect();
    let reports: Vec<MeshDefects> = meshes
        .par_iter()
        .map(|(name, geometry)| MeshDefects {
            name: name.clone(),
            report: analyze_geometry(geometry, tolerance),
        })
        .collect();
    AggregateDefectReport::from_meshes(reports)
}

/// Analyze a list of geometries, naming them `Mesh_<n>`
pub fn analyze_geometries(geometries: &[&Geometry], tolerance: f64) -> AggregateDefectReport {
    analyze_named(
        geometries
            .iter()
            .enumerate()
            .map(|(i, g)| (format!("Mesh_{}", i), *g)),
        tolerance,
    )
}

/// Analyze every drawable triangle mesh of a scene
pub fn analyze_scene(scene: &Scene, tolerance: f64) -> AggregateDefectReport {
    analyze_named(
        scene
            .mesh_entries()
            .into_iter()
            .filter_map(|entry| scene.geometry(&entry.path).map(|g| (entry.name, g))),
        tolerance,
    )
}

/// Whether a geometry is a valid 2-manifold (open borders allowed)
pub fn validate_manifold_geometry(geometry: &Geometry, tolerance: f64) -> bool {
    analyze_geometry(geometry, tolerance).is_manifold()
}
