// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Topology properties of the analyzer and the repair passes

use anyhow::Result;
use meshdoctor::geometry::{Adjacency, EdgeKey, Primitive, DEFAULT_TOLERANCE};
use meshdoctor::repair::{
    fix_non_manifold_edges, merge_vertices, remove_degenerate_faces, remove_loose_vertices,
};
use meshdoctor::{
    analyze_geometry, repair_geometry, validate_manifold_geometry, Geometry, RepairOptions,
};
use nalgebra::{Point3, Vector3};

fn split_quad() -> Result<Geometry> {
    Ok(Geometry::indexed(
        vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0,
        ],
        vec![0, 1, 2, 0, 2, 3],
    )?)
}

/// Three triangles hinged on the edge (0, 1)
fn fan_of_three() -> Result<Geometry> {
    Ok(Geometry::indexed(
        vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.5, 1.0, 0.0, //
            0.5, -1.0, 0.0, //
            0.5, 0.0, 1.0,
        ],
        vec![0, 1, 2, 1, 0, 3, 0, 1, 4],
    )?)
}

#[test]
fn test_edge_key_is_symmetric() {
    assert_eq!(EdgeKey::new(3, 7), EdgeKey::new(7, 3));
    assert_eq!(EdgeKey::new(3, 7).packed(), EdgeKey::new(7, 3).packed());
    assert_eq!(
        EdgeKey::from_packed(EdgeKey::new(7, 3).packed()).vertices(),
        (3, 7)
    );
}

#[test]
fn test_split_quad_is_manifold_with_open_border() -> Result<()> {
    let quad = split_quad()?;
    let report = analyze_geometry(&quad, DEFAULT_TOLERANCE);

    assert_eq!(report.non_manifold_edge_count, 0);
    assert_eq!(report.boundary_edge_count, 4);
    assert!(validate_manifold_geometry(&quad, DEFAULT_TOLERANCE));
    Ok(())
}

#[test]
fn test_fan_of_three_loses_exactly_one_face() -> Result<()> {
    let mut fan = fan_of_three()?;
    assert_eq!(analyze_geometry(&fan, DEFAULT_TOLERANCE).non_manifold_edge_count, 1);
    assert_eq!(Adjacency::build(&fan, DEFAULT_TOLERANCE).incidence(0, 1), 3);

    assert_eq!(fix_non_manifold_edges(&mut fan), 1);
    assert_eq!(fan.face_count(), 2);
    assert_eq!(Adjacency::build(&fan, DEFAULT_TOLERANCE).incidence(1, 0), 2);
    assert_eq!(analyze_geometry(&fan, DEFAULT_TOLERANCE).non_manifold_edge_count, 0);
    Ok(())
}

#[test]
fn test_degenerate_faces_counted_once() -> Result<()> {
    let geometry = Geometry::indexed(
        vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            2.0, 0.0, 0.0,
        ],
        // repeated index, then three collinear points
        vec![0, 0, 1, 0, 1, 2],
    )?;
    assert_eq!(analyze_geometry(&geometry, DEFAULT_TOLERANCE).degenerate_face_count, 2);

    let mut repaired = geometry.clone();
    assert_eq!(remove_degenerate_faces(&mut repaired, DEFAULT_TOLERANCE), 2);
    assert_eq!(repaired.face_count(), 0);
    Ok(())
}

#[test]
fn test_merge_is_idempotent() {
    let mut sphere = Primitive::sphere(5.0, 24).to_soup();
    assert!(merge_vertices(&mut sphere, DEFAULT_TOLERANCE) > 0);
    assert_eq!(merge_vertices(&mut sphere, DEFAULT_TOLERANCE), 0);
}

#[test]
fn test_loose_vertex_removal_conserves_vertices() -> Result<()> {
    let mut geometry = Geometry::indexed(
        vec![
            5.0, 5.0, 5.0, //
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            6.0, 6.0, 6.0, //
            0.0, 1.0, 0.0,
        ],
        vec![1, 2, 4],
    )?;
    let before = geometry.vertex_count();

    let removed = remove_loose_vertices(&mut geometry);
    assert_eq!(removed, 2);
    assert_eq!(geometry.vertex_count() + removed, before);
    let count = geometry.vertex_count() as u32;
    assert!(geometry.index_buffer().iter().all(|&i| i < count));
    // surviving vertices keep their relative order
    assert_eq!(geometry.position(0), Point3::new(0.0, 0.0, 0.0));
    assert_eq!(geometry.position(2), Point3::new(0.0, 1.0, 0.0));
    Ok(())
}

#[test]
fn test_welded_cube_passes_validation() {
    let cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_geometry();
    let report = analyze_geometry(&cube, DEFAULT_TOLERANCE);

    assert_eq!(report.vertex_count, 8);
    assert_eq!(report.face_count, 12);
    assert_eq!(report.duplicate_vertex_count, 0);
    assert_eq!(report.loose_vertex_count, 0);
    assert_eq!(report.non_manifold_edge_count, 0);
    assert_eq!(report.degenerate_face_count, 0);
    assert_eq!(report.boundary_edge_count, 0);
    assert!(validate_manifold_geometry(&cube, DEFAULT_TOLERANCE));
}

#[test]
fn test_unwelded_cube_repairs_to_closed_cube() -> Result<()> {
    let mut soup = Primitive::cube(Vector3::new(2.0, 2.0, 2.0), true).to_soup();
    assert_eq!(soup.vertex_count(), 36);

    let outcome = repair_geometry(&mut soup, &RepairOptions::default())?;

    assert_eq!(soup.vertex_count(), 8);
    assert_eq!(soup.face_count(), 12);
    assert_eq!(outcome.operations.vertices_merged, 28);
    assert_eq!(outcome.final_report.total_issues, 0);
    assert_eq!(outcome.final_report.boundary_edge_count, 0);
    assert!(outcome.is_manifold_ready());
    assert!(soup.normals().is_some());
    Ok(())
}

#[test]
fn test_attributes_follow_vertices_through_repair() -> Result<()> {
    let soup = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_soup();
    let uvs: Vec<f64> = (0..soup.vertex_count()).flat_map(|i| [i as f64, 0.0]).collect();
    let mut soup = soup.with_uvs(uvs)?;

    repair_geometry(&mut soup, &RepairOptions::default())?;

    soup.check()?;
    assert_eq!(soup.uvs().map(|uvs| uvs.len()), Some(soup.vertex_count() * 2));
    assert_eq!(
        soup.normals().map(|normals| normals.len()),
        Some(soup.vertex_count() * 3)
    );
    Ok(())
}
