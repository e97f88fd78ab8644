// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene level repair sessions and pruning

use anyhow::Result;
use meshdoctor::geometry::{Primitive, DEFAULT_TOLERANCE};
use meshdoctor::repair::{remove_meshes_with_issues, IssueThresholds, RepairProgress};
use meshdoctor::scene::{Scene, SceneNode};
use meshdoctor::{analyze_scene, Geometry, RepairOptions, Repairer};
use nalgebra::Vector3;

/// A clean cube, an unwelded cube inside a group, and a lonely broken fan
fn workshop() -> Result<Scene> {
    let cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), true).to_geometry();
    let soup = Primitive::cube(Vector3::new(2.0, 2.0, 2.0), false).to_soup();
    let fan = Geometry::indexed(
        vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.5, 1.0, 0.0, //
            0.5, -1.0, 0.0, //
            0.5, 0.0, 1.0,
        ],
        vec![0, 1, 2, 1, 0, 3, 0, 1, 4],
    )?;

    let mut scene = Scene::default();
    scene
        .add(SceneNode::mesh("bench", cube))
        .add(SceneNode::group("shelf").with_child(SceneNode::unnamed_mesh(soup)))
        .add(
            SceneNode::group("bin")
                .with_child(SceneNode::group("inner").with_child(SceneNode::mesh("fan", fan))),
        );
    Ok(scene)
}

#[test]
fn test_session_repairs_every_mesh_and_reports_progress() -> Result<()> {
    let mut scene = workshop()?;
    let repairer = Repairer::new(&scene, RepairOptions::default());
    assert_eq!(repairer.originals().len(), 3);
    assert_eq!(repairer.originals()[1].name, "Mesh_1");

    let before = repairer.analyze(&scene);
    assert_eq!(before.meshes[1].report.duplicate_vertex_count, 28);
    assert_eq!(before.meshes[2].report.non_manifold_edge_count, 1);

    let mut progress: Vec<RepairProgress> = Vec::new();
    let outcome = repairer.repair(&mut scene, &mut |p| progress.push(p))?;

    let percents: Vec<f64> = progress.iter().map(|p| p.percent).collect();
    assert_eq!(percents, vec![20.0, 40.0, 60.0, 80.0, 100.0]);
    assert_eq!(progress[0].step, "merge_vertices");

    let names: Vec<&str> = outcome
        .final_report
        .meshes
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(names, vec!["bench", "Mesh_1", "fan"]);
    assert_eq!(outcome.final_report.meshes[1].report.vertex_count, 8);
    assert_eq!(outcome.final_report.meshes[2].report.non_manifold_edge_count, 0);
    Ok(())
}

#[test]
fn test_reset_restores_snapshots() -> Result<()> {
    let mut scene = workshop()?;
    let repairer = Repairer::new(&scene, RepairOptions::default());
    repairer.repair(&mut scene, &mut |_| {})?;
    assert_eq!(analyze_scene(&scene, DEFAULT_TOLERANCE).meshes[1].report.vertex_count, 8);

    repairer.reset(&mut scene)?;
    let restored = analyze_scene(&scene, DEFAULT_TOLERANCE);
    assert_eq!(restored.meshes[1].report.vertex_count, 36);
    assert_eq!(restored.meshes[2].report.non_manifold_edge_count, 1);
    Ok(())
}

#[test]
fn test_reset_rejects_changed_scene() -> Result<()> {
    let mut scene = workshop()?;
    let repairer = Repairer::new(&scene, RepairOptions::default());
    scene.add(SceneNode::mesh("extra", Primitive::quad(1.0).to_geometry()));

    let err = repairer.reset(&mut scene).unwrap_err();
    assert!(matches!(
        err,
        meshdoctor::Error::SceneChanged { expected: 3, found: 4 }
    ));
    Ok(())
}

#[test]
fn test_prune_removes_broken_meshes_and_empty_groups() -> Result<()> {
    let mut scene = workshop()?;
    let report =
        remove_meshes_with_issues(&mut scene, &IssueThresholds::default(), DEFAULT_TOLERANCE);

    assert_eq!(report.removed_meshes, vec!["Mesh_1".to_string(), "fan".to_string()]);
    // shelf, bin and inner all became empty
    assert_eq!(report.removed_containers, 3);
    assert_eq!(scene.mesh_count(), 1);
    assert_eq!(scene.root.children.len(), 1);
    assert_eq!(scene.mesh_entries()[0].name, "bench");
    Ok(())
}

#[test]
fn test_prune_thresholds_spare_tolerated_meshes() -> Result<()> {
    let mut scene = workshop()?;
    let thresholds = IssueThresholds {
        duplicate_vertices: 100,
        ..IssueThresholds::default()
    };
    let report = remove_meshes_with_issues(&mut scene, &thresholds, DEFAULT_TOLERANCE);

    assert_eq!(report.removed_meshes, vec!["fan".to_string()]);
    assert_eq!(report.removed_containers, 2);
    assert_eq!(scene.mesh_count(), 2);
    Ok(())
}
