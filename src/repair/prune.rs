// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Destructive alternative to repair: drop meshes that are too damaged

use crate::analysis::{analyze_named, DefectReport};
use crate::scene::{NodePath, Scene};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Highest tolerated count per defect metric
///
/// Boundary edges are not a defect and have no threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueThresholds {
    pub duplicate_vertices: usize,
    pub loose_vertices: usize,
    pub non_manifold_edges: usize,
    pub non_manifold_vertices: usize,
    pub degenerate_faces: usize,
}

impl IssueThresholds {
    /// Whether any metric of `report` is above its threshold
    pub fn exceeded_by(&self, report: &DefectReport) -> bool {
        report.duplicate_vertex_count > self.duplicate_vertices
            || report.loose_vertex_count > self.loose_vertices
            || report.non_manifold_edge_count > self.non_manifold_edges
            || report.non_manifold_vertex_count > self.non_manifold_vertices
            || report.degenerate_face_count > self.degenerate_faces
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneReport {
    /// Names of removed meshes, in extraction order
    pub removed_meshes: Vec<String>,
    /// Group nodes removed because they became empty
    pub removed_containers: usize,
}

/// Remove every mesh whose defects exceed `thresholds`, then remove groups
/// left without children. The root is never removed.
pub fn remove_meshes_with_issues(
    scene: &mut Scene,
    thresholds: &IssueThresholds,
    tolerance: f64,
) -> PruneReport {
    let entries = scene.mesh_entries();
    let analysis = analyze_named(
        entries
            .iter()
            .filter_map(|e| scene.geometry(&e.path).map(|g| (e.name.clone(), g))),
        tolerance,
    );

    let mut report = PruneReport::default();
    let mut doomed: Vec<NodePath> = Vec::new();
    for (entry, mesh) in entries.iter().zip(&analysis.meshes) {
        if thresholds.exceeded_by(&mesh.report) {
            debug!(mesh = %entry.name, issues = mesh.report.issue_count(), "mesh marked for removal");
            report.removed_meshes.push(entry.name.clone());
            doomed.push(entry.path.clone());
        }
    }

    // Later siblings and deeper nodes first, so pending paths stay valid.
    doomed.sort_unstable_by(|a, b| b.cmp(a));
    for path in doomed {
        if scene.remove_node(&path).is_none() {
            continue;
        }
        report.removed_containers += remove_empty_ancestors(scene, path);
    }

    info!(
        removed_meshes = report.removed_meshes.len(),
        removed_containers = report.removed_containers,
        "pruned meshes with issues"
    );
    report
}

/// Walk up from a removed node, removing groups that became empty
fn remove_empty_ancestors(scene: &mut Scene, mut path: NodePath) -> usize {
    let mut removed = 0;
    loop {
        path.pop();
        if path.is_empty() {
            return removed;
        }
        let empty_group = scene
            .node(&path)
            .is_some_and(|node| node.is_group() && node.children.is_empty());
        if !empty_group {
            return removed;
        }
        scene.remove_node(&path);
        removed += 1;
    }
}
