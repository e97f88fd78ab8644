// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Repair passes over a parsed OBJ model
//!
//! These rewrite face corners in place instead of rebuilding buffers, so the
//! texture coordinate and normal pools are left alone unless normals are
//! recomputed.

use super::{parse_obj, write_obj, ObjModel};
use crate::analysis::{analyze_geometry, DefectReport};
use crate::error::Result;
use crate::geometry::{face_edges, is_degenerate, EdgeKey, VertexClasses};
use crate::utils::math::{normalize_or_zero, triangle_normal};
use crate::repair::{RepairOptions, RepairStep, MAX_CONVERGENCE_ITERATIONS};
use ahash::AHashMap;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What an OBJ repair run changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjRepairSummary {
    pub merged_vertices: usize,
    pub degenerate_faces_removed: usize,
    pub non_manifold_faces_removed: usize,
    pub loose_vertices_removed: usize,
    pub normals_recomputed: bool,
    /// Convergence iterations run, 0 when the loop is disabled
    pub convergence_iterations: usize,
    pub before: DefectReport,
    pub after: DefectReport,
}

/// Repair a model in place
///
/// Order: merge, remove degenerate, fix non-manifold, remove loose, recompute
/// normals. Steps listed in `options.skip_operations` are left out.
pub fn repair_obj(model: &mut ObjModel, options: &RepairOptions) -> Result<ObjRepairSummary> {
    options.validate()?;
    let tolerance = options.merge_tolerance;
    let mut summary = ObjRepairSummary {
        before: analyze_geometry(&model.to_geometry()?, tolerance),
        ..ObjRepairSummary::default()
    };

    if !options.skips(RepairStep::MergeVertices) {
        summary.merged_vertices += merge_vertices(model, tolerance);
    }
    if !options.skips(RepairStep::RemoveDegenerateFaces) {
        summary.degenerate_faces_removed += remove_degenerate_faces(model, tolerance);
    }
    if !options.skips(RepairStep::FixNonManifoldEdges) {
        summary.non_manifold_faces_removed += fix_non_manifold_edges(model);
    }

    if options.ensure_manifold {
        while summary.convergence_iterations < MAX_CONVERGENCE_ITERATIONS {
            summary.convergence_iterations += 1;
            summary.degenerate_faces_removed += remove_degenerate_faces(model, tolerance);
            summary.merged_vertices += merge_vertices(model, tolerance);
            summary.non_manifold_faces_removed += fix_non_manifold_edges(model);
            if analyze_geometry(&model.to_geometry()?, tolerance).is_topologically_clean() {
                break;
            }
        }
    }

    if !options.skips(RepairStep::RemoveLooseVertices) {
        summary.loose_vertices_removed = remove_loose_vertices(model);
    }
    if !options.skips(RepairStep::RecalculateNormals) {
        recompute_normals(model);
        summary.normals_recomputed = true;
    }

    summary.after = analyze_geometry(&model.to_geometry()?, tolerance);
    if !summary.after.is_topologically_clean() {
        warn!(issues = summary.after.issue_count(), "OBJ still has topology defects after repair");
    }
    info!(
        merged = summary.merged_vertices,
        degenerate = summary.degenerate_faces_removed,
        non_manifold = summary.non_manifold_faces_removed,
        loose = summary.loose_vertices_removed,
        "repaired OBJ model"
    );
    Ok(summary)
}

/// Parse, repair and re-serialize OBJ text
pub fn repair_obj_text(source: &str, options: &RepairOptions) -> Result<(String, ObjRepairSummary)> {
    let mut model = parse_obj(source)?;
    let summary = repair_obj(&mut model, options)?;
    Ok((write_obj(&model), summary))
}

/// Point every corner at the first vertex of its tolerance cell and compact
/// the position pool
pub fn merge_vertices(model: &mut ObjModel, tolerance: f64) -> usize {
    let flat: Vec<f64> = model.positions.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
    let classes = VertexClasses::build(&flat, tolerance);
    let merged = classes.duplicate_count();
    if merged == 0 {
        return 0;
    }

    let mut compact = vec![0usize; model.positions.len()];
    for (new, &old) in classes.survivors.iter().enumerate() {
        compact[old as usize] = new;
    }
    for corner in model.faces.iter_mut().flat_map(|f| f.corners.iter_mut()) {
        corner.vertex = compact[classes.representative[corner.vertex] as usize];
    }
    model.positions = classes
        .survivors
        .iter()
        .map(|&old| model.positions[old as usize])
        .collect();
    merged
}

/// Drop faces with a repeated vertex or near-zero area
pub fn remove_degenerate_faces(model: &mut ObjModel, tolerance: f64) -> usize {
    let before = model.faces.len();
    let positions = &model.positions;
    model.faces.retain(|face| {
        let [a, b, c] = face.vertices();
        if a == b || b == c || a == c {
            return false;
        }
        !is_degenerate(positions[a], positions[b], positions[c], tolerance)
    });
    before - model.faces.len()
}

/// Keep the first two faces on every edge and drop the rest
pub fn fix_non_manifold_edges(model: &mut ObjModel) -> usize {
    let mut incidence: AHashMap<EdgeKey, u32> = AHashMap::with_capacity(model.faces.len() * 3 / 2);
    let mut remove = vec![false; model.faces.len()];

    for (i, face) in model.faces.iter().enumerate() {
        let [a, b, c] = face.vertices().map(|v| v as u32);
        if a == b || b == c || a == c {
            continue;
        }
        for edge in face_edges([a, b, c]) {
            let count = incidence.entry(edge).or_insert(0);
            *count += 1;
            if *count > 2 {
                remove[i] = true;
            }
        }
    }

    let before = model.faces.len();
    let mut flags = remove.into_iter();
    model.faces.retain(|_| !flags.next().unwrap_or(false));
    before - model.faces.len()
}

/// Drop positions that no face references
pub fn remove_loose_vertices(model: &mut ObjModel) -> usize {
    let mut compact: Vec<Option<usize>> = vec![None; model.positions.len()];
    for face in &model.faces {
        for v in face.vertices() {
            compact[v] = Some(0);
        }
    }

    let mut kept = Vec::with_capacity(model.positions.len());
    for (old, slot) in compact.iter_mut().enumerate() {
        if slot.is_some() {
            *slot = Some(kept.len());
            kept.push(model.positions[old]);
        }
    }

    let removed = model.positions.len() - kept.len();
    if removed == 0 {
        return 0;
    }
    for corner in model.faces.iter_mut().flat_map(|f| f.corners.iter_mut()) {
        if let Some(new) = compact[corner.vertex] {
            corner.vertex = new;
        }
    }
    model.positions = kept;
    removed
}

/// Replace the normal pool with one smooth normal per position
pub fn recompute_normals(model: &mut ObjModel) {
    let mut sums = vec![Vector3::<f64>::zeros(); model.positions.len()];
    for face in &model.faces {
        let [a, b, c] = face.vertices();
        let [pa, pb, pc] = [a, b, c].map(|v| &model.positions[v]);
        if let Some(n) = triangle_normal(pa, pb, pc) {
            sums[a] += n;
            sums[b] += n;
            sums[c] += n;
        }
    }

    model.normals = sums
        .into_iter()
        .map(|s| normalize_or_zero(&s))
        .collect();
    for corner in model.faces.iter_mut().flat_map(|f| f.corners.iter_mut()) {
        corner.normal = Some(corner.vertex);
    }
}
