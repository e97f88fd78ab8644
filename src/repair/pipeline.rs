// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Repair orchestration
//!
//! Runs the five passes in a fixed order over every geometry, reports progress
//! after each step and optionally iterates a short convergence loop until the
//! topology is clean.

use super::passes;
use crate::analysis::{analyze_geometries, AggregateDefectReport};
use crate::error::{GeometryError, Result};
use crate::geometry::{check_tolerance, Geometry, DEFAULT_TOLERANCE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Upper bound on ensure-manifold iterations
pub const MAX_CONVERGENCE_ITERATIONS: usize = 3;

/// A named repair step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStep {
    MergeVertices,
    RemoveLooseVertices,
    FixNonManifoldEdges,
    RemoveDegenerateFaces,
    RecalculateNormals,
}

impl RepairStep {
    /// Execution order of a full repair run
    pub const ORDER: [RepairStep; 5] = [
        RepairStep::MergeVertices,
        RepairStep::RemoveLooseVertices,
        RepairStep::FixNonManifoldEdges,
        RepairStep::RemoveDegenerateFaces,
        RepairStep::RecalculateNormals,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RepairStep::MergeVertices => "merge_vertices",
            RepairStep::RemoveLooseVertices => "remove_loose_vertices",
            RepairStep::FixNonManifoldEdges => "fix_non_manifold_edges",
            RepairStep::RemoveDegenerateFaces => "remove_degenerate_faces",
            RepairStep::RecalculateNormals => "recalculate_normals",
        }
    }

    /// Apply this step to one geometry and return its count
    pub fn apply(self, geometry: &mut Geometry, tolerance: f64) -> usize {
        match self {
            RepairStep::MergeVertices => passes::merge_vertices(geometry, tolerance),
            RepairStep::RemoveLooseVertices => passes::remove_loose_vertices(geometry),
            RepairStep::FixNonManifoldEdges => passes::fix_non_manifold_edges(geometry),
            RepairStep::RemoveDegenerateFaces => {
                passes::remove_degenerate_faces(geometry, tolerance)
            }
            RepairStep::RecalculateNormals => passes::recalculate_normals(geometry),
        }
    }
}

impl fmt::Display for RepairStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RepairStep {
    type Err = String;

    /// Accepts `merge_vertices`, `merge-vertices`, `mergeVertices`, ...
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        RepairStep::ORDER
            .into_iter()
            .find(|step| step.name().replace('_', "") == folded)
            .ok_or_else(|| format!("unknown repair step '{}'", s))
    }
}

/// Options of a repair run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairOptions {
    /// Vertex merge tolerance, in the geometry's own units
    pub merge_tolerance: f64,
    /// Steps to leave out
    pub skip_operations: Vec<RepairStep>,
    /// Append the convergence loop
    pub ensure_manifold: bool,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            merge_tolerance: DEFAULT_TOLERANCE,
            skip_operations: Vec::new(),
            ensure_manifold: false,
        }
    }
}

impl RepairOptions {
    /// Fails when `merge_tolerance` is zero, negative or not finite
    pub fn validate(&self) -> std::result::Result<(), GeometryError> {
        check_tolerance(self.merge_tolerance).map(|_| ())
    }

    pub fn skips(&self, step: RepairStep) -> bool {
        self.skip_operations.contains(&step)
    }

    /// Steps that will run, in order
    pub fn active_steps(&self) -> Vec<RepairStep> {
        RepairStep::ORDER
            .into_iter()
            .filter(|step| !self.skips(*step))
            .collect()
    }
}

/// Progress notification sent after each completed step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepairProgress {
    /// 0..=100
    pub percent: f64,
    pub step: String,
}

/// Per-operation totals summed over all geometries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationCounts {
    pub vertices_merged: usize,
    pub loose_vertices_removed: usize,
    pub non_manifold_faces_removed: usize,
    pub degenerate_faces_removed: usize,
    pub normals_recalculated: usize,
}

impl OperationCounts {
    fn add(&mut self, step: RepairStep, count: usize) {
        match step {
            RepairStep::MergeVertices => self.vertices_merged += count,
            RepairStep::RemoveLooseVertices => self.loose_vertices_removed += count,
            RepairStep::FixNonManifoldEdges => self.non_manifold_faces_removed += count,
            RepairStep::RemoveDegenerateFaces => self.degenerate_faces_removed += count,
            RepairStep::RecalculateNormals => self.normals_recalculated += count,
        }
    }

    pub fn get(&self, step: RepairStep) -> usize {
        match step {
            RepairStep::MergeVertices => self.vertices_merged,
            RepairStep::RemoveLooseVertices => self.loose_vertices_removed,
            RepairStep::FixNonManifoldEdges => self.non_manifold_faces_removed,
            RepairStep::RemoveDegenerateFaces => self.degenerate_faces_removed,
            RepairStep::RecalculateNormals => self.normals_recalculated,
        }
    }
}

/// What the ensure-manifold loop did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergenceReport {
    pub iterations: usize,
    /// The last analysis found no non-manifold edges or vertices and no
    /// degenerate faces
    pub converged: bool,
    pub faces_removed: usize,
    pub vertices_merged: usize,
    pub degenerate_removed: usize,
}

/// Result of a repair run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairOutcome {
    pub operations: OperationCounts,
    pub convergence: Option<ConvergenceReport>,
    pub final_report: AggregateDefectReport,
}

impl RepairOutcome {
    /// Gate for manifold-dependent consumers
    pub fn is_manifold_ready(&self) -> bool {
        self.final_report.total_issues == 0
    }
}

/// Repair a set of geometries in place
///
/// `on_progress` is called after each step completes with the share of
/// finished steps. A step finishes on every geometry before the next starts.
/// Options are validated before any geometry is touched.
pub fn repair_geometries(
    geometries: &mut [&mut Geometry],
    options: &RepairOptions,
    on_progress: &mut dyn FnMut(RepairProgress),
) -> Result<RepairOutcome> {
    options.validate()?;
    let tolerance = options.merge_tolerance;
    let steps = options.active_steps();
    let total_steps = steps.len() + usize::from(options.ensure_manifold);
    let mut completed = 0;
    let mut report_step = |name: &str, completed: usize| {
        let percent = if total_steps == 0 {
            100.0
        } else {
            completed as f64 * 100.0 / total_steps as f64
        };
        on_progress(RepairProgress {
            percent,
            step: name.to_string(),
        });
    };

    let mut operations = OperationCounts::default();
    for step in steps {
        let count: usize = geometries
            .iter_mut()
            .map(|geometry| step.apply(geometry, tolerance))
            .sum();
        operations.add(step, count);
        debug!(step = step.name(), count, "repair step finished");

        completed += 1;
        report_step(step.name(), completed);
    }

    let convergence = if options.ensure_manifold {
        let report = converge(geometries, tolerance);
        completed += 1;
        report_step("ensure_manifold", completed);
        Some(report)
    } else {
        None
    };

    let final_report = analyze_all(geometries, tolerance);
    info!(
        meshes = final_report.mesh_count,
        total_issues = final_report.total_issues,
        "repair finished"
    );

    Ok(RepairOutcome {
        operations,
        convergence,
        final_report,
    })
}

/// Repair a single geometry without progress reporting
pub fn repair_geometry(geometry: &mut Geometry, options: &RepairOptions) -> Result<RepairOutcome> {
    repair_geometries(&mut [geometry], options, &mut |_| {})
}

/// Re-run {remove degenerate, merge, fix non-manifold} until the topology is
/// clean or the iteration cap is reached
fn converge(geometries: &mut [&mut Geometry], tolerance: f64) -> ConvergenceReport {
    let mut report = ConvergenceReport::default();

    while report.iterations < MAX_CONVERGENCE_ITERATIONS {
        report.iterations += 1;
        for geometry in geometries.iter_mut() {
            report.degenerate_removed += passes::remove_degenerate_faces(geometry, tolerance);
            report.vertices_merged += passes::merge_vertices(geometry, tolerance);
            report.faces_removed += passes::fix_non_manifold_edges(geometry);
        }

        let analysis = analyze_all(geometries, tolerance);
        debug!(
            iteration = report.iterations,
            non_manifold_edges = analysis.non_manifold_edge_count,
            non_manifold_vertices = analysis.non_manifold_vertex_count,
            degenerate_faces = analysis.degenerate_face_count,
            "convergence iteration"
        );
        if analysis.is_topologically_clean() {
            report.converged = true;
            break;
        }
    }

    if !report.converged {
        warn!(
            iterations = report.iterations,
            "ensure-manifold loop stopped before the topology was clean"
        );
    }
    report
}

fn analyze_all(geometries: &[&mut Geometry], tolerance: f64) -> AggregateDefectReport {
    let shared: Vec<&Geometry> = geometries.iter().map(|g| &**g).collect();
    analyze_geometries(&shared, tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Vector3;

    #[test]
    fn test_step_names_parse() {
        assert_eq!(
            "merge_vertices".parse::<RepairStep>(),
            Ok(RepairStep::MergeVertices)
        );
        assert_eq!(
            "mergeVertices".parse::<RepairStep>(),
            Ok(RepairStep::MergeVertices)
        );
        assert_eq!(
            "Fix-Non-Manifold-Edges".parse::<RepairStep>(),
            Ok(RepairStep::FixNonManifoldEdges)
        );
        assert!("weld".parse::<RepairStep>().is_err());
    }

    #[test]
    fn test_unwelded_cube_converges() {
        let mut soup = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), true).to_soup();
        let outcome = repair_geometry(&mut soup, &RepairOptions::default()).unwrap();

        assert_eq!(soup.vertex_count(), 8);
        assert_eq!(soup.face_count(), 12);
        assert_eq!(outcome.operations.vertices_merged, 28);
        assert_eq!(outcome.operations.normals_recalculated, 1);
        assert_eq!(outcome.final_report.total_issues, 0);
        assert!(outcome.is_manifold_ready());
    }

    #[test]
    fn test_progress_reaches_hundred() {
        let mut quad = Primitive::quad(1.0).to_geometry();
        let options = RepairOptions {
            skip_operations: vec![RepairStep::RecalculateNormals],
            ensure_manifold: true,
            ..RepairOptions::default()
        };

        let mut seen = Vec::new();
        repair_geometries(&mut [&mut quad], &options, &mut |p| seen.push(p)).unwrap();

        let steps: Vec<&str> = seen.iter().map(|p| p.step.as_str()).collect();
        assert_eq!(
            steps,
            vec![
                "merge_vertices",
                "remove_loose_vertices",
                "fix_non_manifold_edges",
                "remove_degenerate_faces",
                "ensure_manifold",
            ]
        );
        assert_eq!(seen[0].percent, 20.0);
        assert_eq!(seen[4].percent, 100.0);
        assert!(quad.normals().is_none());
    }

    #[test]
    fn test_clean_mesh_converges_in_one_iteration() {
        let mut cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_geometry();
        let options = RepairOptions {
            ensure_manifold: true,
            ..RepairOptions::default()
        };
        let outcome = repair_geometry(&mut cube, &options).unwrap();
        let convergence = outcome.convergence.unwrap();

        assert_eq!(convergence.iterations, 1);
        assert!(convergence.converged);
        assert_eq!(convergence.faces_removed, 0);
    }

    #[test]
    fn test_bowtie_hits_iteration_cap_without_error() {
        // Two triangles touching at vertex 0 only; none of the loop passes
        // can separate them
        let mut bowtie = Geometry::indexed(
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
        let options = RepairOptions {
            ensure_manifold: true,
            ..RepairOptions::default()
        };

        let outcome = repair_geometry(&mut bowtie, &options).unwrap();
        let convergence = outcome.convergence.unwrap();

        assert_eq!(convergence.iterations, MAX_CONVERGENCE_ITERATIONS);
        assert!(!convergence.converged);
        assert_eq!(outcome.final_report.non_manifold_vertex_count, 1);
        assert!(!outcome.is_manifold_ready());
        assert_eq!(bowtie.face_count(), 2);
    }

    #[test]
    fn test_invalid_tolerance_leaves_geometry_untouched() {
        let quad = Geometry::indexed(
            vec![
                1.0, 1.0, 0.0, //
                2.0, 1.0, 0.0, //
                2.0, 2.0, 0.0, //
                1.0, 2.0, 0.0,
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
        .unwrap();

        for tolerance in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut geometry = quad.clone();
            let options = RepairOptions {
                merge_tolerance: tolerance,
                ..RepairOptions::default()
            };
            let mut calls = 0;
            let result = repair_geometries(&mut [&mut geometry], &options, &mut |_| calls += 1);

            assert!(matches!(
                result,
                Err(crate::Error::Geometry(GeometryError::InvalidTolerance(_)))
            ));
            assert_eq!(calls, 0);
            assert_eq!(geometry, quad);
        }
    }
}
