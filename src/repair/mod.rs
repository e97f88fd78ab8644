// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh repair - composable passes, the ordered pipeline, scene sessions and pruning

pub mod passes;
mod pipeline;
mod prune;
mod session;

pub use passes::{
    fix_non_manifold_edges, merge_vertices, recalculate_normals, remove_degenerate_faces,
    remove_loose_vertices,
};
pub use pipeline::{
    repair_geometries, repair_geometry, ConvergenceReport, OperationCounts, RepairOptions,
    RepairOutcome, RepairProgress, RepairStep, MAX_CONVERGENCE_ITERATIONS,
};
pub use prune::{remove_meshes_with_issues, IssueThresholds, PruneReport};
pub use session::{OriginalGeometry, Repairer};
