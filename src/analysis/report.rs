// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Defect report types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Defect counts of one geometry
///
/// Created fresh by every analysis call and never mutated afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectReport {
    pub vertex_count: usize,
    pub face_count: usize,
    /// Vertices beyond the first in their tolerance cell
    pub duplicate_vertex_count: usize,
    /// Vertices used by no face (indexed geometry only)
    pub loose_vertex_count: usize,
    /// Edges shared by more than two faces
    pub non_manifold_edge_count: usize,
    /// Vertices whose faces do not form a single fan
    pub non_manifold_vertex_count: usize,
    /// Faces with a repeated vertex or near-zero area
    pub degenerate_face_count: usize,
    /// Edges used by exactly one face; informational, not a defect
    pub boundary_edge_count: usize,
}

impl DefectReport {
    /// Sum of every defect count; boundary edges are excluded
    pub fn issue_count(&self) -> usize {
        self.duplicate_vertex_count
            + self.loose_vertex_count
            + self.non_manifold_edge_count
            + self.non_manifold_vertex_count
            + self.degenerate_face_count
    }

    /// No non-manifold edges or vertices, no degenerate faces, no loose vertices
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
            && self.non_manifold_vertex_count == 0
            && self.degenerate_face_count == 0
            && self.loose_vertex_count == 0
    }

    /// The state the ensure-manifold loop tries to reach
    pub fn is_topologically_clean(&self) -> bool {
        self.non_manifold_edge_count == 0
            && self.non_manifold_vertex_count == 0
            && self.degenerate_face_count == 0
    }
}

impl fmt::Display for DefectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vertices:              {}", self.vertex_count)?;
        writeln!(f, "Faces:                 {}", self.face_count)?;
        writeln!(f, "Duplicate vertices:    {}", self.duplicate_vertex_count)?;
        writeln!(f, "Loose vertices:        {}", self.loose_vertex_count)?;
        writeln!(f, "Non-manifold edges:    {}", self.non_manifold_edge_count)?;
        writeln!(f, "Non-manifold vertices: {}", self.non_manifold_vertex_count)?;
        writeln!(f, "Degenerate faces:      {}", self.degenerate_face_count)?;
        write!(f, "Boundary edges:        {}", self.boundary_edge_count)
    }
}

/// Report of one named mesh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshDefects {
    pub name: String,
    pub report: DefectReport,
}

/// Sum of per-mesh reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateDefectReport {
    pub mesh_count: usize,
    pub vertex_count: usize,
    pub face_count: usize,
    pub duplicate_vertex_count: usize,
    pub loose_vertex_count: usize,
    pub non_manifold_edge_count: usize,
    pub non_manifold_vertex_count: usize,
    pub degenerate_face_count: usize,
    pub boundary_edge_count: usize,
    /// All defect counts except boundary edges
    pub total_issues: usize,
    pub meshes: Vec<MeshDefects>,
}

impl AggregateDefectReport {
    pub fn from_meshes(meshes: Vec<MeshDefects>) -> Self {
        let mut aggregate = Self {
            mesh_count: meshes.len(),
            ..Self::default()
        };

        for mesh in &meshes {
            let r = &mesh.report;
            aggregate.vertex_count += r.vertex_count;
            aggregate.face_count += r.face_count;
            aggregate.duplicate_vertex_count += r.duplicate_vertex_count;
            aggregate.loose_vertex_count += r.loose_vertex_count;
            aggregate.non_manifold_edge_count += r.non_manifold_edge_count;
            aggregate.non_manifold_vertex_count += r.non_manifold_vertex_count;
            aggregate.degenerate_face_count += r.degenerate_face_count;
            aggregate.boundary_edge_count += r.boundary_edge_count;
            aggregate.total_issues += r.issue_count();
        }

        aggregate.meshes = meshes;
        aggregate
    }

    /// True when downstream manifold-dependent processing can trust the meshes
    pub fn is_clean(&self) -> bool {
        self.total_issues == 0
    }

    pub fn is_topologically_clean(&self) -> bool {
        self.non_manifold_edge_count == 0
            && self.non_manifold_vertex_count == 0
            && self.degenerate_face_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_edges_are_not_issues() {
        let report = DefectReport {
            vertex_count: 4,
            face_count: 2,
            boundary_edge_count: 4,
            ..Default::default()
        };
        assert_eq!(report.issue_count(), 0);
        assert!(report.is_manifold());
    }

    #[test]
    fn test_total_issues() {
        let report = DefectReport {
            duplicate_vertex_count: 2,
            non_manifold_edge_count: 1,
            degenerate_face_count: 3,
            boundary_edge_count: 10,
            ..Default::default()
        };
        let aggregate = AggregateDefectReport::from_meshes(vec![
            MeshDefects {
                name: "a".into(),
                report,
            },
            MeshDefects {
                name: "b".into(),
                report,
            },
        ]);
        assert_eq!(aggregate.total_issues, 12);
        assert_eq!(aggregate.boundary_edge_count, 20);
        assert!(!aggregate.is_clean());
    }
}
