// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene graph nodes

use crate::geometry::Geometry;

/// Primitive topology of a mesh node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
    Points,
}

/// What a node carries
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Pure container
    Group,
    Mesh {
        geometry: Geometry,
        topology: Topology,
    },
    Light,
    Camera,
}

/// A node of the scene tree
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: Option<String>,
    pub kind: NodeKind,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: Option<String>, kind: NodeKind) -> Self {
        Self {
            name,
            kind,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(Some(name.into()), NodeKind::Group)
    }

    /// Named triangle mesh
    pub fn mesh(name: impl Into<String>, geometry: Geometry) -> Self {
        Self::new(
            Some(name.into()),
            NodeKind::Mesh {
                geometry,
                topology: Topology::Triangles,
            },
        )
    }

    /// Triangle mesh without a name; extraction names it `Mesh_<n>`
    pub fn unnamed_mesh(geometry: Geometry) -> Self {
        Self::new(
            None,
            NodeKind::Mesh {
                geometry,
                topology: Topology::Triangles,
            },
        )
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group)
    }

    /// Geometry of a drawable triangle mesh: triangle topology and at least
    /// one position
    pub fn triangle_geometry(&self) -> Option<&Geometry> {
        match &self.kind {
            NodeKind::Mesh {
                geometry,
                topology: Topology::Triangles,
            } if !geometry.positions().is_empty() => Some(geometry),
            _ => None,
        }
    }

    pub fn triangle_geometry_mut(&mut self) -> Option<&mut Geometry> {
        match &mut self.kind {
            NodeKind::Mesh {
                geometry,
                topology: Topology::Triangles,
            } if !geometry.positions().is_empty() => Some(geometry),
            _ => None,
        }
    }
}
