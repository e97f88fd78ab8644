// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Minimal scene graph and mesh extraction
//!
//! The repair engine only cares about drawable triangle meshes. Everything
//! else in the tree (groups, lights, cameras, line and point meshes) is walked
//! over but never extracted.

mod node;

pub use node::{NodeKind, SceneNode, Topology};

use crate::error::{Error, Result};
use crate::geometry::Geometry;

/// Child indices leading from the root to a node; the root is `[]`
pub type NodePath = Vec<usize>;

/// Callback interface for depth-first pre-order traversal
pub trait SceneVisitor {
    fn visit(&mut self, node: &SceneNode, path: &[usize]);
}

/// One extracted triangle mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshEntry {
    /// Position in extraction order
    pub index: usize,
    /// Node name, or `Mesh_<index>` when the node has none
    pub name: String,
    pub path: NodePath,
}

/// Collects drawable triangle meshes in visit order
#[derive(Default)]
struct MeshCollector {
    entries: Vec<MeshEntry>,
}

impl SceneVisitor for MeshCollector {
    fn visit(&mut self, node: &SceneNode, path: &[usize]) {
        if node.triangle_geometry().is_none() {
            return;
        }
        let index = self.entries.len();
        let name = node
            .name
            .clone()
            .unwrap_or_else(|| format!("Mesh_{}", index));
        self.entries.push(MeshEntry {
            index,
            name,
            path: path.to_vec(),
        });
    }
}

/// A scene: a tree rooted at a group node
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub root: SceneNode,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneNode::group("root"))
    }
}

impl Scene {
    pub fn new(root: SceneNode) -> Self {
        Self { root }
    }

    /// Append a node under the root
    pub fn add(&mut self, node: SceneNode) -> &mut Self {
        self.root.children.push(node);
        self
    }

    /// Depth-first pre-order traversal
    pub fn walk<V: SceneVisitor + ?Sized>(&self, visitor: &mut V) {
        let mut path = Vec::new();
        walk_node(&self.root, &mut path, visitor);
    }

    /// Drawable triangle meshes in depth-first pre-order
    pub fn mesh_entries(&self) -> Vec<MeshEntry> {
        let mut collector = MeshCollector::default();
        self.walk(&mut collector);
        collector.entries
    }

    pub fn mesh_count(&self) -> usize {
        self.mesh_entries().len()
    }

    pub fn node(&self, path: &[usize]) -> Option<&SceneNode> {
        path.iter()
            .try_fold(&self.root, |node, &i| node.children.get(i))
    }

    pub fn node_mut(&mut self, path: &[usize]) -> Option<&mut SceneNode> {
        path.iter()
            .try_fold(&mut self.root, |node, &i| node.children.get_mut(i))
    }

    /// Geometry of the triangle mesh at `path`
    pub fn geometry(&self, path: &[usize]) -> Option<&Geometry> {
        self.node(path).and_then(SceneNode::triangle_geometry)
    }

    pub fn geometry_mut(&mut self, path: &[usize]) -> Option<&mut Geometry> {
        self.node_mut(path)
            .and_then(SceneNode::triangle_geometry_mut)
    }

    /// Swap in a new geometry for the triangle mesh at `path`
    pub fn replace_geometry(&mut self, path: &[usize], geometry: Geometry) -> Result<()> {
        let slot = self
            .geometry_mut(path)
            .ok_or_else(|| Error::NoMeshAtPath(path.to_vec()))?;
        *slot = geometry;
        Ok(())
    }

    /// Mutable handles to every extracted geometry, in `mesh_entries` order
    pub fn geometries_mut(&mut self) -> Vec<&mut Geometry> {
        let mut out = Vec::new();
        collect_geometries_mut(&mut self.root, &mut out);
        out
    }

    /// Detach the node at `path`; the root cannot be removed
    pub fn remove_node(&mut self, path: &[usize]) -> Option<SceneNode> {
        let (&last, parent_path) = path.split_last()?;
        let parent = self.node_mut(parent_path)?;
        if last < parent.children.len() {
            Some(parent.children.remove(last))
        } else {
            None
        }
    }
}

fn walk_node<V: SceneVisitor + ?Sized>(node: &SceneNode, path: &mut Vec<usize>, visitor: &mut V) {
    visitor.visit(node, path);
    for (i, child) in node.children.iter().enumerate() {
        path.push(i);
        walk_node(child, path, visitor);
        path.pop();
    }
}

fn collect_geometries_mut<'a>(node: &'a mut SceneNode, out: &mut Vec<&'a mut Geometry>) {
    let SceneNode { kind, children, .. } = node;
    if let NodeKind::Mesh {
        geometry,
        topology: Topology::Triangles,
    } = kind
    {
        if !geometry.positions().is_empty() {
            out.push(geometry);
        }
    }
    for child in children.iter_mut() {
        collect_geometries_mut(child, out);
    }
}
