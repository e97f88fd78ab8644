// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Repair session over a scene with reset-to-original support

use super::pipeline::{repair_geometries, RepairOptions, RepairOutcome, RepairProgress};
use crate::analysis::{analyze_scene, AggregateDefectReport};
use crate::error::{Error, Result};
use crate::geometry::Geometry;
use crate::scene::{NodePath, Scene};
use tracing::info;

/// Deep copy of a mesh's geometry taken when the session starts
#[derive(Debug, Clone, PartialEq)]
pub struct OriginalGeometry {
    pub name: String,
    pub path: NodePath,
    pub geometry: Geometry,
}

/// Repairs the meshes of one scene and can put them back the way they were
pub struct Repairer {
    options: RepairOptions,
    originals: Vec<OriginalGeometry>,
}

impl Repairer {
    /// Snapshot every drawable triangle mesh of `scene`
    pub fn new(scene: &Scene, options: RepairOptions) -> Self {
        let originals: Vec<OriginalGeometry> = scene
            .mesh_entries()
            .into_iter()
            .filter_map(|entry| {
                scene.geometry(&entry.path).map(|geometry| OriginalGeometry {
                    name: entry.name,
                    path: entry.path,
                    geometry: geometry.clone(),
                })
            })
            .collect();
        info!(meshes = originals.len(), "repair session started");
        Self { options, originals }
    }

    pub fn options(&self) -> &RepairOptions {
        &self.options
    }

    pub fn originals(&self) -> &[OriginalGeometry] {
        &self.originals
    }

    pub fn analyze(&self, scene: &Scene) -> AggregateDefectReport {
        analyze_scene(scene, self.options.merge_tolerance)
    }

    /// Run the full repair pipeline over every mesh of `scene`
    pub fn repair(
        &self,
        scene: &mut Scene,
        on_progress: &mut dyn FnMut(RepairProgress),
    ) -> Result<RepairOutcome> {
        let names: Vec<String> = scene.mesh_entries().into_iter().map(|e| e.name).collect();
        let mut geometries = scene.geometries_mut();
        let mut outcome = repair_geometries(&mut geometries, &self.options, on_progress)?;

        for (mesh, name) in outcome.final_report.meshes.iter_mut().zip(names) {
            mesh.name = name;
        }
        Ok(outcome)
    }

    /// Restore every mesh to its snapshot
    pub fn reset(&self, scene: &mut Scene) -> Result<()> {
        let mut geometries = scene.geometries_mut();
        if geometries.len() != self.originals.len() {
            return Err(Error::SceneChanged {
                expected: self.originals.len(),
                found: geometries.len(),
            });
        }

        for (geometry, original) in geometries.iter_mut().zip(&self.originals) {
            **geometry = original.geometry.clone();
        }
        info!(meshes = self.originals.len(), "scene reset to original geometry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use crate::scene::SceneNode;
    use nalgebra::Vector3;

    fn soup_scene() -> Scene {
        let mut scene = Scene::default();
        scene.add(SceneNode::mesh(
            "crate",
            Primitive::cube(Vector3::new(1.0, 1.0, 1.0), true).to_soup(),
        ));
        scene
    }

    #[test]
    fn test_repair_then_reset() -> anyhow::Result<()> {
        let mut scene = soup_scene();
        let repairer = Repairer::new(&scene, RepairOptions::default());
        assert_eq!(repairer.analyze(&scene).duplicate_vertex_count, 28);

        let outcome = repairer.repair(&mut scene, &mut |_| {})?;
        assert!(outcome.is_manifold_ready());
        assert_eq!(outcome.final_report.meshes[0].name, "crate");
        assert_eq!(scene.geometry(&[0]).map(Geometry::vertex_count), Some(8));

        repairer.reset(&mut scene)?;
        assert_eq!(scene.geometry(&[0]), Some(&repairer.originals()[0].geometry));
        Ok(())
    }

    #[test]
    fn test_reset_detects_changed_scene() {
        let mut scene = soup_scene();
        let repairer = Repairer::new(&scene, RepairOptions::default());
        scene.add(SceneNode::mesh("extra", Primitive::quad(1.0).to_geometry()));

        let err = repairer.reset(&mut scene).unwrap_err();
        assert!(matches!(
            err,
            Error::SceneChanged {
                expected: 1,
                found: 2
            }
        ));
    }
}
