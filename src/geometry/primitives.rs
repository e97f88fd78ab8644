// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Reference shapes used by tests, benchmarks and the CLI demo scene

use super::Geometry;
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Geometric primitives
pub enum Primitive {
    Cube { size: Vector3<f64>, center: bool },
    Sphere { r: f64, fn_: u32 },
    Quad { size: f64 },
}

/// Cube corner positions, min corner first
fn cube_corners(size: Vector3<f64>, center: bool) -> [Point3<f64>; 8] {
    let min = if center { -size / 2.0 } else { Vector3::zeros() };
    let max = min + size;
    [
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ]
}

/// Outward-wound cube triangles over `cube_corners`
const CUBE_FACES: [[u32; 3]; 12] = [
    // Front (z+)
    [4, 5, 6],
    [4, 6, 7],
    // Back (z-)
    [1, 0, 3],
    [1, 3, 2],
    // Right (x+)
    [5, 1, 2],
    [5, 2, 6],
    // Left (x-)
    [0, 4, 7],
    [0, 7, 3],
    // Top (y+)
    [7, 6, 2],
    [7, 2, 3],
    // Bottom (y-)
    [0, 1, 5],
    [0, 5, 4],
];

impl Primitive {
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    pub fn sphere(r: f64, fn_: u32) -> Self {
        let segments = if fn_ > 2 { fn_ } else { 32 };
        Self::Sphere { r, fn_: segments }
    }

    pub fn quad(size: f64) -> Self {
        Self::Quad { size }
    }

    /// Welded, indexed geometry
    pub fn to_geometry(&self) -> Geometry {
        let (positions, indices) = match self {
            Self::Cube { size, center } => {
                let positions = flatten(&cube_corners(*size, *center));
                (positions, CUBE_FACES.iter().flatten().copied().collect())
            }
            Self::Sphere { r, fn_ } => generate_sphere(*r, *fn_),
            Self::Quad { size } => (
                vec![
                    0.0, 0.0, 0.0, //
                    *size, 0.0, 0.0, //
                    *size, *size, 0.0, //
                    0.0, *size, 0.0,
                ],
                vec![0, 1, 2, 0, 2, 3],
            ),
        };
        Geometry::from_trusted(positions, None, None, Some(indices))
    }

    /// Non-indexed triangle soup: every face owns its three vertices
    pub fn to_soup(&self) -> Geometry {
        let welded = self.to_geometry();
        let mut positions = Vec::with_capacity(welded.face_count() * 9);
        for face in welded.faces() {
            for v in face {
                positions.extend(welded.position(v as usize).iter());
            }
        }
        Geometry::from_trusted(positions, None, None, None)
    }
}

fn flatten(points: &[Point3<f64>]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
}

/// UV sphere with a seam column and collapsed pole rings, like most DCC exports
fn generate_sphere(radius: f64, segments: u32) -> (Vec<f64>, Vec<u32>) {
    let stacks = segments;
    let slices = segments;
    let mut positions = Vec::with_capacity(((stacks + 1) * (slices + 1) * 3) as usize);
    let mut indices = Vec::with_capacity((stacks * slices * 6) as usize);

    for i in 0..=stacks {
        let phi = PI * i as f64 / stacks as f64;
        let y = radius * phi.cos();
        let r = radius * phi.sin();

        for j in 0..=slices {
            let theta = 2.0 * PI * j as f64 / slices as f64;
            positions.extend_from_slice(&[r * theta.cos(), y, r * theta.sin()]);
        }
    }

    for i in 0..stacks {
        for j in 0..slices {
            let first = i * (slices + 1) + j;
            let second = first + slices + 1;
            indices.extend_from_slice(&[first, first + 1, second]);
            indices.extend_from_slice(&[second, first + 1, second + 1]);
        }
    }

    (positions, indices)
}
