// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Reflecting surface sampled on the output pixel grid

use crate::geometry::{BoundingBox, Geometry};
use crate::utils::math::{triangle_centroid, triangle_normal};
use nalgebra::{Point3, Vector3};

/// Surface point seen by one pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

/// Row-major grid of optional surface samples; `None` pixels reflect nothing
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSurface {
    width: u32,
    height: u32,
    samples: Vec<Option<SurfaceSample>>,
}

impl SceneSurface {
    /// Horizontal plane at `z = 0`, centred on the origin, facing +Z
    pub fn flat(width: u32, height: u32, cell_size: f64) -> Self {
        let half_w = width as f64 * cell_size / 2.0;
        let half_h = height as f64 * cell_size / 2.0;
        let samples = (0..height)
            .flat_map(|row| (0..width).map(move |col| (row, col)))
            .map(|(row, col)| {
                Some(SurfaceSample {
                    position: Point3::new(
                        (col as f64 + 0.5) * cell_size - half_w,
                        (row as f64 + 0.5) * cell_size - half_h,
                        0.0,
                    ),
                    normal: Vector3::z(),
                })
            })
            .collect();
        Self {
            width,
            height,
            samples,
        }
    }

    /// Project a mesh straight down onto the grid
    ///
    /// Each triangle's centroid lands in the pixel under it; where several
    /// land in one pixel the highest one wins. Degenerate triangles are skipped.
    pub fn from_geometry(geometry: &Geometry, width: u32, height: u32) -> Self {
        let mut samples: Vec<Option<SurfaceSample>> = vec![None; width as usize * height as usize];
        let bounds = BoundingBox::from_positions(geometry.positions());
        if bounds.is_empty() || width == 0 || height == 0 {
            return Self {
                width,
                height,
                samples,
            };
        }

        let size = bounds.size();
        let cell = (size.x / width as f64).max(size.y / height as f64).max(f64::EPSILON);

        for face in geometry.faces() {
            let [a, b, c] = face.map(|v| geometry.position(v as usize));
            let Some(normal) = triangle_normal(&a, &b, &c) else {
                continue;
            };
            let centroid = triangle_centroid(&a, &b, &c);

            let col = (((centroid.x - bounds.min.x) / cell) as u32).min(width - 1);
            let row = (((centroid.y - bounds.min.y) / cell) as u32).min(height - 1);
            let slot = &mut samples[row as usize * width as usize + col as usize];
            if slot.map_or(true, |s| centroid.z > s.position.z) {
                *slot = Some(SurfaceSample {
                    position: centroid,
                    normal,
                });
            }
        }

        Self {
            width,
            height,
            samples,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample at a pixel; `None` outside the grid or where nothing was hit
    pub fn sample(&self, col: u32, row: u32) -> Option<&SurfaceSample> {
        if col >= self.width {
            return None;
        }
        self.samples
            .get(row as usize * self.width as usize + col as usize)
            .and_then(Option::as_ref)
    }

    /// Samples of one row
    ///
    /// Panics if `row` is not below `height()`.
    pub fn row(&self, row: u32) -> &[Option<SurfaceSample>] {
        let width = self.width as usize;
        let start = row as usize * width;
        &self.samples[start..start + width]
    }

    pub fn covered_pixels(&self) -> usize {
        self.samples.iter().filter(|s| s.is_some()).count()
    }
}
