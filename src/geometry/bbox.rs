// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding box utilities

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Bounds of a flattened position buffer
    pub fn from_positions(positions: &[f64]) -> Self {
        let mut bbox = Self::empty();
        for p in positions.chunks_exact(3) {
            bbox.expand_to_include(&Point3::new(p[0], p[1], p[2]));
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);

        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_positions() {
        let bbox = BoundingBox::from_positions(&[0.0, -1.0, 2.0, 4.0, 3.0, -2.0]);
        assert_eq!(bbox.min, Point3::new(0.0, -1.0, -2.0));
        assert_eq!(bbox.max, Point3::new(4.0, 3.0, 2.0));
        assert_eq!(bbox.center(), Point3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn test_empty() {
        assert!(BoundingBox::from_positions(&[]).is_empty());
    }
}
