// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sensor paths

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Where the sensor takes its samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AperturePath {
    /// `samples` evenly spaced points from `start` to `end`, both included
    Linear {
        start: Point3<f64>,
        end: Point3<f64>,
        samples: usize,
    },
    /// `samples` points on a horizontal circle `height` above `center`
    Circular {
        center: Point3<f64>,
        radius: f64,
        height: f64,
        samples: usize,
    },
    Custom(Vec<Point3<f64>>),
}

impl AperturePath {
    /// Sensor positions in acquisition order
    pub fn positions(&self) -> Vec<Point3<f64>> {
        match self {
            Self::Linear {
                start,
                end,
                samples,
            } => match *samples {
                0 => Vec::new(),
                1 => vec![*start],
                n => (0..n)
                    .map(|i| start + (end - start) * (i as f64 / (n - 1) as f64))
                    .collect(),
            },
            Self::Circular {
                center,
                radius,
                height,
                samples,
            } => (0..*samples)
                .map(|i| {
                    let angle = 2.0 * PI * i as f64 / *samples as f64;
                    Point3::new(
                        center.x + radius * angle.cos(),
                        center.y + radius * angle.sin(),
                        center.z + height,
                    )
                })
                .collect(),
            Self::Custom(points) => points.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Linear { samples, .. } | Self::Circular { samples, .. } => *samples == 0,
            Self::Custom(points) => points.is_empty(),
        }
    }
}
