// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Point3, Vector3};

/// Unit normal of a triangle, `None` when the triangle has no area
pub fn triangle_normal(
    p0: &Point3<f64>,
    p1: &Point3<f64>,
    p2: &Point3<f64>,
) -> Option<Vector3<f64>> {
    let v1 = p1 - p0;
    let v2 = p2 - p0;
    v1.cross(&v2).try_normalize(f64::MIN_POSITIVE)
}

/// Centroid of a triangle
pub fn triangle_centroid(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Point3<f64> {
    Point3::from((p0.coords + p1.coords + p2.coords) / 3.0)
}

/// Normalize, leaving zero-length vectors at zero
pub fn normalize_or_zero(v: &Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(f64::MIN_POSITIVE).unwrap_or_else(Vector3::zeros)
}
