// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tolerance-grid spatial hashing for vertex equality
//!
//! Coordinates are snapped to a grid of `tolerance` spacing with
//! `round(coordinate / tolerance)`. Two positions are "the same point" when they
//! land in the same grid cell. This is grid quantization, not nearest-neighbour
//! clustering: two points closer than `tolerance` but on opposite sides of a
//! cell boundary stay distinct.

use crate::error::GeometryError;
use ahash::AHashMap;
use std::hash::{Hash, Hasher};

/// Default merge tolerance in geometry units
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

const PRIME_X: i64 = 73_856_093;
const PRIME_Y: i64 = 19_349_663;
const PRIME_Z: i64 = 83_492_791;

/// Reject tolerances the grid cannot be built from
///
/// Zero, negative and non-finite values would collapse every coordinate into
/// a handful of saturated cells.
pub fn check_tolerance(tolerance: f64) -> Result<f64, GeometryError> {
    if tolerance.is_finite() && tolerance > 0.0 {
        Ok(tolerance)
    } else {
        Err(GeometryError::InvalidTolerance(tolerance))
    }
}

/// Quantize one coordinate onto the tolerance grid
pub fn quantize(value: f64, tolerance: f64) -> i64 {
    (value / tolerance).round() as i64
}

/// Quantized grid cell of a position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionKey(pub i64, pub i64, pub i64);

impl PositionKey {
    pub fn new(x: f64, y: f64, z: f64, tolerance: f64) -> Self {
        Self(
            quantize(x, tolerance),
            quantize(y, tolerance),
            quantize(z, tolerance),
        )
    }

    /// Key of vertex `index` in a flattened position buffer
    pub fn of_vertex(positions: &[f64], index: usize, tolerance: f64) -> Self {
        let i = index * 3;
        Self::new(positions[i], positions[i + 1], positions[i + 2], tolerance)
    }

    /// 3-D spatial hash of the cell
    pub fn spatial_hash(&self) -> u64 {
        spatial_hash(self.0, self.1, self.2)
    }
}

impl Hash for PositionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Equality stays exact on the triple, so a collision only costs an extra comparison.
        state.write_u64(self.spatial_hash());
    }
}

/// Multiply each cell coordinate by a large odd prime and XOR the products
pub fn spatial_hash(x: i64, y: i64, z: i64) -> u64 {
    (x.wrapping_mul(PRIME_X) ^ y.wrapping_mul(PRIME_Y) ^ z.wrapping_mul(PRIME_Z)) as u64
}

/// Canonical representative for every vertex of a position buffer
///
/// Vertices are visited in ascending index order and the first vertex seen in
/// each cell becomes the representative of that cell.
#[derive(Debug, Clone)]
pub struct VertexClasses {
    /// `representative[v]` is the first-seen vertex sharing `v`'s cell
    pub representative: Vec<u32>,
    /// First-seen vertices, ascending
    pub survivors: Vec<u32>,
}

impl VertexClasses {
    pub fn build(positions: &[f64], tolerance: f64) -> Self {
        let vertex_count = positions.len() / 3;
        let mut first_seen: AHashMap<PositionKey, u32> = AHashMap::with_capacity(vertex_count);
        let mut representative = Vec::with_capacity(vertex_count);
        let mut survivors = Vec::new();

        for v in 0..vertex_count {
            let key = PositionKey::of_vertex(positions, v, tolerance);
            let rep = *first_seen.entry(key).or_insert_with(|| {
                survivors.push(v as u32);
                v as u32
            });
            representative.push(rep);
        }

        Self {
            representative,
            survivors,
        }
    }

    /// Number of vertices that are not the representative of their cell
    pub fn duplicate_count(&self) -> usize {
        self.representative.len() - self.survivors.len()
    }
}
