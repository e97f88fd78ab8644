// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - triangle buffers, spatial hashing and adjacency

pub mod adjacency;
mod bbox;
mod buffers;
pub mod hash;
mod primitives;

pub use adjacency::{face_edges, face_is_degenerate, is_degenerate, Adjacency, EdgeKey};
pub use bbox::BoundingBox;
pub use buffers::Geometry;
pub use hash::{check_tolerance, PositionKey, VertexClasses, DEFAULT_TOLERANCE};
pub use primitives::Primitive;
