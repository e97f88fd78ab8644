// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for geometry construction, OBJ parsing and radar synthesis

use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Obj(#[from] ObjError),

    #[error(transparent)]
    Radar(#[from] RadarError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The scene no longer matches the snapshot taken by a repair session
    #[error("scene changed since snapshot: expected {expected} meshes, found {found}")]
    SceneChanged { expected: usize, found: usize },

    /// A node path did not resolve to a triangle mesh
    #[error("no triangle mesh at node path {0:?}")]
    NoMeshAtPath(Vec<usize>),
}

/// Violations of the geometry buffer invariants
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("position buffer length {0} is not a multiple of 3")]
    PositionLength(usize),

    #[error("{attribute} buffer has {actual} values, expected {expected}")]
    AttributeLength {
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("index buffer length {0} is not a multiple of 3")]
    IndexLength(usize),

    #[error("index {index} out of range (geometry has {vertex_count} vertices)")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("non-indexed geometry needs a multiple of 3 vertices, got {0}")]
    IncompleteTriangle(usize),

    #[error("merge tolerance must be finite and positive, got {0}")]
    InvalidTolerance(f64),
}

/// Failures while reading OBJ text
#[derive(Debug, Error)]
pub enum ObjError {
    #[error("OBJ syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("invalid number '{text}' at line {line}")]
    Number { line: usize, text: String },

    #[error("{kind} reference {reference} at line {line} is out of range ({count} defined)")]
    Reference {
        kind: &'static str,
        reference: i64,
        count: usize,
        line: usize,
    },
}

/// Hard input errors of the radar pipeline
#[derive(Debug, Error)]
pub enum RadarError {
    #[error("aperture path is empty")]
    EmptyAperture,

    #[error("image grid must be non-empty, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },

    #[error("wavelength must be positive, got {0}")]
    InvalidWavelength(f64),
}
