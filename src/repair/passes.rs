// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Individual repair passes
//!
//! Each pass reads the current buffers, builds a complete replacement
//! `Geometry` and swaps it in. Passes that need an index buffer leave
//! non-indexed geometry untouched and report zero.

use crate::geometry::{face_edges, face_is_degenerate, EdgeKey, Geometry, VertexClasses};
use crate::utils::math::{normalize_or_zero, triangle_normal};
use ahash::AHashMap;
use nalgebra::Vector3;
use tracing::{debug, warn};

/// Collapse vertices that share a tolerance cell
///
/// The first vertex of each cell survives and keeps its attributes; faces are
/// remapped onto the survivors. Non-indexed input comes out indexed, with the
/// implicit triangle list as its starting index buffer.
/// Returns the number of vertices collapsed.
pub fn merge_vertices(geometry: &mut Geometry, tolerance: f64) -> usize {
    let classes = VertexClasses::build(geometry.positions(), tolerance);
    let collapsed = classes.duplicate_count();
    if collapsed == 0 {
        return 0;
    }

    let mut new_index = vec![0u32; geometry.vertex_count()];
    for (new, &old) in classes.survivors.iter().enumerate() {
        new_index[old as usize] = new as u32;
    }

    let indices: Vec<u32> = geometry
        .index_buffer()
        .into_iter()
        .map(|v| new_index[classes.representative[v as usize] as usize])
        .collect();

    *geometry = geometry.rebuild_vertices(&classes.survivors, Some(indices));
    debug!(collapsed, remaining = geometry.vertex_count(), "merged vertices");
    collapsed
}

/// Drop vertices that no face references
///
/// Returns the number of vertices removed.
pub fn remove_loose_vertices(geometry: &mut Geometry) -> usize {
    let Some(indices) = geometry.indices() else {
        warn!("remove_loose_vertices skipped: geometry is not indexed");
        return 0;
    };

    let mut used = vec![false; geometry.vertex_count()];
    for &v in indices {
        used[v as usize] = true;
    }

    let mut new_index = vec![0u32; geometry.vertex_count()];
    let mut survivors = Vec::with_capacity(geometry.vertex_count());
    for (old, &is_used) in used.iter().enumerate() {
        if is_used {
            new_index[old] = survivors.len() as u32;
            survivors.push(old as u32);
        }
    }

    let removed = geometry.vertex_count() - survivors.len();
    if removed == 0 {
        return 0;
    }

    let remapped = indices.iter().map(|&v| new_index[v as usize]).collect();
    *geometry = geometry.rebuild_vertices(&survivors, Some(remapped));
    debug!(removed, "removed loose vertices");
    removed
}

/// Keep at most two faces on every edge
///
/// Faces are visited in buffer order; on an edge with more than two faces the
/// first two stay and every later face on that edge is dropped.
/// Returns the number of faces removed.
pub fn fix_non_manifold_edges(geometry: &mut Geometry) -> usize {
    let Some(indices) = geometry.indices() else {
        warn!("fix_non_manifold_edges skipped: geometry is not indexed");
        return 0;
    };

    let face_count = geometry.face_count();
    let mut edge_faces: AHashMap<EdgeKey, Vec<usize>> = AHashMap::with_capacity(face_count * 3 / 2);
    for (f, face) in indices.chunks_exact(3).enumerate() {
        let face = [face[0], face[1], face[2]];
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            continue;
        }
        for edge in face_edges(face) {
            edge_faces.entry(edge).or_default().push(f);
        }
    }

    let mut remove = vec![false; face_count];
    for faces in edge_faces.values().filter(|faces| faces.len() > 2) {
        for &f in &faces[2..] {
            remove[f] = true;
        }
    }

    let removed = remove.iter().filter(|&&r| r).count();
    if removed == 0 {
        return 0;
    }

    let kept: Vec<u32> = indices
        .chunks_exact(3)
        .zip(&remove)
        .filter(|(_, &r)| !r)
        .flat_map(|(face, _)| face.iter().copied())
        .collect();
    *geometry = geometry.rebuild_indices(kept);
    debug!(removed, "removed faces on non-manifold edges");
    removed
}

/// Drop faces with a repeated vertex or near-zero area
///
/// Returns the number of faces removed.
pub fn remove_degenerate_faces(geometry: &mut Geometry, tolerance: f64) -> usize {
    if !geometry.is_indexed() {
        warn!("remove_degenerate_faces skipped: geometry is not indexed");
        return 0;
    }

    let mut kept = Vec::with_capacity(geometry.face_count() * 3);
    let mut removed = 0;
    for face in geometry.faces() {
        if face_is_degenerate(geometry, face, tolerance) {
            removed += 1;
        } else {
            kept.extend_from_slice(&face);
        }
    }

    if removed == 0 {
        return 0;
    }

    *geometry = geometry.rebuild_indices(kept);
    debug!(removed, "removed degenerate faces");
    removed
}

/// Recompute smooth vertex normals from face normals
///
/// Unit face normals are summed at each vertex and renormalized. Vertices with
/// no usable face keep a zero normal. Returns 1 (one geometry processed).
pub fn recalculate_normals(geometry: &mut Geometry) -> usize {
    let mut sums = vec![Vector3::<f64>::zeros(); geometry.vertex_count()];

    for face in geometry.faces() {
        let [a, b, c] = face.map(|v| geometry.position(v as usize));
        if let Some(normal) = triangle_normal(&a, &b, &c) {
            for v in face {
                sums[v as usize] += normal;
            }
        }
    }

    let normals: Vec<f64> = sums
        .iter()
        .flat_map(|sum| {
            let n = normalize_or_zero(sum);
            [n.x, n.y, n.z]
        })
        .collect();

    *geometry = geometry.rebuild_normals(normals);
    debug!(vertices = geometry.vertex_count(), "recalculated normals");
    1
}
