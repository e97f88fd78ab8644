// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use super::{FaceCorner, ObjModel};
use std::fmt::Write;

/// Serialize a model to OBJ text with 1-based references
pub fn write_obj(model: &ObjModel) -> String {
    let mut out = String::with_capacity(
        32 * (model.positions.len() + model.normals.len() + model.tex_coords.len())
            + 24 * model.faces.len(),
    );

    writeln!(out, "# meshdoctor {}", crate::VERSION).ok();
    if let Some(name) = &model.name {
        writeln!(out, "o {}", name).ok();
    }
    for p in &model.positions {
        writeln!(out, "v {} {} {}", p.x, p.y, p.z).ok();
    }
    for [u, v] in &model.tex_coords {
        writeln!(out, "vt {} {}", u, v).ok();
    }
    for n in &model.normals {
        writeln!(out, "vn {} {} {}", n.x, n.y, n.z).ok();
    }
    for face in &model.faces {
        out.push('f');
        for corner in &face.corners {
            out.push(' ');
            write_corner(&mut out, corner);
        }
        out.push('\n');
    }
    out
}

fn write_corner(out: &mut String, corner: &FaceCorner) {
    let v = corner.vertex + 1;
    match (corner.tex_coord, corner.normal) {
        (None, None) => write!(out, "{}", v),
        (Some(t), None) => write!(out, "{}/{}", v, t + 1),
        (None, Some(n)) => write!(out, "{}//{}", v, n + 1),
        (Some(t), Some(n)) => write!(out, "{}/{}/{}", v, t + 1, n + 1),
    }
    .ok();
}
