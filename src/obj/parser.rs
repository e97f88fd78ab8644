// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! OBJ parser using pest

use super::{FaceCorner, ObjFace, ObjModel};
use crate::error::{ObjError, Result};
use nalgebra::{Point3, Vector3};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use tracing::debug;

#[derive(Parser)]
#[grammar = "obj/obj.pest"]
struct ObjParser;

/// Parse OBJ text into a model
///
/// Face references are converted to 0-based indices and checked against the
/// elements defined so far. Negative references count back from the latest
/// element. Polygons with more than three corners are fan-triangulated.
pub fn parse_obj(source: &str) -> Result<ObjModel> {
    let mut pairs = ObjParser::parse(Rule::file, source).map_err(|e| {
        let line = match e.line_col {
            pest::error::LineColLocation::Pos((line, _)) => line,
            pest::error::LineColLocation::Span((line, _), _) => line,
        };
        ObjError::Syntax {
            line,
            message: e.variant.message().into_owned(),
        }
    })?;

    let mut model = ObjModel::default();
    let mut polygons = 0usize;

    let Some(file) = pairs.next() else {
        return Ok(model);
    };

    for pair in file.into_inner() {
        let line = pair.as_span().start_pos().line_col().0;
        match pair.as_rule() {
            Rule::vertex => {
                let [x, y, z] = parse_triple(pair, line)?;
                model.positions.push(Point3::new(x, y, z));
            }
            Rule::normal => {
                let [x, y, z] = parse_triple(pair, line)?;
                model.normals.push(Vector3::new(x, y, z));
            }
            Rule::tex_coord => {
                let mut values = pair.into_inner();
                let u = next_number(&mut values, line)?.unwrap_or(0.0);
                let v = next_number(&mut values, line)?.unwrap_or(0.0);
                model.tex_coords.push([u, v]);
            }
            Rule::face => {
                let corners = pair
                    .into_inner()
                    .map(|corner| parse_corner(corner, &model, line))
                    .collect::<std::result::Result<Vec<_>, ObjError>>()?;
                polygons += 1;
                for i in 1..corners.len() - 1 {
                    model.faces.push(ObjFace {
                        corners: [corners[0], corners[i], corners[i + 1]],
                    });
                }
            }
            Rule::object => {
                if let Some(name) = pair.into_inner().next() {
                    model.name = Some(name.as_str().trim().to_string());
                }
            }
            _ => {}
        }
    }

    debug!(
        vertices = model.positions.len(),
        polygons,
        triangles = model.faces.len(),
        "parsed OBJ"
    );
    Ok(model)
}

fn parse_number(pair: &Pair<Rule>, line: usize) -> std::result::Result<f64, ObjError> {
    pair.as_str().parse::<f64>().map_err(|_| ObjError::Number {
        line,
        text: pair.as_str().to_string(),
    })
}

fn next_number<'i>(
    values: &mut impl Iterator<Item = Pair<'i, Rule>>,
    line: usize,
) -> std::result::Result<Option<f64>, ObjError> {
    values.next().map(|p| parse_number(&p, line)).transpose()
}

/// First three numbers of a statement; extra components are ignored
fn parse_triple(pair: Pair<Rule>, line: usize) -> std::result::Result<[f64; 3], ObjError> {
    let mut values = pair.into_inner();
    let mut out = [0.0; 3];
    for slot in &mut out {
        *slot = next_number(&mut values, line)?.unwrap_or(0.0);
    }
    Ok(out)
}

fn parse_corner(
    pair: Pair<Rule>,
    model: &ObjModel,
    line: usize,
) -> std::result::Result<FaceCorner, ObjError> {
    let mut corner = FaceCorner::new(0);
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::vertex_ref => {
                corner.vertex = resolve(&part, "vertex", model.positions.len(), line)?;
            }
            Rule::uv_ref => {
                corner.tex_coord = Some(resolve(
                    &part,
                    "texture coordinate",
                    model.tex_coords.len(),
                    line,
                )?);
            }
            Rule::normal_ref => {
                corner.normal = Some(resolve(&part, "normal", model.normals.len(), line)?);
            }
            _ => {}
        }
    }
    Ok(corner)
}

/// Turn a 1-based (or negative, relative) OBJ reference into a 0-based index
fn resolve(
    pair: &Pair<Rule>,
    kind: &'static str,
    count: usize,
    line: usize,
) -> std::result::Result<usize, ObjError> {
    let reference: i64 = pair.as_str().parse().map_err(|_| ObjError::Number {
        line,
        text: pair.as_str().to_string(),
    })?;

    let index = match reference {
        r if r > 0 => r - 1,
        r if r < 0 => count as i64 + r,
        _ => -1,
    };

    if index < 0 || index as usize >= count {
        return Err(ObjError::Reference {
            kind,
            reference,
            count,
            line,
        });
    }
    Ok(index as usize)
}
