// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! WASM bindings using wasm-bindgen

use crate::analysis::analyze_geometry;
use crate::obj::{self, ObjModel};
use crate::repair::RepairOptions;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmMesh {
    inner: ObjModel,
}

#[wasm_bindgen]
impl WasmMesh {
    /// Parse OBJ text
    #[wasm_bindgen(constructor)]
    pub fn new(source: &str) -> Result<WasmMesh, JsValue> {
        let inner =
            obj::parse_obj(source).map_err(|e| JsValue::from_str(&format!("Parse error: {}", e)))?;
        Ok(WasmMesh { inner })
    }

    pub fn vertex_count(&self) -> usize {
        self.inner.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.inner.faces.len()
    }

    /// Defect report as JSON
    pub fn analyze(&self, tolerance: f64) -> Result<String, JsValue> {
        let geometry = self
            .inner
            .to_geometry()
            .map_err(|e| JsValue::from_str(&format!("Geometry error: {}", e)))?;
        to_json(&analyze_geometry(&geometry, tolerance))
    }

    /// Repair in place; `options_json` may be empty for the defaults
    pub fn repair(&mut self, options_json: &str) -> Result<String, JsValue> {
        let options = parse_options(options_json)?;
        let summary = obj::repair_obj(&mut self.inner, &options)
            .map_err(|e| JsValue::from_str(&format!("Repair error: {}", e)))?;
        to_json(&summary)
    }

    /// Serialize back to OBJ text
    pub fn to_obj(&self) -> String {
        obj::write_obj(&self.inner)
    }
}

/// Analyze OBJ text and return the defect report as JSON
#[wasm_bindgen]
pub fn analyze_obj(source: &str, tolerance: f64) -> Result<String, JsValue> {
    WasmMesh::new(source)?.analyze(tolerance)
}

/// Repair OBJ text and return the repaired text
#[wasm_bindgen]
pub fn repair_obj_text(source: &str, options_json: &str) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    let (text, _) = obj::repair_obj_text(source, &options)
        .map_err(|e| JsValue::from_str(&format!("Repair error: {}", e)))?;
    Ok(text)
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    crate::VERSION.to_string()
}

fn parse_options(options_json: &str) -> Result<RepairOptions, JsValue> {
    if options_json.trim().is_empty() {
        return Ok(RepairOptions::default());
    }
    serde_json::from_str(options_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid repair options: {}", e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string_pretty(value)
        .map_err(|e| JsValue::from_str(&format!("JSON serialization error: {}", e)))
}
