// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Synthetic-aperture radar imaging
//!
//! Configure a sensor path, accumulate the complex returns of a surface,
//! focus with the filter bank and emit an 8-bit grayscale image.

mod aperture;
pub mod filters;
mod surface;
mod synthesis;

pub use aperture::AperturePath;
pub use surface::{SceneSurface, SurfaceSample};
pub use synthesis::{accumulate, focus, synthesize, to_grayscale, ComplexImage, RadarConfig};

use crate::error::RadarError;
use crate::geometry::Geometry;
use image::GrayImage;

/// Image a mesh seen from above on a `config.width` x `config.height` grid
pub fn synthesize_geometry(
    geometry: &Geometry,
    aperture: &AperturePath,
    config: &RadarConfig,
) -> Result<GrayImage, RadarError> {
    let surface = SceneSurface::from_geometry(geometry, config.width, config.height);
    synthesize(&surface, aperture, config)
}
