// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Coherent accumulation and image formation

use super::aperture::AperturePath;
use super::filters::{azimuth_kernel, convolve_columns, convolve_rows, RANGE_KERNEL};
use super::surface::SceneSurface;
use crate::error::RadarError;
use image::{GrayImage, Luma};
use nalgebra::Point3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

/// Imaging parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    /// Carrier wavelength in scene units
    pub wavelength: f64,
    /// Grid width used when a surface is built from a mesh
    pub width: u32,
    /// Grid height used when a surface is built from a mesh
    pub height: u32,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            wavelength: 0.03,
            width: 256,
            height: 256,
        }
    }
}

/// Complex image as separate real and imaginary planes
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexImage {
    pub width: usize,
    pub height: usize,
    pub re: Vec<f64>,
    pub im: Vec<f64>,
}

impl ComplexImage {
    fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            re: vec![0.0; width * height],
            im: vec![0.0; width * height],
        }
    }

    pub fn magnitude(&self) -> Vec<f64> {
        self.re
            .iter()
            .zip(&self.im)
            .map(|(re, im)| re.hypot(*im))
            .collect()
    }
}

/// Sum the returns of every sensor position into one complex image
///
/// Each pixel contributes `max(0, cos θ)` at phase `4π·d/λ`, where `d` is
/// the sensor distance and `θ` the angle between the surface normal and the
/// direction to the sensor.
pub fn accumulate(
    surface: &SceneSurface,
    sensors: &[Point3<f64>],
    wavelength: f64,
) -> ComplexImage {
    let width = surface.width() as usize;
    let mut image = ComplexImage::zeros(width, surface.height() as usize);
    if width == 0 {
        return image;
    }
    let k = 4.0 * PI / wavelength;

    image
        .re
        .par_chunks_mut(width)
        .zip(image.im.par_chunks_mut(width))
        .enumerate()
        .for_each(|(y, (re_row, im_row))| {
            for (x, sample) in surface.row(y as u32).iter().enumerate() {
                let Some(sample) = sample else { continue };
                for sensor in sensors {
                    let to_sensor = sensor - sample.position;
                    let distance = to_sensor.norm();
                    if distance <= f64::EPSILON {
                        continue;
                    }
                    let reflectivity = (sample.normal.dot(&to_sensor) / distance).max(0.0);
                    let phase = k * distance;
                    re_row[x] += reflectivity * phase.cos();
                    im_row[x] += reflectivity * phase.sin();
                }
            }
        });
    image
}

/// Range compression along rows, azimuth focusing along columns
pub fn focus(image: &mut ComplexImage) {
    let azimuth = azimuth_kernel();
    for plane in [&mut image.re, &mut image.im] {
        convolve_rows(plane, image.width, &RANGE_KERNEL);
        convolve_columns(plane, image.width, &azimuth);
    }
}

/// Map magnitudes onto 0..=255; an all-zero input gives a black image
pub fn to_grayscale(magnitude: &[f64], width: u32, height: u32) -> GrayImage {
    let max = magnitude.iter().copied().fold(0.0, f64::max);
    let scale = if max > 0.0 { 255.0 / max } else { 0.0 };
    GrayImage::from_fn(width, height, |x, y| {
        let m = magnitude[y as usize * width as usize + x as usize];
        Luma([(m * scale).round().clamp(0.0, 255.0) as u8])
    })
}

/// Run the whole pipeline once
pub fn synthesize(
    surface: &SceneSurface,
    aperture: &AperturePath,
    config: &RadarConfig,
) -> Result<GrayImage, RadarError> {
    let sensors = aperture.positions();
    if sensors.is_empty() {
        return Err(RadarError::EmptyAperture);
    }
    if config.wavelength.is_nan() || config.wavelength <= 0.0 {
        return Err(RadarError::InvalidWavelength(config.wavelength));
    }
    if surface.width() == 0 || surface.height() == 0 {
        return Err(RadarError::EmptyGrid {
            width: surface.width(),
            height: surface.height(),
        });
    }

    let mut image = accumulate(surface, &sensors, config.wavelength);
    focus(&mut image);
    debug!(
        sensors = sensors.len(),
        covered = surface.covered_pixels(),
        "radar image focused"
    );
    Ok(to_grayscale(
        &image.magnitude(),
        surface.width(),
        surface.height(),
    ))
}
