// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Radar image synthesis end to end

use anyhow::Result;
use meshdoctor::error::RadarError;
use meshdoctor::geometry::Primitive;
use meshdoctor::radar::{synthesize, synthesize_geometry, AperturePath, RadarConfig, SceneSurface};
use nalgebra::{Point3, Vector3};
use tempfile::NamedTempFile;

fn overhead_pass() -> AperturePath {
    AperturePath::Linear {
        start: Point3::new(-5.0, -20.0, 15.0),
        end: Point3::new(5.0, -20.0, 15.0),
        samples: 16,
    }
}

#[test]
fn test_empty_aperture_aborts() {
    let surface = SceneSurface::flat(8, 8, 1.0);
    let aperture = AperturePath::Linear {
        start: Point3::origin(),
        end: Point3::new(1.0, 0.0, 0.0),
        samples: 0,
    };
    assert!(aperture.is_empty());

    let err = synthesize(&surface, &aperture, &RadarConfig::default()).unwrap_err();
    assert!(matches!(err, RadarError::EmptyAperture));
    assert_eq!(err.to_string(), "aperture path is empty");

    let err: meshdoctor::Error = err.into();
    assert!(err.to_string().contains("aperture path is empty"));
}

#[test]
fn test_invalid_parameters_are_rejected() {
    let surface = SceneSurface::flat(8, 8, 1.0);
    let config = RadarConfig {
        wavelength: 0.0,
        ..RadarConfig::default()
    };
    assert!(matches!(
        synthesize(&surface, &overhead_pass(), &config),
        Err(RadarError::InvalidWavelength(_))
    ));

    let empty = SceneSurface::flat(0, 8, 1.0);
    assert!(matches!(
        synthesize(&empty, &overhead_pass(), &RadarConfig::default()),
        Err(RadarError::EmptyGrid { width: 0, height: 8 })
    ));
}

#[test]
fn test_mesh_image_is_written_as_png() -> Result<()> {
    let cube = Primitive::cube(Vector3::new(4.0, 4.0, 2.0), true).to_geometry();
    let config = RadarConfig {
        width: 32,
        height: 24,
        ..RadarConfig::default()
    };

    let image = synthesize_geometry(&cube, &overhead_pass(), &config)?;
    assert_eq!(image.dimensions(), (32, 24));
    assert_eq!(image.pixels().map(|p| p.0[0]).max(), Some(255));

    let file = NamedTempFile::with_suffix(".png")?;
    image.save(file.path())?;
    let reloaded = image::open(file.path())?.to_luma8();
    assert_eq!(reloaded, image);
    Ok(())
}

#[test]
fn test_circular_aperture_images_flat_ground() -> Result<()> {
    let surface = SceneSurface::flat(16, 16, 0.5);
    let aperture = AperturePath::Circular {
        center: Point3::origin(),
        radius: 10.0,
        height: 10.0,
        samples: 12,
    };
    assert_eq!(aperture.positions().len(), 12);

    let image = synthesize(&surface, &aperture, &RadarConfig::default())?;
    assert_eq!(image.dimensions(), (16, 16));
    assert!(image.pixels().any(|p| p.0[0] > 0));
    Ok(())
}
