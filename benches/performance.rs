// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use meshdoctor::geometry::{Primitive, DEFAULT_TOLERANCE};
use meshdoctor::radar::{synthesize, AperturePath, RadarConfig, SceneSurface};
use meshdoctor::repair::{merge_vertices, repair_geometry, RepairOptions};
use meshdoctor::{analyze_geometry, parse_obj, write_obj, ObjModel};
use nalgebra::Point3;

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");

    for segments in [16, 32, 64] {
        let soup = Primitive::sphere(10.0, segments).to_soup();
        group.bench_with_input(BenchmarkId::new("sphere_soup", segments), &soup, |b, soup| {
            b.iter(|| analyze_geometry(black_box(soup), DEFAULT_TOLERANCE));
        });
    }

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_vertices");

    for segments in [16, 32, 64] {
        let soup = Primitive::sphere(10.0, segments).to_soup();
        group.bench_with_input(BenchmarkId::new("sphere_soup", segments), &soup, |b, soup| {
            b.iter(|| {
                let mut geometry = soup.clone();
                merge_vertices(black_box(&mut geometry), DEFAULT_TOLERANCE)
            });
        });
    }

    group.finish();
}

fn bench_repair(c: &mut Criterion) {
    let mut group = c.benchmark_group("repair");

    let soup = Primitive::sphere(10.0, 32).to_soup();
    let options = RepairOptions {
        ensure_manifold: true,
        ..RepairOptions::default()
    };
    group.bench_function("sphere_32_ensure_manifold", |b| {
        b.iter(|| {
            let mut geometry = soup.clone();
            repair_geometry(black_box(&mut geometry), &options).unwrap()
        });
    });

    group.finish();
}

fn bench_obj(c: &mut Criterion) {
    let mut group = c.benchmark_group("obj");

    let sphere = Primitive::sphere(10.0, 32).to_geometry();
    let text = write_obj(&ObjModel::from_geometry(&sphere, Some("sphere".to_string())));
    group.bench_function("parse_sphere_32", |b| {
        b.iter(|| parse_obj(black_box(&text)).unwrap());
    });

    group.finish();
}

fn bench_radar(c: &mut Criterion) {
    let mut group = c.benchmark_group("radar");
    group.sample_size(10);

    let aperture = AperturePath::Linear {
        start: Point3::new(-10.0, -40.0, 20.0),
        end: Point3::new(10.0, -40.0, 20.0),
        samples: 32,
    };
    for size in [64u32, 128] {
        let surface = SceneSurface::flat(size, size, 0.25);
        let config = RadarConfig {
            width: size,
            height: size,
            ..RadarConfig::default()
        };
        group.bench_with_input(BenchmarkId::new("flat", size), &surface, |b, surface| {
            b.iter(|| synthesize(black_box(surface), &aperture, &config).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_analyze,
    bench_merge,
    bench_repair,
    bench_obj,
    bench_radar
);
criterion_main!(benches);
