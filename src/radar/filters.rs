// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Separable 1-D filter bank
//!
//! Kernels are applied along one axis of a row-major grid. Samples past the
//! border are clamped to the edge value.

use rayon::prelude::*;

/// Sharpening kernel used for range compression
pub const RANGE_KERNEL: [f64; 5] = [-0.25, -0.5, 2.5, -0.5, -0.25];

/// Normalized Gaussian of `N` taps, centred on the middle tap
pub fn gaussian_kernel<const N: usize>(sigma: f64) -> [f64; N] {
    let half = (N / 2) as f64;
    let mut kernel = [0.0; N];
    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f64 - half;
        *k = (-(x * x) / (2.0 * sigma * sigma)).exp();
    }
    let sum: f64 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// 7-tap azimuth focusing kernel
pub fn azimuth_kernel() -> [f64; 7] {
    gaussian_kernel::<7>(1.0)
}

/// Convolve every row of a `width`-wide grid
pub fn convolve_rows(grid: &mut [f64], width: usize, kernel: &[f64]) {
    if width == 0 {
        return;
    }
    grid.par_chunks_mut(width).for_each(|row| {
        let source = row.to_vec();
        for (x, out) in row.iter_mut().enumerate() {
            *out = tap(&source, x, kernel);
        }
    });
}

/// Convolve every column of a `width`-wide grid
pub fn convolve_columns(grid: &mut [f64], width: usize, kernel: &[f64]) {
    if width == 0 {
        return;
    }
    let height = grid.len() / width;
    let source = grid.to_vec();
    grid.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let half = (kernel.len() / 2) as isize;
        for (x, out) in row.iter_mut().enumerate() {
            *out = kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| {
                    let yy = (y as isize + k as isize - half).clamp(0, height as isize - 1);
                    weight * source[yy as usize * width + x]
                })
                .sum();
        }
    });
}

fn tap(line: &[f64], at: usize, kernel: &[f64]) -> f64 {
    let half = (kernel.len() / 2) as isize;
    let last = line.len() as isize - 1;
    kernel
        .iter()
        .enumerate()
        .map(|(k, weight)| {
            let i = (at as isize + k as isize - half).clamp(0, last);
            weight * line[i as usize]
        })
        .sum()
}
