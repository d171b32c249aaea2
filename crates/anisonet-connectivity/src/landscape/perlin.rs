// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Periodic 2D Perlin noise on the neuron grid.

A `(scale + 1) × (scale + 1)` lattice of random unit gradients is laid over the
grid. Fine-grid samples include both lattice endpoints, so with `seamless` the
first and last rows (and columns) of the field coincide.
*/

use crate::types::{ConnectivityError, ConnectivityResult};
use ndarray::Array2;
use rand::Rng;
use std::f64::consts::{SQRT_2, TAU};

/// Quintic smoothstep `6t⁵ − 15t⁴ + 10t³`.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Perlin noise in `[-1, 1]`, shape `(grid_size, grid_size)` indexed `[y, x]`.
pub(crate) fn perlin_noise<R: Rng + ?Sized>(
    grid_size: usize,
    scale: usize,
    seamless: bool,
    rng: &mut R,
) -> ConnectivityResult<Array2<f64>> {
    if scale == 0 {
        return Err(ConnectivityError::invalid("scale", "must be a positive integer"));
    }
    if grid_size % scale != 0 {
        return Err(ConnectivityError::IndivisibleGrid { grid_size, scale });
    }

    let mut gradients = Array2::<(f64, f64)>::from_shape_simple_fn((scale + 1, scale + 1), || {
        let angle = rng.gen_range(0.0..TAU);
        (angle.cos(), angle.sin())
    });
    if seamless {
        for k in 0..=scale {
            gradients[[scale, k]] = gradients[[0, k]];
        }
        for k in 0..=scale {
            gradients[[k, scale]] = gradients[[k, 0]];
        }
    }

    let step = if grid_size > 1 {
        scale as f64 / (grid_size - 1) as f64
    } else {
        0.0
    };
    // Lattice cell and fractional offset of every fine-grid line
    let lattice: Vec<(usize, f64)> = (0..grid_size)
        .map(|i| {
            let u = i as f64 * step;
            let cell = (u.floor() as usize).min(scale - 1);
            (cell, u - cell as f64)
        })
        .collect();

    let dot = |g: (f64, f64), dx: f64, dy: f64| g.0 * dx + g.1 * dy;

    let noise = Array2::from_shape_fn((grid_size, grid_size), |(row, col)| {
        let (iy, ty) = lattice[row];
        let (ix, tx) = lattice[col];

        let n00 = dot(gradients[[iy, ix]], tx, ty);
        let n10 = dot(gradients[[iy, ix + 1]], tx - 1.0, ty);
        let n01 = dot(gradients[[iy + 1, ix]], tx, ty - 1.0);
        let n11 = dot(gradients[[iy + 1, ix + 1]], tx - 1.0, ty - 1.0);

        let (fx, fy) = (fade(tx), fade(ty));
        let n0 = n00 * (1.0 - fx) + fx * n10;
        let n1 = n01 * (1.0 - fx) + fx * n11;
        (SQRT_2 * ((1.0 - fy) * n0 + fy * n1)).clamp(-1.0, 1.0)
    });

    Ok(noise)
}
