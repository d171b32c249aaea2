// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Circular statistics for quantifying realized anisotropy.
*/

use super::grid::minimal_displacement;
use crate::types::{ConnectivityError, ConnectivityResult, Coord};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Weighted circular mean of a set of angles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderParameter {
    /// Length of the mean resultant vector, in `[0, 1]`
    pub magnitude: f64,
    /// Direction of the mean resultant vector, in `(-π, π]`
    pub angle: f64,
}

/// First-order weighted circular mean, `R = Σ w·e^{iθ} / Σ w`.
///
/// `weights = None` weighs every angle equally.
pub fn estimate_order_parameter(
    angles: &[f64],
    weights: Option<&[f64]>,
) -> ConnectivityResult<OrderParameter> {
    estimate_order_parameter_of_order(angles, weights, 1)
}

/// Weighted circular mean of the `order`-th harmonic, `Σ w·e^{i·order·θ} / Σ w`.
pub fn estimate_order_parameter_of_order(
    angles: &[f64],
    weights: Option<&[f64]>,
    order: u32,
) -> ConnectivityResult<OrderParameter> {
    if let Some(w) = weights {
        if w.len() != angles.len() {
            return Err(ConnectivityError::ShapeMismatch {
                expected: format!("{} weights", angles.len()),
                actual: format!("{} weights", w.len()),
            });
        }
    }

    let k = order as f64;
    let (mut re, mut im, mut total) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (i, &theta) in angles.iter().enumerate() {
        let w = weights.map_or(1.0, |w| w[i]);
        re += w * (k * theta).cos();
        im += w * (k * theta).sin();
        total += w;
    }
    if angles.is_empty() || total == 0.0 {
        return Err(ConnectivityError::DegenerateWeights);
    }

    re /= total;
    im /= total;
    let mut angle = im.atan2(re);
    if angle <= -PI {
        angle += 2.0 * PI;
    }
    Ok(OrderParameter {
        magnitude: re.hypot(im).min(1.0),
        angle,
    })
}

/// Anisotropy of the outgoing connections of one source neuron.
///
/// Each target contributes the direction of its source-to-target vector,
/// weighted by the vector length.
pub fn efferent_anisotropy(
    source: Coord,
    targets: &[Coord],
    grid_size: usize,
) -> ConnectivityResult<OrderParameter> {
    let vectors: Vec<Coord> = targets
        .iter()
        .map(|&t| minimal_displacement(source, t, grid_size))
        .collect();
    vector_anisotropy(&vectors)
}

/// Anisotropy of the incoming connections of one target neuron.
///
/// Each source contributes the direction of its target-to-source vector,
/// weighted by the vector length.
pub fn afferent_anisotropy(
    target: Coord,
    sources: &[Coord],
    grid_size: usize,
) -> ConnectivityResult<OrderParameter> {
    let vectors: Vec<Coord> = sources
        .iter()
        .map(|&s| {
            let (dx, dy) = minimal_displacement(s, target, grid_size);
            (-dx, -dy)
        })
        .collect();
    vector_anisotropy(&vectors)
}

fn vector_anisotropy(vectors: &[Coord]) -> ConnectivityResult<OrderParameter> {
    let angles: Vec<f64> = vectors
        .iter()
        .map(|&(dx, dy)| (dy as f64).atan2(dx as f64))
        .collect();
    let lengths: Vec<f64> = vectors
        .iter()
        .map(|&(dx, dy)| (dx as f64).hypot(dy as f64))
        .collect();
    estimate_order_parameter(&angles, Some(&lengths))
}
