// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Per-synapse parameters derived from connection geometry.

Values are emitted once per synaptic instance, in the order of
[`ConnectivityMatrix::synapses`]: row-major `(source, target)`, then by
instance within a multi-edge.
*/

use super::anisotropy::SynapticMethod;
use super::matrix::ConnectivityMatrix;
use super::pathway::PathwaySpec;
use crate::landscape::Landscape;
use crate::spatial::{coordinate_of, map_to_grid, minimal_displacement};
use crate::types::{ConnectivityError, ConnectivityResult};
use rand::Rng;
use std::collections::BTreeMap;
use tracing::debug;

/// Variable name → one value per synaptic instance
pub type SynapticValues = BTreeMap<String, Vec<f64>>;

#[derive(Debug, Clone)]
pub struct SynapticParameters {
    /// Angular field the values were derived against
    pub phi: Landscape,
    pub values: SynapticValues,
}

/// Linear remap of a cosine in `[-1, 1]` onto `[vmin, vmax]`.
#[inline]
pub fn remap_cosine(cos_val: f64, vmin: f64, vmax: f64) -> f64 {
    vmin + (vmax - vmin) * (cos_val + 1.0) / 2.0
}

/// Cosine between each synapse's direction and its source's local bias.
pub fn alignment(
    matrix: &ConnectivityMatrix,
    source_grid: usize,
    target_grid: usize,
    phi: &Landscape,
) -> Vec<f64> {
    matrix
        .synapses()
        .map(|(source, target)| {
            let from = map_to_grid(coordinate_of(source, source_grid), source_grid, target_grid);
            let (dx, dy) = minimal_displacement(from, coordinate_of(target, target_grid), target_grid);
            let theta = (dy as f64).atan2(dx as f64);
            (theta - phi.at_index(source)).cos()
        })
        .collect()
}

/// Derive every variable in the pathway's `anisotropy.vars`.
///
/// `phi` is reused when the connectivity sampler already resolved one;
/// otherwise it is resolved here over the source grid.
pub fn derive_synaptic_parameters<R: Rng + ?Sized>(
    matrix: &ConnectivityMatrix,
    spec: &PathwaySpec,
    phi: Option<&Landscape>,
    rng: &mut R,
) -> ConnectivityResult<SynapticParameters> {
    let anisotropy = spec.anisotropy.as_ref().ok_or_else(|| {
        ConnectivityError::MissingParameter(format!("{}.anisotropy", spec.name))
    })?;
    match anisotropy.synaptic {
        Some(SynapticMethod::Cos) => {}
        None => {
            return Err(ConnectivityError::MissingParameter(format!(
                "{}.anisotropy.synaptic",
                spec.name
            )))
        }
    }
    anisotropy.validate()?;

    if matrix.shape() != (spec.n_sources(), spec.n_targets()) {
        return Err(ConnectivityError::ShapeMismatch {
            expected: format!("{}x{}", spec.n_sources(), spec.n_targets()),
            actual: format!("{}x{}", matrix.n_sources(), matrix.n_targets()),
        });
    }

    let phi = match phi {
        Some(phi) if phi.grid_size() == spec.source_grid => phi.clone(),
        Some(phi) => {
            return Err(ConnectivityError::ShapeMismatch {
                expected: format!("{0}x{0} phi", spec.source_grid),
                actual: format!("{0}x{0}", phi.grid_size()),
            })
        }
        None => anisotropy.resolve_phi(spec.source_grid, rng)?,
    };

    let cosines = alignment(matrix, spec.source_grid, spec.target_grid, &phi);
    let values: SynapticValues = anisotropy
        .vars
        .iter()
        .map(|(name, &(vmin, vmax))| {
            let derived = cosines.iter().map(|&c| remap_cosine(c, vmin, vmax)).collect();
            (name.clone(), derived)
        })
        .collect();

    debug!(target: "anisonet-connectivity",
        "[SYNAPTIC] {}: derived {:?} for {} synapses",
        spec.name, values.keys().collect::<Vec<_>>(), cosines.len());

    Ok(SynapticParameters { phi, values })
}
