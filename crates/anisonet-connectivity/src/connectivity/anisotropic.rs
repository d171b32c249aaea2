// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Anisotropic sampler.

Every outgoing connection of a source points along the source's `phi` value;
only the radius varies. With a radial landscape `r`, each source draws
[`RADIAL_OVERSAMPLING`] times more radii than it needs and keeps the ones
closest to its local preferred radius.
*/

use super::anisotropy::{AnisotropyConfig, Landscapes, PHI, RADIUS};
use super::matrix::{ConnectionAccumulator, ConnectivityMatrix};
use super::pathway::{
    check_yield, draw_respecting_gap, respects_gap, rounded_displacement, PathwaySpec,
};
use crate::landscape::Landscape;
use crate::profile::{GapPolicy, RadialSampler};
use crate::spatial::{coordinate_of, index_of, map_to_grid};
use crate::types::{ConnectivityError, ConnectivityResult, Coord};
use rand::distributions::Distribution;
use rand::Rng;
use tracing::debug;

/// Candidates drawn per requested connection when a radial landscape is set
pub const RADIAL_OVERSAMPLING: usize = 100;

/// Where radii come from: the profile, or uniform up to half the target grid.
enum RadiusSource {
    Profile(RadialSampler),
    Uniform(f64),
}

impl Distribution<f64> for RadiusSource {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            RadiusSource::Profile(sampler) => sampler.sample(rng),
            RadiusSource::Uniform(max) => rng.gen_range(0.0..=*max),
        }
    }
}

/// Sample an anisotropic connectivity matrix and return it with the
/// landscapes it was built from.
pub fn build_anisotropic<R: Rng + ?Sized>(
    spec: &PathwaySpec,
    rng: &mut R,
) -> ConnectivityResult<(ConnectivityMatrix, Landscapes)> {
    let anisotropy: &AnisotropyConfig = spec.anisotropy.as_ref().ok_or_else(|| {
        ConnectivityError::MissingParameter(format!("{}.anisotropy", spec.name))
    })?;
    anisotropy.validate()?;

    let phi = anisotropy.resolve_phi(spec.source_grid, rng)?;
    let radius = anisotropy.resolve_radius(spec.source_grid, rng)?;

    let radii = match &spec.profile {
        Some(profile) => RadiusSource::Profile(profile.sampler()?),
        None => RadiusSource::Uniform(spec.target_grid as f64 / 2.0),
    };

    let (n_sources, n_targets) = (spec.n_sources(), spec.n_targets());
    let mut acc = ConnectionAccumulator::new(n_sources, n_targets);

    for source in 0..n_sources {
        let (x, y) = map_to_grid(
            coordinate_of(source, spec.source_grid),
            spec.source_grid,
            spec.target_grid,
        );
        let angle = phi.at_index(source);
        let mut connect = |(dx, dy): Coord| acc.push(source, index_of((x + dx, y + dy), spec.target_grid));

        match &radius {
            None => {
                for _ in 0..spec.ncons {
                    let drawn = draw_respecting_gap(spec.profile.as_ref(), rng, |rng| {
                        rounded_displacement(radii.sample(rng), angle)
                    });
                    if let Some(d) = drawn {
                        connect(d);
                    }
                }
            }
            Some(preferred) => {
                let gap = spec.profile.as_ref().map_or(0.0, |p| p.min_distance());
                let prefilter = spec
                    .profile
                    .as_ref()
                    .is_some_and(|p| p.gap_policy == GapPolicy::Resample);
                let target_radius = preferred.at_index(source);

                let mut candidates: Vec<f64> = (0..spec.ncons * RADIAL_OVERSAMPLING)
                    .map(|_| radii.sample(rng))
                    .collect();
                if prefilter {
                    candidates.retain(|&c| respects_gap(rounded_displacement(c, angle), gap));
                }

                nearest_radii(candidates, target_radius, spec.ncons)
                    .into_iter()
                    .map(|c| rounded_displacement(c, angle))
                    .filter(|&d| respects_gap(d, gap))
                    .for_each(&mut connect);
            }
        }
    }

    debug!(target: "anisonet-connectivity",
        "[ANISOTROPIC] {}: {} draws accepted out of {} (radial landscape: {})",
        spec.name, acc.len(), spec.requested(), radius.is_some());

    let matrix = acc.finish(spec.clears_diagonal());
    check_yield(spec, &matrix)?;

    let mut landscapes = Landscapes::new();
    landscapes.insert(PHI.to_string(), phi);
    if let Some(r) = radius {
        landscapes.insert(RADIUS.to_string(), r);
    }
    Ok((matrix, landscapes))
}

/// The `n` candidates closest to `preferred`. Equal distances keep draw order.
fn nearest_radii(mut candidates: Vec<f64>, preferred: f64, n: usize) -> Vec<f64> {
    candidates.sort_by(|a, b| (a - preferred).abs().total_cmp(&(b - preferred).abs()));
    candidates.truncate(n);
    candidates
}

/// Preferred radius of each source, if a radial landscape was used.
pub fn preferred_radius(landscapes: &Landscapes, source: usize) -> Option<f64> {
    landscapes.get(RADIUS).map(|r: &Landscape| r.at_index(source))
}
