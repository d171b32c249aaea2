// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Pathway specification, construction entry point and the yield policy.
*/

use super::anisotropic::build_anisotropic;
use super::anisotropy::{AnisotropyConfig, Landscapes};
use super::isotropic::build_isotropic;
use super::matrix::ConnectivityMatrix;
use super::synaptic::{derive_synaptic_parameters, SynapticValues};
use crate::profile::{GapPolicy, RadialProfile, MAX_GAP_RESAMPLES};
use crate::types::{ConnectivityError, ConnectivityResult, Coord};
use rand::Rng;
use tracing::{info, warn};

/// Minimum fraction of requested connections a pathway must realize
pub const MIN_YIELD: f64 = 0.9;

/// Everything needed to build one directed pathway.
#[derive(Debug, Clone, PartialEq)]
pub struct PathwaySpec {
    pub name: String,
    pub source_grid: usize,
    pub target_grid: usize,
    /// Outgoing connections requested per source neuron
    pub ncons: usize,
    /// `None` means no spatial structure
    pub profile: Option<RadialProfile>,
    /// Source and target are the same population
    pub recurrent: bool,
    pub self_link: bool,
    pub anisotropy: Option<AnisotropyConfig>,
}

impl PathwaySpec {
    /// Pathway from a population onto itself.
    pub fn recurrent(name: impl Into<String>, grid_size: usize, ncons: usize) -> Self {
        Self {
            name: name.into(),
            source_grid: grid_size,
            target_grid: grid_size,
            ncons,
            profile: None,
            recurrent: true,
            self_link: false,
            anisotropy: None,
        }
    }

    /// Pathway between two distinct populations.
    pub fn between(
        name: impl Into<String>,
        source_grid: usize,
        target_grid: usize,
        ncons: usize,
    ) -> Self {
        Self {
            name: name.into(),
            source_grid,
            target_grid,
            ncons,
            profile: None,
            recurrent: false,
            self_link: false,
            anisotropy: None,
        }
    }

    pub fn with_profile(mut self, profile: RadialProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn with_self_link(mut self, self_link: bool) -> Self {
        self.self_link = self_link;
        self
    }

    pub fn with_anisotropy(mut self, anisotropy: AnisotropyConfig) -> Self {
        self.anisotropy = Some(anisotropy);
        self
    }

    pub fn n_sources(&self) -> usize {
        self.source_grid * self.source_grid
    }

    pub fn n_targets(&self) -> usize {
        self.target_grid * self.target_grid
    }

    /// Requested number of connections, `ncons * n_sources`.
    pub fn requested(&self) -> u64 {
        (self.ncons as u64) * (self.n_sources() as u64)
    }

    /// Smallest realized count that passes the yield check.
    pub fn required(&self) -> u64 {
        (self.requested() * 9).div_ceil(10)
    }

    /// Whether `(i, i)` entries are removed. Only square matrices have a diagonal.
    pub fn clears_diagonal(&self) -> bool {
        self.source_grid == self.target_grid && !(self.recurrent && self.self_link)
    }

    /// Fail fast on anything that would make sampling meaningless.
    pub fn validate(&self) -> ConnectivityResult<()> {
        if self.source_grid == 0 || self.target_grid == 0 {
            return Err(ConnectivityError::invalid(
                format!("{}.grid_size", self.name),
                "must be positive",
            ));
        }
        if self.ncons == 0 {
            return Err(ConnectivityError::invalid(
                format!("{}.ncons", self.name),
                "must be positive",
            ));
        }
        if self.recurrent && self.source_grid != self.target_grid {
            return Err(ConnectivityError::invalid(
                format!("{}.recurrent", self.name),
                format!(
                    "recurrent pathway needs one grid, got {} and {}",
                    self.source_grid, self.target_grid
                ),
            ));
        }
        if let Some(profile) = &self.profile {
            profile.validate()?;
        }
        if let Some(anisotropy) = &self.anisotropy {
            anisotropy.validate()?;
        }
        Ok(())
    }
}

/// Built pathway: matrix, landscapes used, and per-synapse parameters.
#[derive(Debug, Clone)]
pub struct PathwayConnectivity {
    pub name: String,
    pub matrix: ConnectivityMatrix,
    /// Landscapes actually used, keyed `phi` / `r`
    pub landscapes: Landscapes,
    /// One value per synaptic instance, in [`ConnectivityMatrix::synapses`] order
    pub synaptic: SynapticValues,
}

impl PathwayConnectivity {
    /// Realized fraction of the requested connections.
    pub fn yield_fraction(&self, spec: &PathwaySpec) -> f64 {
        self.matrix.total_weight() as f64 / spec.requested() as f64
    }
}

/// Build a pathway, choosing the isotropic or anisotropic sampler from its
/// anisotropy declaration and deriving synaptic parameters when requested.
pub fn build_pathway<R: Rng + ?Sized>(
    spec: &PathwaySpec,
    rng: &mut R,
) -> ConnectivityResult<PathwayConnectivity> {
    spec.validate()?;

    let biases_connectivity = spec
        .anisotropy
        .as_ref()
        .is_some_and(AnisotropyConfig::biases_connectivity);
    let (matrix, mut landscapes) = if biases_connectivity {
        build_anisotropic(spec, rng)?
    } else {
        (build_isotropic(spec, rng)?, Landscapes::new())
    };

    let mut synaptic = SynapticValues::new();
    if spec
        .anisotropy
        .as_ref()
        .is_some_and(AnisotropyConfig::biases_synapses)
    {
        let derived = derive_synaptic_parameters(&matrix, spec, landscapes.get(super::anisotropy::PHI), rng)?;
        landscapes
            .entry(super::anisotropy::PHI.to_string())
            .or_insert(derived.phi);
        synaptic = derived.values;
    }

    info!(target: "anisonet-connectivity",
        "Built pathway {} ({}x{}): {} connections in {} cells, yield {:.1}%",
        spec.name,
        matrix.n_sources(),
        matrix.n_targets(),
        matrix.total_weight(),
        matrix.nnz(),
        100.0 * matrix.total_weight() as f64 / spec.requested() as f64
    );

    Ok(PathwayConnectivity {
        name: spec.name.clone(),
        matrix,
        landscapes,
        synaptic,
    })
}

/// Reject a matrix that realized fewer than [`MIN_YIELD`] of the requested connections.
pub(crate) fn check_yield(spec: &PathwaySpec, matrix: &ConnectivityMatrix) -> ConnectivityResult<()> {
    let realized = matrix.total_weight();
    let required = spec.required();
    if realized < required {
        warn!(target: "anisonet-connectivity",
            "Pathway {} realized {} of {} requested connections (need {})",
            spec.name, realized, spec.requested(), required);
        return Err(ConnectivityError::InsufficientYield {
            pathway: spec.name.clone(),
            realized,
            required,
            requested: spec.requested(),
        });
    }
    Ok(())
}

/// Polar draw rounded onto the integer lattice.
#[inline]
pub(crate) fn rounded_displacement(radius: f64, angle: f64) -> Coord {
    (
        (radius * angle.cos()).round_ties_even() as i64,
        (radius * angle.sin()).round_ties_even() as i64,
    )
}

#[inline]
pub(crate) fn respects_gap(displacement: Coord, gap: f64) -> bool {
    let (dx, dy) = displacement;
    ((dx * dx + dy * dy) as f64).sqrt() >= gap
}

/// Draw one displacement, honoring the profile's gap policy.
///
/// Returns `None` when the draw is discarded.
pub(crate) fn draw_respecting_gap<R, F>(
    profile: Option<&RadialProfile>,
    rng: &mut R,
    mut draw: F,
) -> Option<Coord>
where
    R: Rng + ?Sized,
    F: FnMut(&mut R) -> Coord,
{
    let Some(profile) = profile else {
        return Some(draw(rng));
    };
    let gap = profile.min_distance();
    match profile.gap_policy {
        GapPolicy::Discard => Some(draw(rng)).filter(|&d| respects_gap(d, gap)),
        GapPolicy::Resample => (0..MAX_GAP_RESAMPLES)
            .map(|_| draw(rng))
            .find(|&d| respects_gap(d, gap)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_required_rounds_up() {
        let spec = PathwaySpec::recurrent("II", 10, 5);
        assert_eq!(spec.requested(), 500);
        assert_eq!(spec.required(), 450);
        let spec = PathwaySpec::recurrent("II", 3, 1);
        assert_eq!(spec.required(), 9); // ceil(8.1)
    }

    #[test]
    fn test_diagonal_policy() {
        assert!(PathwaySpec::recurrent("II", 10, 5).clears_diagonal());
        assert!(!PathwaySpec::recurrent("II", 10, 5).with_self_link(true).clears_diagonal());
        assert!(PathwaySpec::between("EI", 10, 10, 5).with_self_link(true).clears_diagonal());
        assert!(!PathwaySpec::between("EI", 10, 20, 5).clears_diagonal());
    }

    #[test]
    fn test_validate() {
        assert!(PathwaySpec::recurrent("II", 0, 5).validate().is_err());
        assert!(PathwaySpec::recurrent("II", 10, 0).validate().is_err());
        let mut spec = PathwaySpec::between("EI", 10, 20, 5);
        spec.recurrent = true;
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_gap_helpers() {
        assert_eq!(rounded_displacement(2.0, 0.0), (2, 0));
        assert_eq!(rounded_displacement(1.4, std::f64::consts::FRAC_PI_4), (1, 1));
        assert!(!respects_gap((1, 1), 2.0));
        assert!(respects_gap((2, 0), 2.0));
    }

    #[test]
    fn test_gap_policies() {
        let mut rng = StdRng::seed_from_u64(0);
        let discard = RadialProfile::gamma(1.0, 1.0).with_gap(3.0);
        assert_eq!(draw_respecting_gap(Some(&discard), &mut rng, |_| (1, 0)), None);

        let resample = discard.clone().with_gap_policy(GapPolicy::Resample);
        let mut calls = 0;
        let drawn = draw_respecting_gap(Some(&resample), &mut rng, |_| {
            calls += 1;
            if calls < 4 {
                (1, 0)
            } else {
                (3, 0)
            }
        });
        assert_eq!(drawn, Some((3, 0)));
        assert_eq!(calls, 4);
    }
}
