// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Isotropic sampler: every source draws `ncons` displacements with a radius
from the radial profile and a uniform direction.
*/

use super::matrix::{ConnectionAccumulator, ConnectivityMatrix};
use super::pathway::{check_yield, draw_respecting_gap, rounded_displacement, PathwaySpec};
use crate::spatial::{coordinate_of, index_of, map_to_grid};
use crate::types::ConnectivityResult;
use rand::distributions::Distribution;
use rand::Rng;
use std::f64::consts::TAU;
use tracing::debug;

/// Sample an isotropic connectivity matrix for `spec`.
///
/// Without a radial profile the targets are uniform over the target grid.
pub fn build_isotropic<R: Rng + ?Sized>(
    spec: &PathwaySpec,
    rng: &mut R,
) -> ConnectivityResult<ConnectivityMatrix> {
    let (n_sources, n_targets) = (spec.n_sources(), spec.n_targets());
    let mut acc = ConnectionAccumulator::new(n_sources, n_targets);

    match &spec.profile {
        None => {
            for source in 0..n_sources {
                for _ in 0..spec.ncons {
                    acc.push(source, rng.gen_range(0..n_targets));
                }
            }
        }
        Some(profile) => {
            let sampler = profile.sampler()?;
            for source in 0..n_sources {
                let (x, y) = map_to_grid(
                    coordinate_of(source, spec.source_grid),
                    spec.source_grid,
                    spec.target_grid,
                );
                for _ in 0..spec.ncons {
                    let drawn = draw_respecting_gap(Some(profile), rng, |rng| {
                        let radius = sampler.sample(rng);
                        let angle = rng.gen_range(0.0..TAU);
                        rounded_displacement(radius, angle)
                    });
                    if let Some((dx, dy)) = drawn {
                        acc.push(source, index_of((x + dx, y + dy), spec.target_grid));
                    }
                }
            }
        }
    }

    debug!(target: "anisonet-connectivity",
        "[ISOTROPIC] {}: {} draws accepted out of {}",
        spec.name, acc.len(), spec.requested());

    let matrix = acc.finish(spec.clears_diagonal());
    check_yield(spec, &matrix)?;
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{GapPolicy, RadialProfile};
    use crate::types::ConnectivityError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_without_profile() {
        let spec = PathwaySpec::between("EI", 6, 8, 4);
        let m = build_isotropic(&spec, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(m.shape(), (36, 64));
        assert_eq!(m.total_weight(), 36 * 4);
    }

    #[test]
    fn test_local_profile_stays_near_source() {
        let spec = PathwaySpec::recurrent("EE", 20, 10)
            .with_profile(RadialProfile::gaussian(1.0).with_gap(1.0).with_gap_policy(GapPolicy::Resample));
        let m = build_isotropic(&spec, &mut StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(m.trace(), 0);
        assert_eq!(m.total_weight(), spec.requested());
        for (s, t, _) in m.iter() {
            let d = crate::spatial::minimal_displacement(
                coordinate_of(s, 20),
                coordinate_of(t, 20),
                20,
            );
            assert!(d.0.abs() <= 7 && d.1.abs() <= 7, "{:?}", d);
        }
    }

    #[test]
    fn test_unreachable_gap_fails_yield() {
        // Nearly every draw rounds below the gap and is discarded
        let spec = PathwaySpec::recurrent("II", 10, 5)
            .with_profile(RadialProfile::gaussian(0.1).with_gap(3.0));
        let err = build_isotropic(&spec, &mut StdRng::seed_from_u64(3)).unwrap_err();
        assert!(matches!(err, ConnectivityError::InsufficientYield { .. }));
    }
}
