// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Radial connection profiles.

A profile is the distribution of connection lengths (in grid units) drawn for
every outgoing connection of a source neuron, plus an optional minimum
admissible distance (`gap`).
*/

use crate::types::{ConnectivityError, ConnectivityResult};
use rand::Rng;
use rand_distr::{Distribution, Gamma, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Distribution family of connection lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RadialProfileKind {
    /// Gamma distribution with shape `kappa` and scale `theta`
    Gamma { kappa: f64, theta: f64 },
    /// Zero-mean normal with standard deviation `std`; radii are its absolute values
    Gaussian { std: f64 },
}

/// What to do with a draw that lands closer than `gap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPolicy {
    /// Drop the draw; the yield check polices the loss
    #[default]
    Discard,
    /// Redraw until the gap is respected (bounded number of attempts)
    Resample,
}

/// Maximum redraws per connection under [`GapPolicy::Resample`]
pub const MAX_GAP_RESAMPLES: usize = 1000;

/// Radial profile of a pathway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialProfile {
    #[serde(flatten)]
    pub kind: RadialProfileKind,
    #[serde(default)]
    pub gap: Option<f64>,
    #[serde(default)]
    pub gap_policy: GapPolicy,
}

impl RadialProfile {
    pub fn gamma(kappa: f64, theta: f64) -> Self {
        Self {
            kind: RadialProfileKind::Gamma { kappa, theta },
            gap: None,
            gap_policy: GapPolicy::Discard,
        }
    }

    pub fn gaussian(std: f64) -> Self {
        Self {
            kind: RadialProfileKind::Gaussian { std },
            gap: None,
            gap_policy: GapPolicy::Discard,
        }
    }

    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = Some(gap);
        self
    }

    pub fn with_gap_policy(mut self, policy: GapPolicy) -> Self {
        self.gap_policy = policy;
        self
    }

    /// Check that the distribution is sampleable and the gap is admissible.
    pub fn validate(&self) -> ConnectivityResult<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConnectivityError::invalid(name, format!("must be positive and finite, got {}", v)))
            }
        };
        match self.kind {
            RadialProfileKind::Gamma { kappa, theta } => {
                positive("profile.kappa", kappa)?;
                positive("profile.theta", theta)?;
            }
            RadialProfileKind::Gaussian { std } => positive("profile.std", std)?,
        }
        if let Some(gap) = self.gap {
            if !gap.is_finite() || gap < 0.0 {
                return Err(ConnectivityError::invalid(
                    "profile.gap",
                    format!("must be non-negative, got {}", gap),
                ));
            }
        }
        Ok(())
    }

    /// Build a sampler for this profile.
    pub fn sampler(&self) -> ConnectivityResult<RadialSampler> {
        self.validate()?;
        let to_err = |e: rand_distr::GammaError| ConnectivityError::invalid("profile", e.to_string());
        match self.kind {
            RadialProfileKind::Gamma { kappa, theta } => {
                Ok(RadialSampler::Gamma(Gamma::new(kappa, theta).map_err(to_err)?))
            }
            RadialProfileKind::Gaussian { std } => Normal::new(0.0, std)
                .map(RadialSampler::HalfNormal)
                .map_err(|e| ConnectivityError::invalid("profile", e.to_string())),
        }
    }

    /// Probability density of connection length `r`. Zero for negative `r`.
    pub fn density(&self, r: f64) -> f64 {
        if r < 0.0 {
            return 0.0;
        }
        match self.kind {
            RadialProfileKind::Gamma { kappa, theta } => {
                if r == 0.0 {
                    return if kappa < 1.0 {
                        f64::INFINITY
                    } else if kappa == 1.0 {
                        1.0 / theta
                    } else {
                        0.0
                    };
                }
                ((kappa - 1.0) * r.ln() - r / theta - ln_gamma(kappa) - kappa * theta.ln()).exp()
            }
            RadialProfileKind::Gaussian { std } => {
                2.0 / (std * (2.0 * PI).sqrt()) * (-(r * r) / (2.0 * std * std)).exp()
            }
        }
    }

    /// Minimum admissible rounded displacement length (0 when unset).
    pub fn min_distance(&self) -> f64 {
        self.gap.unwrap_or(0.0)
    }
}

/// Validated, ready-to-draw radial distribution.
#[derive(Debug, Clone)]
pub enum RadialSampler {
    Gamma(Gamma<f64>),
    HalfNormal(Normal<f64>),
}

impl Distribution<f64> for RadialSampler {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            RadialSampler::Gamma(d) => d.sample(rng),
            RadialSampler::HalfNormal(d) => d.sample(rng).abs(),
        }
    }
}

/// Natural log of the gamma function (Lanczos approximation, g = 7).
fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];
    if x < 0.5 {
        // Reflection formula
        return (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut a = COEFFS[0];
    let t = x + 7.5;
    for (i, &c) in COEFFS.iter().enumerate().skip(1) {
        a += c / (x + i as f64);
    }
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + a.ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ln_gamma_known_values() {
        assert!((ln_gamma(1.0)).abs() < 1e-10);
        assert!((ln_gamma(4.0) - 6.0_f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(0.5) - PI.sqrt().ln()).abs() < 1e-10);
    }

    #[test]
    fn test_gamma_density_integrates_to_one() {
        let profile = RadialProfile::gamma(4.0, 1.0);
        let dr = 1e-3;
        let total: f64 = (0..40_000).map(|i| profile.density((i as f64 + 0.5) * dr) * dr).sum();
        assert!((total - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_half_normal_density() {
        let profile = RadialProfile::gaussian(2.0);
        assert!((profile.density(0.0) - 2.0 / (2.0 * (2.0 * PI).sqrt())).abs() < 1e-12);
        assert_eq!(profile.density(-1.0), 0.0);
    }

    #[test]
    fn test_gaussian_samples_are_non_negative() {
        let sampler = RadialProfile::gaussian(3.0).sampler().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..1000).all(|_| sampler.sample(&mut rng) >= 0.0));
    }

    #[test]
    fn test_gamma_sample_mean() {
        let sampler = RadialProfile::gamma(4.0, 0.75).sampler().unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let n = 20_000;
        let mean: f64 = (0..n).map(|_| sampler.sample(&mut rng)).sum::<f64>() / n as f64;
        assert!((mean - 3.0).abs() < 0.1);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(RadialProfile::gamma(0.0, 1.0).validate().is_err());
        assert!(RadialProfile::gaussian(-1.0).sampler().is_err());
        assert!(RadialProfile::gaussian(1.0).with_gap(-2.0).validate().is_err());
        assert!(RadialProfile::gaussian(1.0).with_gap(2.0).validate().is_ok());
    }

    #[test]
    fn test_profile_deserializes_flattened() {
        let profile: RadialProfile =
            serde_json::from_str(r#"{"type": "gamma", "kappa": 4, "theta": 1.0, "gap": 2}"#).unwrap();
        assert_eq!(profile, RadialProfile::gamma(4.0, 1.0).with_gap(2.0));

        let profile: RadialProfile =
            serde_json::from_str(r#"{"type": "gaussian", "std": 2.0, "gap_policy": "resample"}"#).unwrap();
        assert_eq!(profile.gap_policy, GapPolicy::Resample);
    }
}
