// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Anisotropy configuration and landscape resolution.

An [`AnisotropyConfig`] declares which aspects of a pathway are biased
(connectivity, synaptic parameters, or both) and carries the parameter pool
the biasing methods draw from.
*/

use crate::landscape::{generate, Landscape, LandscapeMethod};
use crate::types::{ConnectivityError, ConnectivityResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::{PI, TAU};
use std::str::FromStr;

/// Landscapes used by a pathway, keyed by parameter name (`phi`, `r`).
pub type Landscapes = BTreeMap<String, Landscape>;

/// Key of the angular landscape
pub const PHI: &str = "phi";
/// Key of the radial landscape
pub const RADIUS: &str = "r";

/// How connection geometry is biased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityMethod {
    /// Every connection of a source follows the source's `phi`; lengths come from
    /// the radial profile, optionally pulled toward the source's `r`
    Landscape,
}

/// How per-synapse parameters are derived from geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynapticMethod {
    /// Linear remap of `cos(θ_conn − φ_source)` onto `[vmin, vmax]`
    Cos,
}

impl FromStr for ConnectivityMethod {
    type Err = ConnectivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "landscape" => Ok(ConnectivityMethod::Landscape),
            other => Err(ConnectivityError::UnsupportedMethod {
                kind: "connectivity anisotropy",
                name: other.to_string(),
            }),
        }
    }
}

impl FromStr for SynapticMethod {
    type Err = ConnectivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cos" => Ok(SynapticMethod::Cos),
            other => Err(ConnectivityError::UnsupportedMethod {
                kind: "synaptic anisotropy",
                name: other.to_string(),
            }),
        }
    }
}

/// Angular bias: one direction for the whole grid, or a generated field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AngularBias {
    Fixed(f64),
    Generated(LandscapeMethod),
}

/// Preferred connection length: one value for the whole grid, or a generated field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RadialBias {
    Fixed(f64),
    Generated(LandscapeMethod),
}

/// Parameter pool shared by the connectivity and synaptic methods.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnisotropyParams {
    #[serde(default)]
    pub phi: Option<AngularBias>,
    #[serde(default)]
    pub r: Option<RadialBias>,
}

/// Anisotropy declaration of one pathway.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnisotropyConfig {
    #[serde(default)]
    pub connectivity: Option<ConnectivityMethod>,
    #[serde(default)]
    pub synaptic: Option<SynapticMethod>,
    #[serde(default)]
    pub params: AnisotropyParams,
    /// Synaptic parameter name → `(vmin, vmax)` output range
    #[serde(default)]
    pub vars: BTreeMap<String, (f64, f64)>,
}

impl AnisotropyConfig {
    /// Connectivity anisotropy steered by `phi`.
    pub fn connectivity(phi: AngularBias) -> Self {
        Self {
            connectivity: Some(ConnectivityMethod::Landscape),
            params: AnisotropyParams {
                phi: Some(phi),
                r: None,
            },
            ..Default::default()
        }
    }

    /// Synaptic anisotropy (cosine method) steered by `phi`.
    pub fn synaptic(phi: AngularBias) -> Self {
        Self {
            synaptic: Some(SynapticMethod::Cos),
            params: AnisotropyParams {
                phi: Some(phi),
                r: None,
            },
            ..Default::default()
        }
    }

    pub fn with_radius(mut self, r: RadialBias) -> Self {
        self.params.r = Some(r);
        self
    }

    pub fn with_synaptic_var(mut self, name: impl Into<String>, vmin: f64, vmax: f64) -> Self {
        self.synaptic.get_or_insert(SynapticMethod::Cos);
        self.vars.insert(name.into(), (vmin, vmax));
        self
    }

    pub fn biases_connectivity(&self) -> bool {
        self.connectivity.is_some()
    }

    pub fn biases_synapses(&self) -> bool {
        self.synaptic.is_some()
    }

    /// Check that every parameter the requested methods need is present.
    pub fn validate(&self) -> ConnectivityResult<()> {
        if !self.biases_connectivity() && !self.biases_synapses() {
            return Ok(());
        }
        let phi = self
            .params
            .phi
            .as_ref()
            .ok_or_else(|| ConnectivityError::MissingParameter("anisotropy.params.phi".to_string()))?;
        if let AngularBias::Fixed(angle) = phi {
            if !angle.is_finite() {
                return Err(ConnectivityError::invalid("anisotropy.params.phi", "angle must be finite"));
            }
        }
        if let Some(RadialBias::Fixed(r)) = self.params.r {
            if !r.is_finite() || r < 0.0 {
                return Err(ConnectivityError::invalid(
                    "anisotropy.params.r",
                    format!("must be non-negative, got {}", r),
                ));
            }
        }
        if self.biases_synapses() {
            if self.vars.is_empty() {
                return Err(ConnectivityError::MissingParameter("anisotropy.vars".to_string()));
            }
            for (name, &(vmin, vmax)) in &self.vars {
                if !vmin.is_finite() || !vmax.is_finite() || vmin > vmax {
                    return Err(ConnectivityError::invalid(
                        format!("anisotropy.vars.{}", name),
                        format!("invalid range ({}, {})", vmin, vmax),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Generate (or broadcast) the angular landscape over a grid.
    pub fn resolve_phi<R: Rng + ?Sized>(
        &self,
        grid_size: usize,
        rng: &mut R,
    ) -> ConnectivityResult<Landscape> {
        match &self.params.phi {
            None => Err(ConnectivityError::MissingParameter("anisotropy.params.phi".to_string())),
            Some(AngularBias::Fixed(angle)) => {
                generate(grid_size, *angle, *angle, &LandscapeMethod::Homogeneous, rng)
            }
            Some(AngularBias::Generated(method)) => match method {
                LandscapeMethod::Perlin { .. } => generate(grid_size, -PI, PI, method, rng),
                // A random angular field must carry no net direction
                LandscapeMethod::Random | LandscapeMethod::Symmetric => {
                    generate(grid_size, 0.0, TAU, &LandscapeMethod::Symmetric, rng)
                }
                LandscapeMethod::Homogeneous => Err(ConnectivityError::invalid(
                    "anisotropy.params.phi",
                    "a homogeneous angular field is given as a fixed angle",
                )),
            },
        }
    }

    /// Generate (or broadcast) the radial landscape, if configured.
    pub fn resolve_radius<R: Rng + ?Sized>(
        &self,
        grid_size: usize,
        rng: &mut R,
    ) -> ConnectivityResult<Option<Landscape>> {
        let Some(bias) = &self.params.r else {
            return Ok(None);
        };
        let landscape = match bias {
            RadialBias::Fixed(r) => generate(grid_size, *r, *r, &LandscapeMethod::Homogeneous, rng)?,
            RadialBias::Generated(method) => match method {
                LandscapeMethod::Perlin { .. } | LandscapeMethod::Random => {
                    generate(grid_size, 0.0, 1.0, method, rng)?
                }
                LandscapeMethod::Homogeneous | LandscapeMethod::Symmetric => {
                    return Err(ConnectivityError::invalid(
                        "anisotropy.params.r",
                        format!("{} is not a radial landscape method", method.name()),
                    ))
                }
            },
        };
        Ok(Some(landscape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_missing_phi_rejected() {
        let config = AnisotropyConfig {
            connectivity: Some(ConnectivityMethod::Landscape),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConnectivityError::MissingParameter(_))
        ));
        // Nothing requested, nothing required
        assert!(AnisotropyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_synaptic_requires_vars() {
        let config = AnisotropyConfig::synaptic(AngularBias::Fixed(0.0));
        assert!(matches!(
            config.validate(),
            Err(ConnectivityError::MissingParameter(_))
        ));
        let config = config.with_synaptic_var("U", 0.1, 0.4);
        assert!(config.validate().is_ok());
        let bad = AnisotropyConfig::synaptic(AngularBias::Fixed(0.0)).with_synaptic_var("U", 0.4, 0.1);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_method_names() {
        assert_eq!("cos".parse::<SynapticMethod>().unwrap(), SynapticMethod::Cos);
        assert!(matches!(
            "sin".parse::<SynapticMethod>(),
            Err(ConnectivityError::UnsupportedMethod { .. })
        ));
        assert!("landscape".parse::<ConnectivityMethod>().is_ok());
        assert!("shift".parse::<ConnectivityMethod>().is_err());
    }

    #[test]
    fn test_resolve_phi_variants() {
        let mut rng = StdRng::seed_from_u64(5);
        let fixed = AnisotropyConfig::connectivity(AngularBias::Fixed(0.25));
        let field = fixed.resolve_phi(6, &mut rng).unwrap();
        assert!(field.values().iter().all(|&v| v == 0.25));

        let perlin = AnisotropyConfig::connectivity(AngularBias::Generated(LandscapeMethod::Perlin {
            scale: 2,
            seamless: true,
        }));
        let field = perlin.resolve_phi(12, &mut rng).unwrap();
        assert!(field.min() >= -PI && field.max() <= PI);

        let random = AnisotropyConfig::connectivity(AngularBias::Generated(LandscapeMethod::Random));
        let field = random.resolve_phi(12, &mut rng).unwrap();
        assert!(field.min() >= 0.0 && field.max() < TAU);
    }

    #[test]
    fn test_resolve_radius() {
        let mut rng = StdRng::seed_from_u64(6);
        let config = AnisotropyConfig::connectivity(AngularBias::Fixed(0.0));
        assert!(config.resolve_radius(4, &mut rng).unwrap().is_none());

        let config = config.with_radius(RadialBias::Generated(LandscapeMethod::Random));
        let field = config.resolve_radius(4, &mut rng).unwrap().unwrap();
        assert!(field.min() >= 0.0 && field.max() <= 1.0);

        let config = AnisotropyConfig::connectivity(AngularBias::Fixed(0.0))
            .with_radius(RadialBias::Generated(LandscapeMethod::Symmetric));
        assert!(config.resolve_radius(4, &mut rng).is_err());
    }

    #[test]
    fn test_untagged_bias_deserialization() {
        let params: AnisotropyParams =
            serde_json::from_str(r#"{"phi": {"type": "perlin", "scale": 3}, "r": 1}"#).unwrap();
        assert_eq!(
            params.phi,
            Some(AngularBias::Generated(LandscapeMethod::Perlin {
                scale: 3,
                seamless: true
            }))
        );
        assert_eq!(params.r, Some(RadialBias::Fixed(1.0)));

        let config: AnisotropyConfig = serde_json::from_str(
            r#"{"synaptic": "cos", "params": {"phi": 0.5}, "vars": {"U": [0.1, 0.4]}}"#,
        )
        .unwrap();
        assert_eq!(config.vars["U"], (0.1, 0.4));
        assert!(serde_json::from_str::<AnisotropyConfig>(r#"{"synaptic": "sin"}"#).is_err());
    }
}
