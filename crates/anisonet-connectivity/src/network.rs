// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Network-level assembly: named populations on square grids and the pathways
between them.

Each pathway owns a generator seeded from the master seed and its name, so a
build is reproducible whether pathways run sequentially or in parallel.
*/

use crate::connectivity::{build_pathway, AnisotropyConfig, PathwayConnectivity, PathwaySpec};
use crate::profile::RadialProfile;
use crate::rng::{pathway_seed, seeded_rng};
use crate::types::{ConnectivityError, ConnectivityResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::info;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A population of `grid_size²` neurons on a torus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationSpec {
    pub grid_size: usize,
}

/// Declarative pathway entry of a [`NetworkSpec`].
///
/// `source` and `target` default to the two characters of the pathway name,
/// so `"EI"` connects population `E` to population `I`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub ncons: usize,
    #[serde(default)]
    pub self_link: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<RadialProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anisotropy: Option<AnisotropyConfig>,
}

impl PathwayConfig {
    pub fn new(ncons: usize) -> Self {
        Self {
            source: None,
            target: None,
            ncons,
            self_link: false,
            profile: None,
            anisotropy: None,
        }
    }

    pub fn with_profile(mut self, profile: RadialProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn with_anisotropy(mut self, anisotropy: AnisotropyConfig) -> Self {
        self.anisotropy = Some(anisotropy);
        self
    }

    pub fn with_endpoints(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self.target = Some(target.into());
        self
    }
}

/// Populations and pathways of a whole network.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NetworkSpec {
    #[serde(default)]
    pub populations: BTreeMap<String, PopulationSpec>,
    #[serde(default)]
    pub pathways: BTreeMap<String, PathwayConfig>,
}

impl NetworkSpec {
    /// Source and target population names of a pathway.
    pub fn endpoints(&self, name: &str) -> ConnectivityResult<(String, String)> {
        let config = self
            .pathways
            .get(name)
            .ok_or_else(|| ConnectivityError::MissingParameter(format!("pathways.{}", name)))?;
        let mut chars = name.chars();
        let (from_name, to_name) = match (chars.next(), chars.next(), chars.next()) {
            (Some(s), Some(t), None) => (Some(s.to_string()), Some(t.to_string())),
            _ => (None, None),
        };
        let source = config.source.clone().or(from_name);
        let target = config.target.clone().or(to_name);
        match (source, target) {
            (Some(s), Some(t)) => Ok((s, t)),
            _ => Err(ConnectivityError::MissingParameter(format!(
                "pathways.{}.source/target",
                name
            ))),
        }
    }

    fn population(&self, name: &str) -> ConnectivityResult<PopulationSpec> {
        self.populations
            .get(name)
            .copied()
            .ok_or_else(|| ConnectivityError::UnknownPopulation(name.to_string()))
    }

    /// Resolve one named pathway into a buildable [`PathwaySpec`].
    pub fn pathway_spec(&self, name: &str) -> ConnectivityResult<PathwaySpec> {
        let (source, target) = self.endpoints(name)?;
        let config = &self.pathways[name];
        let source_pop = self.population(&source)?;
        let target_pop = self.population(&target)?;

        let mut spec = if source == target {
            PathwaySpec::recurrent(name, source_pop.grid_size, config.ncons)
        } else {
            PathwaySpec::between(name, source_pop.grid_size, target_pop.grid_size, config.ncons)
        };
        spec.self_link = config.self_link;
        spec.profile = config.profile.clone();
        spec.anisotropy = config.anisotropy.clone();
        Ok(spec)
    }

    /// All pathway specs, in name order.
    pub fn pathway_specs(&self) -> ConnectivityResult<Vec<PathwaySpec>> {
        self.pathways.keys().map(|name| self.pathway_spec(name)).collect()
    }
}

/// A built network. Pathways are keyed by name.
#[derive(Debug, Clone)]
pub struct Network {
    pub seed: u64,
    pub specs: BTreeMap<String, PathwaySpec>,
    pub pathways: BTreeMap<String, PathwayConnectivity>,
}

impl Network {
    pub fn pathway(&self, name: &str) -> Option<&PathwayConnectivity> {
        self.pathways.get(name)
    }

    /// Total synaptic instances over all pathways.
    pub fn total_synapses(&self) -> u64 {
        self.pathways.values().map(|p| p.matrix.total_weight()).sum()
    }

    /// Mean efferent order-parameter magnitude over sources that have connections.
    pub fn mean_efferent_anisotropy(&self, name: &str) -> Option<f64> {
        let spec = self.specs.get(name)?;
        let matrix = &self.pathways.get(name)?.matrix;
        let magnitudes: Vec<f64> = (0..matrix.n_sources())
            .filter_map(|s| {
                matrix
                    .efferent_anisotropy(s, spec.source_grid, spec.target_grid)
                    .ok()
            })
            .map(|op| op.magnitude)
            .collect();
        if magnitudes.is_empty() {
            return None;
        }
        Some(magnitudes.iter().sum::<f64>() / magnitudes.len() as f64)
    }

    /// Per-pathway shape, weight, yield and anisotropy, for reports.
    pub fn summary(&self) -> serde_json::Value {
        let pathways: serde_json::Map<String, serde_json::Value> = self
            .pathways
            .iter()
            .filter_map(|(name, pathway)| {
                let spec = self.specs.get(name)?;
                let (rows, cols) = pathway.matrix.shape();
                Some((
                    name.clone(),
                    json!({
                        "shape": [rows, cols],
                        "nnz": pathway.matrix.nnz(),
                        "total_weight": pathway.matrix.total_weight(),
                        "requested": spec.requested(),
                        "yield": pathway.yield_fraction(spec),
                        "landscapes": pathway.landscapes.keys().collect::<Vec<_>>(),
                        "synaptic_vars": pathway.synaptic.keys().collect::<Vec<_>>(),
                        "mean_efferent_anisotropy": self.mean_efferent_anisotropy(name),
                    }),
                ))
            })
            .collect();
        json!({
            "seed": self.seed,
            "total_synapses": self.total_synapses(),
            "pathways": pathways,
        })
    }
}

fn build_one(spec: &PathwaySpec, seed: u64) -> ConnectivityResult<PathwayConnectivity> {
    let mut rng = seeded_rng(Some(pathway_seed(seed, &spec.name)));
    build_pathway(spec, &mut rng)
}

/// Build every pathway of `spec`. The first failing pathway aborts the build.
///
/// `parallel` is honored only when the `parallel` feature is compiled in.
pub fn build_network(spec: &NetworkSpec, seed: u64, parallel: bool) -> ConnectivityResult<Network> {
    let specs = spec.pathway_specs()?;
    for pathway in &specs {
        pathway.validate()?;
    }

    info!(target: "anisonet-connectivity",
        "Building network: {} populations, {} pathways, seed {}",
        spec.populations.len(), specs.len(), seed);

    #[cfg(feature = "parallel")]
    let built: ConnectivityResult<Vec<PathwayConnectivity>> = if parallel {
        specs.par_iter().map(|s| build_one(s, seed)).collect()
    } else {
        specs.iter().map(|s| build_one(s, seed)).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let built: ConnectivityResult<Vec<PathwayConnectivity>> = {
        let _ = parallel;
        specs.iter().map(|s| build_one(s, seed)).collect()
    };

    let pathways = built?
        .into_iter()
        .map(|p| (p.name.clone(), p))
        .collect();
    let specs = specs.into_iter().map(|s| (s.name.clone(), s)).collect();

    Ok(Network {
        seed,
        specs,
        pathways,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::GapPolicy;

    fn two_population_spec() -> NetworkSpec {
        let mut spec = NetworkSpec::default();
        spec.populations.insert("E".into(), PopulationSpec { grid_size: 8 });
        spec.populations.insert("I".into(), PopulationSpec { grid_size: 4 });
        let profile = RadialProfile::gaussian(1.5)
            .with_gap(1.0)
            .with_gap_policy(GapPolicy::Resample);
        spec.pathways.insert("EE".into(), PathwayConfig::new(3).with_profile(profile.clone()));
        spec.pathways.insert("EI".into(), PathwayConfig::new(2).with_profile(profile.clone()));
        spec.pathways.insert("IE".into(), PathwayConfig::new(4));
        spec
    }

    #[test]
    fn test_endpoints_from_name() {
        let spec = two_population_spec();
        assert_eq!(spec.endpoints("EI").unwrap(), ("E".to_string(), "I".to_string()));

        let mut spec = spec;
        spec.pathways.insert("long".into(), PathwayConfig::new(1));
        assert!(spec.endpoints("long").is_err());
        spec.pathways.insert("long".into(), PathwayConfig::new(1).with_endpoints("I", "I"));
        assert_eq!(spec.endpoints("long").unwrap(), ("I".to_string(), "I".to_string()));
    }

    #[test]
    fn test_pathway_spec_shapes() {
        let spec = two_population_spec();
        let ee = spec.pathway_spec("EE").unwrap();
        assert!(ee.recurrent);
        let ei = spec.pathway_spec("EI").unwrap();
        assert!(!ei.recurrent);
        assert_eq!((ei.n_sources(), ei.n_targets()), (64, 16));
    }

    #[test]
    fn test_unknown_population() {
        let mut spec = two_population_spec();
        spec.pathways.insert("EX".into(), PathwayConfig::new(1));
        let err = build_network(&spec, 1, false).unwrap_err();
        assert_eq!(err, ConnectivityError::UnknownPopulation("X".to_string()));
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let spec = two_population_spec();
        let a = build_network(&spec, 42, false).unwrap();
        let b = build_network(&spec, 42, true).unwrap();
        assert_eq!(a.pathways.len(), 3);
        for (name, pathway) in &a.pathways {
            assert_eq!(pathway.matrix, b.pathways[name].matrix, "{}", name);
        }
        assert_eq!(a.pathways["EI"].matrix.shape(), (64, 16));
    }

    #[test]
    fn test_summary_reports_every_pathway() {
        let network = build_network(&two_population_spec(), 3, false).unwrap();
        let summary = network.summary();
        assert_eq!(summary["seed"], 3);
        assert_eq!(summary["pathways"]["EI"]["shape"], json!([64, 16]));
        assert_eq!(summary["pathways"]["IE"]["total_weight"], 64);
        let eff = network.mean_efferent_anisotropy("EE").unwrap();
        assert!((0.0..=1.0).contains(&eff));
    }
}
