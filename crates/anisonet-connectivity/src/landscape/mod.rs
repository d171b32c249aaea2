// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Scalar fields over the periodic neuron grid.

Landscapes are spatial bias sources: an angular landscape (`phi`) steers
connection directions, a radial landscape (`r`) steers connection lengths.
A landscape is generated once per pathway and never mutated afterwards.
*/

mod perlin;

use crate::spatial::grid::wrap;
use crate::types::{ConnectivityError, ConnectivityResult, Coord, NeuronIndex};
use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::debug;

/// Landscape generation method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LandscapeMethod {
    /// Smooth periodic noise; `scale` is the number of lattice cells per axis
    Perlin {
        scale: usize,
        #[serde(default = "default_seamless")]
        seamless: bool,
    },
    /// Independent uniform value per cell in `[vmin, vmax]`
    Random,
    /// Constant field; requires `vmin == vmax`
    Homogeneous,
    /// Independent uniform angle per cell in `[0, 2π)`, ignoring bounds
    Symmetric,
}

fn default_seamless() -> bool {
    true
}

impl LandscapeMethod {
    /// Resolve a method from its name.
    ///
    /// `perlin` requires a `scale`; any other unknown name is an unsupported method.
    pub fn from_name(name: &str, scale: Option<usize>) -> ConnectivityResult<Self> {
        match name {
            "perlin" => scale
                .map(|scale| LandscapeMethod::Perlin {
                    scale,
                    seamless: true,
                })
                .ok_or_else(|| ConnectivityError::MissingParameter("scale".to_string())),
            "random" => Ok(LandscapeMethod::Random),
            "homogeneous" => Ok(LandscapeMethod::Homogeneous),
            "symmetric" => Ok(LandscapeMethod::Symmetric),
            other => Err(ConnectivityError::UnsupportedMethod {
                kind: "landscape",
                name: other.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LandscapeMethod::Perlin { .. } => "perlin",
            LandscapeMethod::Random => "random",
            LandscapeMethod::Homogeneous => "homogeneous",
            LandscapeMethod::Symmetric => "symmetric",
        }
    }
}

/// A `gs × gs` field, stored `[y, x]` so that iteration order matches neuron indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Landscape {
    values: Array2<f64>,
}

impl Landscape {
    /// Wrap an existing square array.
    pub fn from_array(values: Array2<f64>) -> ConnectivityResult<Self> {
        let (rows, cols) = values.dim();
        if rows != cols || rows == 0 {
            return Err(ConnectivityError::ShapeMismatch {
                expected: "non-empty square field".to_string(),
                actual: format!("({}, {})", rows, cols),
            });
        }
        Ok(Self { values })
    }

    /// Constant field.
    pub fn constant(grid_size: usize, value: f64) -> Self {
        Self {
            values: Array2::from_elem((grid_size, grid_size), value),
        }
    }

    pub fn grid_size(&self) -> usize {
        self.values.nrows()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Value at a coordinate, wrapped onto the torus.
    pub fn at(&self, coord: Coord) -> f64 {
        let (x, y) = wrap(coord, self.grid_size());
        self.values[[y as usize, x as usize]]
    }

    /// Value at a neuron index.
    pub fn at_index(&self, index: NeuronIndex) -> f64 {
        let gs = self.grid_size();
        self.values[[index / gs, index % gs]]
    }

    /// Values in neuron-index order.
    pub fn to_flat(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Rank-equalized copy: the k-th smallest cell gets the k-th point of an
    /// evenly spaced ramp over `[tmin, tmax]`. Ties keep index order.
    pub fn balanced(&self, tmin: f64, tmax: f64) -> Self {
        let flat = self.to_flat();
        let n = flat.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| flat[a].total_cmp(&flat[b]));

        let mut ramp = vec![0.0; n];
        for (rank, &idx) in order.iter().enumerate() {
            let t = if n > 1 {
                rank as f64 / (n - 1) as f64
            } else {
                0.0
            };
            ramp[idx] = tmin + (tmax - tmin) * t;
        }
        let gs = self.grid_size();
        Self {
            values: Array2::from_shape_fn((gs, gs), |(y, x)| ramp[y * gs + x]),
        }
    }
}

/// Generate a landscape with the given method and bounds.
///
/// Bounds are ignored by [`LandscapeMethod::Symmetric`].
pub fn generate<R: Rng + ?Sized>(
    grid_size: usize,
    vmin: f64,
    vmax: f64,
    method: &LandscapeMethod,
    rng: &mut R,
) -> ConnectivityResult<Landscape> {
    if grid_size == 0 {
        return Err(ConnectivityError::invalid("grid_size", "must be positive"));
    }
    if !matches!(method, LandscapeMethod::Symmetric) {
        if !vmin.is_finite() || !vmax.is_finite() {
            return Err(ConnectivityError::invalid("vmin/vmax", "bounds must be finite"));
        }
        if vmin > vmax {
            return Err(ConnectivityError::invalid(
                "vmin/vmax",
                format!("vmin ({}) exceeds vmax ({})", vmin, vmax),
            ));
        }
    }

    debug!(target: "anisonet-connectivity", "Generating {} landscape ({}x{}) in [{}, {}]",
        method.name(), grid_size, grid_size, vmin, vmax);

    let dim = (grid_size, grid_size);
    let values = match method {
        LandscapeMethod::Perlin { scale, seamless } => {
            let noise = perlin::perlin_noise(grid_size, *scale, *seamless, rng)?;
            noise.mapv(|v| (vmin + (vmax - vmin) * (v + 1.0) / 2.0).clamp(vmin, vmax))
        }
        LandscapeMethod::Random => {
            Array2::from_shape_simple_fn(dim, || rng.gen_range(vmin..=vmax))
        }
        LandscapeMethod::Homogeneous => {
            if vmin != vmax {
                return Err(ConnectivityError::HomogeneousBounds { vmin, vmax });
            }
            Array2::from_elem(dim, vmin)
        }
        LandscapeMethod::Symmetric => Array2::from_shape_simple_fn(dim, || rng.gen_range(0.0..TAU)),
    };

    Ok(Landscape { values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::PI;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(18)
    }

    #[test]
    fn test_perlin_within_bounds() {
        let method = LandscapeMethod::Perlin {
            scale: 3,
            seamless: true,
        };
        let field = generate(30, -PI, PI, &method, &mut rng()).unwrap();
        assert_eq!(field.grid_size(), 30);
        assert!(field.min() >= -PI && field.max() <= PI);
    }

    #[test]
    fn test_random_within_bounds() {
        let field = generate(20, 0.1, 0.4, &LandscapeMethod::Random, &mut rng()).unwrap();
        assert!(field.min() >= 0.1 && field.max() <= 0.4);
        assert!(field.max() > field.min());
    }

    #[test]
    fn test_homogeneous_requires_equal_bounds() {
        let field = generate(5, 1.5, 1.5, &LandscapeMethod::Homogeneous, &mut rng()).unwrap();
        assert!(field.values().iter().all(|&v| v == 1.5));

        let err = generate(5, 0.0, 1.0, &LandscapeMethod::Homogeneous, &mut rng()).unwrap_err();
        assert_eq!(
            err,
            ConnectivityError::HomogeneousBounds {
                vmin: 0.0,
                vmax: 1.0
            }
        );
    }

    #[test]
    fn test_symmetric_ignores_bounds() {
        let field = generate(16, 5.0, 5.0, &LandscapeMethod::Symmetric, &mut rng()).unwrap();
        assert!(field.values().iter().all(|&v| (0.0..TAU).contains(&v)));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            LandscapeMethod::from_name("perlin", Some(4)).unwrap(),
            LandscapeMethod::Perlin {
                scale: 4,
                seamless: true
            }
        );
        assert!(matches!(
            LandscapeMethod::from_name("perlin", None),
            Err(ConnectivityError::MissingParameter(_))
        ));
        assert!(matches!(
            LandscapeMethod::from_name("simplex", None),
            Err(ConnectivityError::UnsupportedMethod { kind: "landscape", .. })
        ));
    }

    #[test]
    fn test_index_and_coordinate_access_agree() {
        let field = generate(8, 0.0, 1.0, &LandscapeMethod::Random, &mut rng()).unwrap();
        assert_eq!(field.at_index(8 * 3 + 5), field.at((5, 3)));
        assert_eq!(field.at((-1, 0)), field.at((7, 0)));
        assert_eq!(field.to_flat()[8 * 3 + 5], field.at((5, 3)));
    }

    #[test]
    fn test_balanced_is_even_ramp() {
        let values = Array2::from_shape_vec((2, 2), vec![0.9, 0.1, 0.5, 0.3]).unwrap();
        let field = Landscape::from_array(values).unwrap().balanced(0.0, 3.0);
        let expected = [3.0, 0.0, 2.0, 1.0];
        for (got, want) in field.to_flat().iter().zip(expected) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn test_method_deserializes_from_tagged_table() {
        let method: LandscapeMethod = serde_json::from_str(r#"{"type": "perlin", "scale": 2}"#).unwrap();
        assert_eq!(
            method,
            LandscapeMethod::Perlin {
                scale: 2,
                seamless: true
            }
        );
        assert!(serde_json::from_str::<LandscapeMethod>(r#"{"type": "worley"}"#).is_err());
    }
}
