// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Anisonet Connectivity

Spatially structured connectivity for populations of neurons laid out on
square toroidal grids:
- Landscapes (smooth Perlin fields, random, homogeneous and symmetric fields)
- Isotropic sampling from a radial profile
- Anisotropic sampling steered by an angular landscape, optionally with a
  preferred-radius landscape
- Per-synapse parameter derivation from connection geometry
- Toroidal geometry helpers and the order parameter used for diagnostics

## Architecture

- `landscape` → scalar fields over the grid
- `profile` → radial distance distributions and gap handling
- `connectivity` → samplers, sparse count matrix, synapse parameters
- `network` → populations, named pathways, seeded (optionally parallel) builds
- `spatial` → coordinate math and order parameters

Every sampling call takes its random generator explicitly.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod connectivity;
pub mod landscape;
pub mod network;
pub mod profile;
pub mod rng;
pub mod spatial;
pub mod types;

pub use connectivity::{
    build_anisotropic, build_isotropic, build_pathway, derive_synaptic_parameters, AngularBias,
    AnisotropyConfig, ConnectivityMatrix, Landscapes, PathwayConnectivity, PathwaySpec,
    RadialBias, SynapticParameters, SynapticValues,
};
pub use landscape::{generate, Landscape, LandscapeMethod};
pub use network::{build_network, Network, NetworkSpec, PathwayConfig, PopulationSpec};
pub use profile::{GapPolicy, RadialProfile, RadialProfileKind};
pub use rng::{entropy_seed, pathway_seed, seeded_rng};
pub use spatial::{
    coordinate_of, estimate_order_parameter, index_of, minimal_displacement, OrderParameter,
};
pub use types::{ConnectivityError, ConnectivityResult, Coord, ErrorKind, NeuronIndex};
