// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Connectivity synthesis: isotropic and anisotropic samplers, the sparse count
matrix they fill, and the synapse parameter deriver.

```text
PathwaySpec ─► build_pathway ─┬─► build_isotropic ────┐
                              └─► build_anisotropic ──┴─► ConnectivityMatrix
                                        │                        │
                                    Landscapes ──► derive_synaptic_parameters
```
*/

pub mod anisotropic;
pub mod anisotropy;
pub mod isotropic;
pub mod matrix;
pub mod pathway;
pub mod synaptic;

pub use anisotropic::{build_anisotropic, preferred_radius, RADIAL_OVERSAMPLING};
pub use anisotropy::{
    AngularBias, AnisotropyConfig, AnisotropyParams, ConnectivityMethod, Landscapes, RadialBias,
    SynapticMethod, PHI, RADIUS,
};
pub use isotropic::build_isotropic;
pub use matrix::{ConnectionAccumulator, ConnectivityMatrix};
pub use pathway::{build_pathway, PathwayConnectivity, PathwaySpec, MIN_YIELD};
pub use synaptic::{
    alignment, derive_synaptic_parameters, remap_cosine, SynapticParameters, SynapticValues,
};
