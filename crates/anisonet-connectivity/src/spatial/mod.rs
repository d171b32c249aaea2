// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Toroidal grid geometry and anisotropy diagnostics.

Pure functions only; these are shared by the samplers and exposed to external
analysis code.
*/

pub mod grid;
pub mod order;

pub use grid::{
    coordinate_of, coordinates_of, index_of, indices_of, map_to_grid, minimal_displacement,
    wrap,
};
pub use order::{
    afferent_anisotropy, efferent_anisotropy, estimate_order_parameter,
    estimate_order_parameter_of_order, OrderParameter,
};
