// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Index/coordinate transforms on a periodic `gs × gs` lattice.

Neurons are numbered row-major: `index = y * gs + x`.
*/

use crate::types::{ConnectivityError, ConnectivityResult, Coord, NeuronIndex};
use ndarray::Array2;

/// Coordinate `(x, y)` of a neuron index.
#[inline]
pub fn coordinate_of(index: NeuronIndex, grid_size: usize) -> Coord {
    debug_assert!(grid_size > 0, "grid size must be positive");
    ((index % grid_size) as i64, (index / grid_size) as i64)
}

/// Neuron index of a coordinate. Inverse of [`coordinate_of`] for in-grid coordinates;
/// out-of-grid coordinates are wrapped first.
#[inline]
pub fn index_of(coord: Coord, grid_size: usize) -> NeuronIndex {
    let (x, y) = wrap(coord, grid_size);
    (y as usize) * grid_size + x as usize
}

/// Wrap a coordinate onto the torus.
#[inline]
pub fn wrap(coord: Coord, grid_size: usize) -> Coord {
    let gs = grid_size as i64;
    (coord.0.rem_euclid(gs), coord.1.rem_euclid(gs))
}

/// Shortest periodic displacement from `a` to `b`.
///
/// Each component lies in `(-gs/2, gs/2]`.
#[inline]
pub fn minimal_displacement(a: Coord, b: Coord, grid_size: usize) -> Coord {
    (fold(b.0 - a.0, grid_size), fold(b.1 - a.1, grid_size))
}

#[inline]
fn fold(delta: i64, grid_size: usize) -> i64 {
    let gs = grid_size as i64;
    let d = delta.rem_euclid(gs);
    if 2 * d > gs {
        d - gs
    } else {
        d
    }
}

/// Map a coordinate from one grid resolution onto another.
///
/// Used when source and target populations have different grid sizes.
/// Exact halves round to even, so halving a grid carries no net drift.
#[inline]
pub fn map_to_grid(coord: Coord, from_grid: usize, to_grid: usize) -> Coord {
    if from_grid == to_grid {
        return coord;
    }
    let ratio = to_grid as f64 / from_grid as f64;
    let mapped = (
        (coord.0 as f64 * ratio).round_ties_even() as i64,
        (coord.1 as f64 * ratio).round_ties_even() as i64,
    );
    wrap(mapped, to_grid)
}

/// Coordinates of a batch of indices as an `n × 2` array of `(x, y)` rows.
pub fn coordinates_of(indices: &[NeuronIndex], grid_size: usize) -> Array2<i64> {
    let mut coords = Array2::<i64>::zeros((indices.len(), 2));
    for (row, &index) in indices.iter().enumerate() {
        let (x, y) = coordinate_of(index, grid_size);
        coords[[row, 0]] = x;
        coords[[row, 1]] = y;
    }
    coords
}

/// Indices of a batch of `(x, y)` rows.
///
/// Fails with a shape error unless the array has exactly two columns.
pub fn indices_of(coords: &Array2<i64>, grid_size: usize) -> ConnectivityResult<Vec<NeuronIndex>> {
    if coords.ncols() != 2 {
        return Err(ConnectivityError::ShapeMismatch {
            expected: "(n, 2) coordinate array".to_string(),
            actual: format!("{:?}", coords.shape()),
        });
    }
    Ok(coords
        .rows()
        .into_iter()
        .map(|row| index_of((row[0], row[1]), grid_size))
        .collect())
}
