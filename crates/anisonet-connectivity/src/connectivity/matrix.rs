// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Sparse connection-count matrix.

Entry `(s, t)` counts the directed connections from source `s` to target `t`.
Draws are first collected per source row by a [`ConnectionAccumulator`]; the
accumulator then sorts each row and folds repeated targets into a multiplicity.
That folding is the only place duplicate draws are merged, so the result does
not depend on any sparse-format summation rules.
*/

use crate::spatial::{coordinate_of, efferent_anisotropy, afferent_anisotropy, map_to_grid, OrderParameter};
use crate::types::{ConnectivityError, ConnectivityResult, Coord, NeuronIndex};
use ndarray::Array2;

/// Row-wise collector of `(source, target)` draws.
#[derive(Debug, Clone)]
pub struct ConnectionAccumulator {
    n_targets: usize,
    rows: Vec<Vec<NeuronIndex>>,
}

impl ConnectionAccumulator {
    pub fn new(n_sources: usize, n_targets: usize) -> Self {
        Self {
            n_targets,
            rows: vec![Vec::new(); n_sources],
        }
    }

    /// Record one connection draw.
    #[inline]
    pub fn push(&mut self, source: NeuronIndex, target: NeuronIndex) {
        debug_assert!(target < self.n_targets, "target index out of range");
        self.rows[source].push(target);
    }

    /// Number of draws recorded so far.
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    /// Fold repeated draws into multiplicities and build the matrix.
    ///
    /// With `clear_diagonal`, every `(i, i)` entry is dropped.
    pub fn finish(self, clear_diagonal: bool) -> ConnectivityMatrix {
        let n_sources = self.rows.len();
        let mut row_offsets = Vec::with_capacity(n_sources + 1);
        let mut targets = Vec::new();
        let mut counts = Vec::new();
        row_offsets.push(0);

        for (source, mut row) in self.rows.into_iter().enumerate() {
            row.sort_unstable();
            let mut i = 0;
            while i < row.len() {
                let target = row[i];
                let mut j = i + 1;
                while j < row.len() && row[j] == target {
                    j += 1;
                }
                if !(clear_diagonal && target == source) {
                    targets.push(target);
                    counts.push((j - i) as u32);
                }
                i = j;
            }
            row_offsets.push(targets.len());
        }

        ConnectivityMatrix {
            n_sources,
            n_targets: self.n_targets,
            row_offsets,
            targets,
            counts,
        }
    }
}

/// Immutable CSR matrix of connection multiplicities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityMatrix {
    n_sources: usize,
    n_targets: usize,
    row_offsets: Vec<usize>,
    targets: Vec<NeuronIndex>,
    counts: Vec<u32>,
}

impl ConnectivityMatrix {
    /// `(n_sources, n_targets)`
    pub fn shape(&self) -> (usize, usize) {
        (self.n_sources, self.n_targets)
    }

    pub fn n_sources(&self) -> usize {
        self.n_sources
    }

    pub fn n_targets(&self) -> usize {
        self.n_targets
    }

    /// Number of distinct non-zero `(s, t)` cells.
    pub fn nnz(&self) -> usize {
        self.targets.len()
    }

    /// Sum of all multiplicities, i.e. the number of synaptic instances.
    pub fn total_weight(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Sum of the diagonal.
    pub fn trace(&self) -> u64 {
        (0..self.n_sources.min(self.n_targets))
            .map(|i| self.get(i, i) as u64)
            .sum()
    }

    /// Multiplicity of `(source, target)`; zero when absent or out of range.
    pub fn get(&self, source: NeuronIndex, target: NeuronIndex) -> u32 {
        if source >= self.n_sources {
            return 0;
        }
        let (lo, hi) = (self.row_offsets[source], self.row_offsets[source + 1]);
        match self.targets[lo..hi].binary_search(&target) {
            Ok(pos) => self.counts[lo + pos],
            Err(_) => 0,
        }
    }

    /// Non-zero `(target, count)` entries of one source row, in target order.
    pub fn row(&self, source: NeuronIndex) -> impl Iterator<Item = (NeuronIndex, u32)> + '_ {
        let (lo, hi) = if source < self.n_sources {
            (self.row_offsets[source], self.row_offsets[source + 1])
        } else {
            (0, 0)
        };
        self.targets[lo..hi]
            .iter()
            .copied()
            .zip(self.counts[lo..hi].iter().copied())
    }

    /// Total outgoing connections of one source.
    pub fn out_degree(&self, source: NeuronIndex) -> u64 {
        self.row(source).map(|(_, c)| c as u64).sum()
    }

    /// Total incoming connections per target.
    pub fn in_degrees(&self) -> Vec<u64> {
        let mut degrees = vec![0u64; self.n_targets];
        for (&t, &c) in self.targets.iter().zip(&self.counts) {
            degrees[t] += c as u64;
        }
        degrees
    }

    /// All non-zero `(source, target, count)` entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (NeuronIndex, NeuronIndex, u32)> + '_ {
        (0..self.n_sources).flat_map(move |s| self.row(s).map(move |(t, c)| (s, t, c)))
    }

    /// One `(source, target)` pair per synaptic instance: row-major, then by
    /// duplicate instance.
    pub fn synapses(&self) -> impl Iterator<Item = (NeuronIndex, NeuronIndex)> + '_ {
        self.iter()
            .flat_map(|(s, t, c)| std::iter::repeat((s, t)).take(c as usize))
    }

    /// Dense copy, mostly for inspection and small tests.
    pub fn to_dense(&self) -> Array2<u32> {
        let mut dense = Array2::zeros((self.n_sources, self.n_targets));
        for (s, t, c) in self.iter() {
            dense[[s, t]] = c;
        }
        dense
    }

    /// Order parameter of the outgoing connections of `source`, measured on
    /// the target grid. Multi-edges count once per instance.
    pub fn efferent_anisotropy(
        &self,
        source: NeuronIndex,
        source_grid: usize,
        target_grid: usize,
    ) -> ConnectivityResult<OrderParameter> {
        if source >= self.n_sources {
            return Err(ConnectivityError::IndexOutOfRange {
                index: source,
                len: self.n_sources,
            });
        }
        let origin = map_to_grid(coordinate_of(source, source_grid), source_grid, target_grid);
        let targets: Vec<Coord> = self
            .row(source)
            .flat_map(|(t, c)| std::iter::repeat(coordinate_of(t, target_grid)).take(c as usize))
            .collect();
        efferent_anisotropy(origin, &targets, target_grid)
    }

    /// Order parameter of the incoming connections of `target`, measured on
    /// the target grid. Multi-edges count once per instance.
    pub fn afferent_anisotropy(
        &self,
        target: NeuronIndex,
        source_grid: usize,
        target_grid: usize,
    ) -> ConnectivityResult<OrderParameter> {
        if target >= self.n_targets {
            return Err(ConnectivityError::IndexOutOfRange {
                index: target,
                len: self.n_targets,
            });
        }
        let sources: Vec<Coord> = self
            .iter()
            .filter(|&(_, t, _)| t == target)
            .flat_map(|(s, _, c)| {
                let mapped = map_to_grid(coordinate_of(s, source_grid), source_grid, target_grid);
                std::iter::repeat(mapped).take(c as usize)
            })
            .collect();
        afferent_anisotropy(coordinate_of(target, target_grid), &sources, target_grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matrix(clear_diagonal: bool) -> ConnectivityMatrix {
        let mut acc = ConnectionAccumulator::new(3, 3);
        for (s, t) in [(0, 2), (0, 1), (0, 2), (1, 1), (2, 0), (0, 2)] {
            acc.push(s, t);
        }
        assert_eq!(acc.len(), 6);
        acc.finish(clear_diagonal)
    }

    #[test]
    fn test_duplicates_fold_into_multiplicity() {
        let w = sample_matrix(false);
        assert_eq!(w.get(0, 2), 3);
        assert_eq!(w.get(0, 1), 1);
        assert_eq!(w.nnz(), 4);
        assert_eq!(w.total_weight(), 6);
        assert_eq!(w.trace(), 1);
    }

    #[test]
    fn test_clear_diagonal() {
        let w = sample_matrix(true);
        assert_eq!(w.trace(), 0);
        assert_eq!(w.total_weight(), 5);
        assert_eq!(w.out_degree(1), 0);
    }

    #[test]
    fn test_synapse_expansion_order() {
        let w = sample_matrix(false);
        let synapses: Vec<_> = w.synapses().collect();
        assert_eq!(
            synapses,
            vec![(0, 1), (0, 2), (0, 2), (0, 2), (1, 1), (2, 0)]
        );
    }

    #[test]
    fn test_dense_and_degrees() {
        let w = sample_matrix(false);
        let dense = w.to_dense();
        assert_eq!(dense[[0, 2]], 3);
        assert_eq!(dense.sum(), 6);
        assert_eq!(w.in_degrees(), vec![1, 2, 3]);
    }

    #[test]
    fn test_row_anisotropy_points_east() {
        // 5x5 grid, source at (1, 1) connects to (2, 1) and (3, 1)
        let mut acc = ConnectionAccumulator::new(25, 25);
        acc.push(6, 7);
        acc.push(6, 8);
        let w = acc.finish(true);
        let op = w.efferent_anisotropy(6, 5, 5).unwrap();
        assert!(op.angle.abs() < 1e-9);
        assert!((op.magnitude - 1.0).abs() < 1e-9);

        let op = w.afferent_anisotropy(8, 5, 5).unwrap();
        assert!((op.angle.abs() - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn test_anisotropy_index_checked() {
        let w = sample_matrix(false);
        assert_eq!(
            w.efferent_anisotropy(3, 3, 3),
            Err(ConnectivityError::IndexOutOfRange { index: 3, len: 3 })
        );
    }
}
