// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core types for connectivity synthesis.
*/

/// Flat, row-major neuron index (`y * grid_size + x`)
pub type NeuronIndex = usize;

/// 2D grid coordinate `(x, y)`.
///
/// Signed so that displacements and unwrapped targets share the same type.
pub type Coord = (i64, i64);

/// Result type for connectivity operations
pub type ConnectivityResult<T> = Result<T, ConnectivityError>;

/// Broad failure classes, used by callers to decide between aborting and
/// re-parameterizing a pathway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or incomplete configuration; detected before any sampling
    Configuration,
    /// Sampling finished but realized too few connections
    InsufficientYield,
    /// Divisibility or array-shape violation
    Shape,
}

/// Errors that can occur during connectivity synthesis
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConnectivityError {
    #[error("Unsupported {kind} method: {name}")]
    UnsupportedMethod { kind: &'static str, name: String },

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Homogeneous landscape requires vmin == vmax, got vmin={vmin}, vmax={vmax}")]
    HomogeneousBounds { vmin: f64, vmax: f64 },

    #[error("Unknown population: {0}")]
    UnknownPopulation(String),

    #[error(
        "Insufficient yield for pathway {pathway}: realized {realized} of {requested} requested connections (at least {required} required)"
    )]
    InsufficientYield {
        pathway: String,
        realized: u64,
        required: u64,
        requested: u64,
    },

    #[error("Grid size {grid_size} is not divisible by Perlin scale {scale}")]
    IndivisibleGrid { grid_size: usize, scale: usize },

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("Index {index} out of range for {len} neurons")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Order parameter undefined: weights are empty or sum to zero")]
    DegenerateWeights,
}

impl ConnectivityError {
    /// Classify the error into one of the three failure kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConnectivityError::UnsupportedMethod { .. }
            | ConnectivityError::MissingParameter(_)
            | ConnectivityError::InvalidParameter { .. }
            | ConnectivityError::HomogeneousBounds { .. }
            | ConnectivityError::UnknownPopulation(_) => ErrorKind::Configuration,
            ConnectivityError::InsufficientYield { .. } => ErrorKind::InsufficientYield,
            ConnectivityError::IndivisibleGrid { .. }
            | ConnectivityError::ShapeMismatch { .. }
            | ConnectivityError::IndexOutOfRange { .. }
            | ConnectivityError::DegenerateWeights => ErrorKind::Shape,
        }
    }

    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConnectivityError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
