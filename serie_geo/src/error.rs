/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the error type shared by the spatial index, interpolation and diffusion modules.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Error types for `serie_geo` operations.
use serie_geo_utils::SerieError;
use thiserror::Error;

/// Errors raised by `serie_geo` operations.
///
/// Every variant is a usage or validation failure detected before any output
/// is produced; none of them are transient.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Two parallel input sequences have different lengths.
    #[error("size mismatch for {what}: expected {expected}, got {found}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A required input sequence is empty.
    #[error("{0} cannot be empty")]
    EmptyInput(&'static str),

    /// An index does not refer to a stored item.
    #[error("index {index} is out of bounds for {count} items")]
    IndexOutOfBounds { index: usize, count: usize },

    /// A configuration value is outside its valid range.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A triangle references a missing vertex or repeats a vertex.
    #[error("triangle {triangle} {vertices:?} is invalid for a mesh of {num_vertices} vertices: {reason}")]
    InvalidTriangle {
        triangle: usize,
        vertices: [usize; 3],
        num_vertices: usize,
        reason: &'static str,
    },

    /// No mesh vertex lies within the tolerance of a constraint position.
    #[error("no mesh vertex within {tolerance} of {position:?} (closest is {distance} away)")]
    ConstraintNotFound {
        position: Vec<f64>,
        tolerance: f64,
        distance: f64,
    },

    /// All interpolation candidates were filtered out for a target.
    #[error("no sample contributes to target {target}")]
    NoContributingSamples { target: usize },

    /// Error converting to or from a [`serie_geo_utils::Serie`].
    #[error(transparent)]
    Serie(#[from] SerieError),
}

impl Error {
    pub(crate) fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: &'static str,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

/// Result type alias for `serie_geo` operations.
pub type Result<T> = std::result::Result<T, Error>;
