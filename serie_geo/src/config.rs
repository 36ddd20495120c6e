/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares configuration types for the harmonic diffusion solver and its snapshot recording.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Declares configuration types for the harmonic diffusion solver.
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Parameters controlling a [`HarmonicDiffusion`](crate::HarmonicDiffusion) run.
///
/// ### Stopping
/// A run stops after the first sweep whose largest absolute change is below
/// `eps`, or after `max_iter` sweeps.
///
/// ### Relaxation
/// Every free vertex moves to `epsilon * average + (1 - epsilon) * old`.
/// Values below one under-relax, values above one over-relax. The sweep
/// diverges outside `(0, 2)`, so those values are rejected.
///
/// ### Recording
/// With `record` set and `step_interval > 0`, the field is stored as
/// `"{name}1"`, `"{name}2"`, ... after every sweep whose zero-based index is
/// a multiple of `step_interval`. With `step_interval == 0` only the initial
/// field is stored, as `"{name}_init"`.
///
/// ### Default Values
/// - `max_iter`: `618`
/// - `eps`: `0.382e-5`
/// - `epsilon`: `0.5`
/// - `record`: `false`
/// - `step_interval`: `0`
/// - `name`: `"field"`
/// - `constraint_tolerance`: `None`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffusionParams {
    /// Maximum number of relaxation sweeps.
    pub max_iter: usize,

    /// Convergence threshold on the largest per-sweep change.
    pub eps: f64,

    /// Relaxation (damping) factor.
    pub epsilon: f64,

    /// Whether to keep snapshots of the field.
    pub record: bool,

    /// Sweeps between snapshots.
    pub step_interval: usize,

    /// Base name of the final field and its snapshots.
    pub name: String,

    /// Largest distance allowed between a constraint position and the vertex
    /// it pins. `None` accepts the nearest vertex at any distance, so
    /// positions outside the mesh snap to its closest vertex.
    pub constraint_tolerance: Option<f64>,
}

impl Default for DiffusionParams {
    fn default() -> Self {
        DiffusionParams {
            max_iter: 618,
            eps: 0.382e-5,
            epsilon: 0.5,
            record: false,
            step_interval: 0,
            name: "field".to_string(),
            constraint_tolerance: None,
        }
    }
}

impl DiffusionParams {
    /// Returns a new [`DiffusionParamsBuilder`] starting from the defaults.
    pub fn builder() -> DiffusionParamsBuilder {
        DiffusionParamsBuilder::new()
    }

    /// Checks every value is in range.
    pub fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(Error::invalid_parameter(
                "max_iter",
                self.max_iter,
                "must be at least 1",
            ));
        }
        if !(self.eps.is_finite() && self.eps > 0.0) {
            return Err(Error::invalid_parameter(
                "eps",
                self.eps,
                "must be positive and finite",
            ));
        }
        if !(self.epsilon > 0.0 && self.epsilon < 2.0) {
            return Err(Error::invalid_parameter(
                "epsilon",
                self.epsilon,
                "must lie in the open interval (0, 2)",
            ));
        }
        if let Some(tolerance) = self.constraint_tolerance {
            if tolerance.is_nan() || tolerance < 0.0 {
                return Err(Error::invalid_parameter(
                    "constraint_tolerance",
                    tolerance,
                    "must be non-negative",
                ));
            }
        }
        Ok(())
    }
}

/// A convenience builder for constructing a [`DiffusionParams`] instance.
///
/// The builder should be called via the [`DiffusionParams::builder`] method.
///
/// See [`DiffusionParams`] for details on each field.
#[derive(Debug, Clone)]
pub struct DiffusionParamsBuilder {
    pub max_iter: usize,
    pub eps: f64,
    pub epsilon: f64,
    pub record: bool,
    pub step_interval: usize,
    pub name: String,
    pub constraint_tolerance: Option<f64>,
}

impl DiffusionParamsBuilder {
    fn new() -> Self {
        let defaults = DiffusionParams::default();
        Self {
            max_iter: defaults.max_iter,
            eps: defaults.eps,
            epsilon: defaults.epsilon,
            record: defaults.record,
            step_interval: defaults.step_interval,
            name: defaults.name,
            constraint_tolerance: defaults.constraint_tolerance,
        }
    }

    /// Sets the maximum number of sweeps.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the convergence threshold.
    pub fn eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    /// Sets the relaxation factor.
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Enables snapshot recording every `step_interval` sweeps
    /// (`0` records the initial field only).
    pub fn record(mut self, step_interval: usize) -> Self {
        self.record = true;
        self.step_interval = step_interval;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn constraint_tolerance(mut self, tolerance: f64) -> Self {
        self.constraint_tolerance = Some(tolerance);
        self
    }

    /// Builds and validates a [`DiffusionParams`] from the values defined in
    /// the builder.
    pub fn build(self) -> Result<DiffusionParams> {
        let params = DiffusionParams {
            max_iter: self.max_iter,
            eps: self.eps,
            epsilon: self.epsilon,
            record: self.record,
            step_interval: self.step_interval,
            name: self.name,
            constraint_tolerance: self.constraint_tolerance,
        };
        params.validate()?;
        Ok(params)
    }
}
