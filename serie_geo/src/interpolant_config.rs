/////////////////////////////////////////////////////////////////////////////////////////////
//
// Specifies neighbour selection, weighting, barrier, group and smoothing options for IDW.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Specifies neighbour selection, weighting, barrier, group and smoothing options
//! for inverse-distance-weighted interpolation.
use crate::discontinuity::CurvedDiscontinuity;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Post-pass applied to the interpolated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmoothingMethod {
    /// Leave the interpolated field untouched.
    None,

    /// Weighted average with weights `exp(-d² / (2 r²))`.
    Gaussian,

    /// Unweighted average of the neighbourhood.
    Mean,

    /// Component-wise median of the neighbourhood.
    Median,
}

/// What happens to a sample whose straight path to the target crosses a barrier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BarrierMode {
    /// The sample does not contribute.
    Exclude,

    /// The sample contributes with its weight multiplied by the factor.
    Penalize(f64),
}

/// Behaviour when every candidate of a target has been filtered out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZeroWeightPolicy {
    /// Use the value of the nearest candidate, ignoring barriers and groups.
    NearestSample,

    /// Every component of the result is NaN.
    NaN,

    /// Fail with [`Error::NoContributingSamples`].
    Error,
}

/// Group membership of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub group_id: usize,

    /// Multiplier applied to the sample's weight when groups are respected.
    pub weight: f64,
}

impl GroupInfo {
    pub fn new(group_id: usize, weight: f64) -> Self {
        Self { group_id, weight }
    }
}

impl Default for GroupInfo {
    fn default() -> Self {
        Self {
            group_id: 0,
            weight: 1.0,
        }
    }
}

/// A convenience builder for constructing an [`InterpolationParams`] instance.
///
/// The builder should be called via the [`InterpolationParams::builder`] method.
/// See [`InterpolationParams`] for details on each field.
#[derive(Debug, Clone)]
pub struct InterpolationParamsBuilder {
    params: InterpolationParams,
}

impl InterpolationParamsBuilder {
    /// Sets the number of contributing neighbours; `None` uses every sample.
    pub fn num_neighbors(mut self, num_neighbors: Option<usize>) -> Self {
        self.params.num_neighbors = num_neighbors;
        self
    }

    /// Sets the distance exponent.
    pub fn power(mut self, power: f64) -> Self {
        self.params.power = power;
        self
    }

    /// Sets the coincidence tolerance and weight offset.
    pub fn smoothing(mut self, smoothing: f64) -> Self {
        self.params.smoothing = smoothing;
        self
    }

    pub fn smoothing_method(mut self, smoothing_method: SmoothingMethod) -> Self {
        self.params.smoothing_method = smoothing_method;
        self
    }

    pub fn smoothing_radius(mut self, smoothing_radius: f64) -> Self {
        self.params.smoothing_radius = smoothing_radius;
        self
    }

    pub fn smoothing_iterations(mut self, smoothing_iterations: usize) -> Self {
        self.params.smoothing_iterations = smoothing_iterations;
        self
    }

    /// Adds one barrier.
    pub fn discontinuity(mut self, discontinuity: CurvedDiscontinuity) -> Self {
        self.params.discontinuities.push(discontinuity);
        self
    }

    /// Replaces the barrier list.
    pub fn discontinuities(mut self, discontinuities: Vec<CurvedDiscontinuity>) -> Self {
        self.params.discontinuities = discontinuities;
        self
    }

    pub fn barrier_mode(mut self, barrier_mode: BarrierMode) -> Self {
        self.params.barrier_mode = barrier_mode;
        self
    }

    pub fn respect_groups(mut self, respect_groups: bool) -> Self {
        self.params.respect_groups = respect_groups;
        self
    }

    pub fn cross_group_penalty(mut self, cross_group_penalty: f64) -> Self {
        self.params.cross_group_penalty = cross_group_penalty;
        self
    }

    pub fn zero_weight_policy(mut self, zero_weight_policy: ZeroWeightPolicy) -> Self {
        self.params.zero_weight_policy = zero_weight_policy;
        self
    }

    /// Validates the values and returns the finished [`InterpolationParams`].
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] for the first value out of range, see
    /// [`InterpolationParams::validate`].
    pub fn build(self) -> Result<InterpolationParams> {
        self.params.validate()?;
        Ok(self.params)
    }
}

/// Parameters of [`interpolate_field`](crate::interpolate_field).
///
/// # Weighting
/// A sample at distance `d` from the target receives the weight
/// `1 / (d + smoothing)^power`, multiplied by the barrier penalty when its path
/// crosses a barrier in [`BarrierMode::Penalize`] mode and by its group
/// factors when `respect_groups` is set.
///
/// # Neighbours
/// With `num_neighbors = Some(k)` the `2k` nearest samples are fetched and the
/// first `k` that survive the barrier filter contribute. `None` considers
/// every sample.
///
/// # Smoothing
/// `smoothing_method` is applied `smoothing_iterations` times over the
/// targets within `smoothing_radius` of each target, never across a barrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationParams {
    pub num_neighbors: Option<usize>,
    pub power: f64,

    /// Squared-distance tolerance for coincident samples, also added to every
    /// distance before weighting.
    pub smoothing: f64,
    pub smoothing_method: SmoothingMethod,
    pub smoothing_radius: f64,
    pub smoothing_iterations: usize,
    pub discontinuities: Vec<CurvedDiscontinuity>,
    pub barrier_mode: BarrierMode,
    pub respect_groups: bool,

    /// Weight multiplier for samples outside the target's majority group.
    pub cross_group_penalty: f64,
    pub zero_weight_policy: ZeroWeightPolicy,
}

impl Default for InterpolationParams {
    fn default() -> Self {
        Self {
            num_neighbors: Some(4),
            power: 2.0,
            smoothing: 0.0,
            smoothing_method: SmoothingMethod::None,
            smoothing_radius: 0.1,
            smoothing_iterations: 1,
            discontinuities: Vec::new(),
            barrier_mode: BarrierMode::Exclude,
            respect_groups: false,
            cross_group_penalty: 1.0,
            zero_weight_policy: ZeroWeightPolicy::NearestSample,
        }
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    match value.is_finite() && value >= 0.0 {
        true => Ok(()),
        false => Err(Error::invalid_parameter(
            name,
            value,
            "must be finite and non-negative",
        )),
    }
}

impl InterpolationParams {
    /// Starts a builder from the default values.
    pub fn builder() -> InterpolationParamsBuilder {
        InterpolationParamsBuilder {
            params: Self::default(),
        }
    }

    /// Checks every value is in range.
    ///
    /// Called by the builder and again by the interpolation entry points, so
    /// hand-assembled or deserialized parameters are checked too.
    pub fn validate(&self) -> Result<()> {
        if self.num_neighbors == Some(0) {
            return Err(Error::invalid_parameter(
                "num_neighbors",
                0,
                "must be at least 1 (use None for every sample)",
            ));
        }
        non_negative("power", self.power)?;
        non_negative("smoothing", self.smoothing)?;
        non_negative("smoothing_radius", self.smoothing_radius)?;
        non_negative("cross_group_penalty", self.cross_group_penalty)?;

        if self.smoothing_method != SmoothingMethod::None && self.smoothing_radius == 0.0 {
            return Err(Error::invalid_parameter(
                "smoothing_radius",
                self.smoothing_radius,
                "must be positive when a smoothing method is selected",
            ));
        }
        if let BarrierMode::Penalize(factor) = self.barrier_mode {
            non_negative("barrier_mode", factor)?;
        }
        Ok(())
    }
}
