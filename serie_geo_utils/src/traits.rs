/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares traits describing Serie items and the scalar/vector values carried by fields.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::point::Point;
use std::fmt::Debug;

/// An element type with a fixed number of numeric components.
pub trait SerieItem {
    /// Number of components stored per item.
    const ITEM_SIZE: usize;
}

impl SerieItem for f64 {
    const ITEM_SIZE: usize = 1;
}

impl SerieItem for usize {
    const ITEM_SIZE: usize = 1;
}

impl<const M: usize> SerieItem for [f64; M] {
    const ITEM_SIZE: usize = M;
}

impl<const M: usize> SerieItem for [usize; M] {
    const ITEM_SIZE: usize = M;
}

impl<const N: usize> SerieItem for Point<N> {
    const ITEM_SIZE: usize = N;
}

/// A value attached to a sample or mesh vertex: either a scalar or a
/// small fixed-size vector whose components are processed independently.
pub trait FieldValue: SerieItem + Copy + Debug + PartialEq + Send + Sync + 'static {
    /// The additive identity.
    fn zero() -> Self;

    fn component(&self, i: usize) -> f64;

    fn component_mut(&mut self, i: usize) -> &mut f64;

    /// Every component set to NaN.
    fn nan() -> Self {
        let mut v = Self::zero();
        for i in 0..Self::ITEM_SIZE {
            *v.component_mut(i) = f64::NAN;
        }
        v
    }

    /// `self += weight * other`, component-wise.
    #[inline]
    fn add_scaled(&mut self, other: &Self, weight: f64) {
        for i in 0..Self::ITEM_SIZE {
            *self.component_mut(i) += weight * other.component(i);
        }
    }

    /// Returns `self * factor`, component-wise.
    #[inline]
    fn scaled(&self, factor: f64) -> Self {
        let mut out = *self;
        for i in 0..Self::ITEM_SIZE {
            *out.component_mut(i) *= factor;
        }
        out
    }

    /// Largest absolute component difference between two values.
    #[inline]
    fn max_abs_diff(&self, other: &Self) -> f64 {
        (0..Self::ITEM_SIZE)
            .map(|i| (self.component(i) - other.component(i)).abs())
            .fold(0.0, f64::max)
    }
}

impl FieldValue for f64 {
    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn component(&self, _i: usize) -> f64 {
        *self
    }

    #[inline]
    fn component_mut(&mut self, _i: usize) -> &mut f64 {
        self
    }
}

impl<const M: usize> FieldValue for [f64; M] {
    #[inline]
    fn zero() -> Self {
        [0.0; M]
    }

    #[inline]
    fn component(&self, i: usize) -> f64 {
        self[i]
    }

    #[inline]
    fn component_mut(&mut self, i: usize) -> &mut f64 {
        &mut self[i]
    }
}
