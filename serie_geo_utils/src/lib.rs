/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports the point primitive, Serie container, value traits and helper functions.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities for the [`serie_geo`] crate
//!
//! Fixed-dimension [`Point`]s, the [`Serie`] container, the [`FieldValue`]
//! abstraction over scalar and small-vector values, and a few helpers for
//! building point sets.
mod point;
mod serie;
mod traits;
mod utils;

pub use {
    point::{Point, Point2, Point3},
    serie::{Serie, SerieError},
    traits::{FieldValue, SerieItem},
    utils::{create_evaluation_grid, generate_random_points, random_points_with},
};
