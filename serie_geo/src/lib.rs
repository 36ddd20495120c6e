/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API and high-level documentation for spatial queries and field diffusion.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Spatial search, interpolation and diffusion over point series.
//!
//! All inputs and outputs are [`Serie`](serie_geo_utils::Serie) values from
//! [`serie_geo_utils`]: ordered sequences of points, scalars or small fixed-size
//! vectors, with results always returned in input order.
//!
//! The crate provides four building blocks:
//!
//! - **[`KdTree`]** - a balanced, implicitly stored KD-tree for nearest,
//!   k-nearest and radius queries in 2D or 3D.
//! - **Distance fields** - [`distance_field`], [`distance_field_on_grid`] and
//!   [`signed_distance_field`] to a reference point set.
//! - **IDW interpolation** - [`interpolate_field`] with KD-tree or brute-force
//!   neighbours, [`CurvedDiscontinuity`] barriers (e.g. faults), group weights
//!   and smoothing post-passes, plus the plain [`idw`] estimator.
//! - **Harmonic diffusion** - [`HarmonicDiffusion`] relaxes a scalar or vector
//!   field over a triangle [`Mesh`] under pinned (Dirichlet) vertex values.
//!
//! Built structures are immutable and can be queried from several threads at
//! once. Batch queries run in parallel on the rayon thread pool.
//!
//! Check out the examples directory in the repository for more examples of usage.
//!
//! # Examples
//!
//! ```
//! use serie_geo::{interpolate_field, CurvedDiscontinuity, InterpolationParams};
//! use serie_geo_utils::{Point2, Serie};
//!
//! // Two samples either side of a fault along x = 0
//! let samples = Serie::new(vec![Point2::new([-1.0, 0.0]), Point2::new([1.0, 0.0])]);
//! let values = Serie::new(vec![10.0, 20.0]);
//! let targets = Serie::new(vec![Point2::new([-0.5, 0.0]), Point2::new([0.5, 0.0])]);
//!
//! let fault = CurvedDiscontinuity::new(vec![
//!     Point2::new([0.0, -5.0]),
//!     Point2::new([0.0, 5.0]),
//! ])
//! .unwrap();
//!
//! let params = InterpolationParams::builder()
//!     .discontinuity(fault)
//!     .build()
//!     .unwrap();
//!
//! let result = interpolate_field(&targets, &samples, &values, None, &params).unwrap();
//!
//! // Each side only sees its own sample
//! assert!((result[0] - 10.0).abs() < 1e-12);
//! assert!((result[1] - 20.0).abs() < 1e-12);
//! ```
pub mod interpolant_config;

pub mod config;

pub mod progress;

mod error;

mod kdtree;

mod distance_field;

mod discontinuity;

mod interpolation;

mod mesh;

mod harmonic_diffusion;

pub use {
    config::{DiffusionParams, DiffusionParamsBuilder},
    discontinuity::{CurvedDiscontinuity, DEFAULT_NUM_SEGMENTS},
    distance_field::{distance_field, distance_field_on_grid, signed_distance_field},
    error::{Error, Result},
    harmonic_diffusion::{
        DiffusionOutcome, HarmonicDiffusion, Snapshot, SolverState, Termination,
    },
    interpolant_config::{
        BarrierMode, GroupInfo, InterpolationParams, InterpolationParamsBuilder,
        SmoothingMethod, ZeroWeightPolicy,
    },
    interpolation::{idw, interpolate_field, DEFAULT_IDW_SMOOTHING},
    kdtree::{KdTree, Neighbour},
    mesh::{generate_grid2d_mesh, Mesh, Mesh2D, Mesh3D},
};
