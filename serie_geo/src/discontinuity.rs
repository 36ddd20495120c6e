/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements curved discontinuity barriers used to block interpolation across faults.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Curved discontinuity barriers.
//!
//! A [`CurvedDiscontinuity`] is a Catmull-Rom curve through an ordered list of
//! planar control points. For intersection tests the curve is replaced by a
//! polyline of `num_segments` straight pieces, sampled once at construction.
//! Barriers always live in the plane: 3D positions are tested through their
//! `(x, y)` projection.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serie_geo_utils::Point2;

/// Number of straight pieces used to approximate a curve when none is given.
pub const DEFAULT_NUM_SEGMENTS: usize = 50;

// Below this |cross product| two segments are treated as parallel.
const PARALLEL_TOLERANCE: f64 = 1e-10;

/// A curve across which interpolation contributions are blocked or penalised.
///
/// # Examples
/// ```
/// use serie_geo::CurvedDiscontinuity;
/// use serie_geo_utils::Point2;
///
/// let fault = CurvedDiscontinuity::new(vec![
///     Point2::new([0.0, -1.0]),
///     Point2::new([0.0, 1.0]),
/// ]).unwrap();
///
/// assert!(fault.intersects(&Point2::new([-1.0, 0.0]), &Point2::new([1.0, 0.0])));
/// assert!(!fault.intersects(&Point2::new([0.5, 0.0]), &Point2::new([1.0, 0.0])));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveDef", into = "CurveDef")]
pub struct CurvedDiscontinuity {
    control_points: Vec<Point2>,
    num_segments: usize,
    polyline: Vec<Point2>,
}

/// Serialized form: the polyline is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct CurveDef {
    control_points: Vec<Point2>,
    #[serde(default = "default_num_segments")]
    num_segments: usize,
}

fn default_num_segments() -> usize {
    DEFAULT_NUM_SEGMENTS
}

impl TryFrom<CurveDef> for CurvedDiscontinuity {
    type Error = Error;

    fn try_from(def: CurveDef) -> Result<Self> {
        Self::with_segments(def.control_points, def.num_segments)
    }
}

impl From<CurvedDiscontinuity> for CurveDef {
    fn from(curve: CurvedDiscontinuity) -> Self {
        CurveDef {
            control_points: curve.control_points,
            num_segments: curve.num_segments,
        }
    }
}

impl CurvedDiscontinuity {
    /// Creates a barrier through `control_points` using
    /// [`DEFAULT_NUM_SEGMENTS`] straight pieces.
    pub fn new(control_points: Vec<Point2>) -> Result<Self> {
        Self::with_segments(control_points, DEFAULT_NUM_SEGMENTS)
    }

    /// Creates a barrier through `control_points` approximated by
    /// `num_segments` straight pieces.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] for fewer than two control points,
    /// non-finite control points or zero segments.
    pub fn with_segments(control_points: Vec<Point2>, num_segments: usize) -> Result<Self> {
        if control_points.len() < 2 {
            return Err(Error::invalid_parameter(
                "control_points",
                control_points.len(),
                "a discontinuity needs at least two control points",
            ));
        }
        if control_points.iter().any(|p| !p.is_finite()) {
            return Err(Error::invalid_parameter(
                "control_points",
                format!("{control_points:?}"),
                "control points must be finite",
            ));
        }
        if num_segments == 0 {
            return Err(Error::invalid_parameter(
                "num_segments",
                num_segments,
                "must be at least 1",
            ));
        }

        let mut curve = Self {
            control_points,
            num_segments,
            polyline: Vec::new(),
        };
        curve.polyline = (0..=num_segments)
            .map(|i| curve.evaluate(i as f64 / num_segments as f64))
            .collect();
        Ok(curve)
    }

    pub fn control_points(&self) -> &[Point2] {
        &self.control_points
    }

    pub fn num_segments(&self) -> usize {
        self.num_segments
    }

    /// The `num_segments + 1` curve samples used by [`CurvedDiscontinuity::intersects`].
    pub fn polyline(&self) -> &[Point2] {
        &self.polyline
    }

    /// Evaluates the Catmull-Rom curve at `t`, clamped to `[0, 1]`.
    ///
    /// `t` is spread uniformly over the control-point spans. The curve passes
    /// through every control point; end spans reuse the end point as their
    /// missing outer neighbour.
    pub fn evaluate(&self, t: f64) -> Point2 {
        let cp = &self.control_points;
        let last_span = cp.len() - 2;

        let scaled = t.clamp(0.0, 1.0) * (cp.len() - 1) as f64;
        let i = (scaled as usize).min(last_span);
        let s = scaled - i as f64;

        let p0 = cp[i.saturating_sub(1)];
        let p1 = cp[i];
        let p2 = cp[i + 1];
        let p3 = match i < last_span {
            true => cp[i + 2],
            false => p2,
        };

        let s2 = s * s;
        let s3 = s2 * s;
        let a = p1 * 2.0;
        let b = (p2 - p0) * s;
        let c = (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * s2;
        let d = (p1 * 3.0 - p0 - p2 * 3.0 + p3) * s3;
        (a + b + c + d) * 0.5
    }

    /// True when the segment `p1`-`p2` crosses any piece of the polyline.
    ///
    /// Touching an end point counts as crossing; parallel pieces never cross.
    pub fn intersects(&self, p1: &Point2, p2: &Point2) -> bool {
        self.polyline
            .windows(2)
            .any(|piece| segments_intersect(&piece[0], &piece[1], p1, p2))
    }
}

/// Closed segment intersection test between `a`-`b` and `p1`-`p2`.
fn segments_intersect(a: &Point2, b: &Point2, p1: &Point2, p2: &Point2) -> bool {
    let r = *b - *a;
    let s = *p2 - *p1;
    let denom = r.perp_dot(&s);
    if denom.abs() < PARALLEL_TOLERANCE {
        return false;
    }

    let w = *a - *p1;
    let t = s.perp_dot(&w) / denom;
    let u = r.perp_dot(&w) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// True when the straight path between two points crosses any barrier.
pub(crate) fn crosses_any(barriers: &[CurvedDiscontinuity], from: &Point2, to: &Point2) -> bool {
    barriers.iter().any(|b| b.intersects(from, to))
}
