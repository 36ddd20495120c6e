/////////////////////////////////////////////////////////////////////////////////////////////
//
// Computes unsigned, grid-sampled and signed distance fields to a reference point set.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Distance fields to a reference point set.
//!
//! Every function builds one [`KdTree`] over the references and evaluates the
//! queries in parallel against it. Output order always matches query order.

use crate::error::{Error, Result};
use crate::kdtree::KdTree;
use serie_geo_utils::{create_evaluation_grid, Point, Serie};

/// Euclidean distance from each query point to its nearest reference point.
///
/// # Errors
/// [`Error::EmptyInput`] if either set is empty, [`Error::InvalidParameter`]
/// if any coordinate is not finite.
///
/// # Examples
/// ```
/// use serie_geo::distance_field;
/// use serie_geo_utils::{Point, Serie};
///
/// let refs = Serie::new(vec![Point::new([0.0, 0.0]), Point::new([4.0, 0.0])]);
/// let queries = Serie::new(vec![Point::new([1.0, 0.0]), Point::new([4.0, 3.0])]);
///
/// let d = distance_field(&queries, &refs).unwrap();
/// assert_eq!(d.as_slice(), &[1.0, 3.0]);
/// ```
pub fn distance_field<const N: usize>(
    queries: &Serie<Point<N>>,
    references: &Serie<Point<N>>,
) -> Result<Serie<f64>> {
    if queries.is_empty() {
        return Err(Error::EmptyInput("distance field queries"));
    }
    let tree = KdTree::from_points(references)?;

    queries.try_par_map(|q, _| tree.find_nearest(q).map(|n| n.distance()))
}

/// Distance field sampled on a regular grid.
///
/// The grid is the one produced by
/// [`create_evaluation_grid`](serie_geo_utils::create_evaluation_grid) with
/// the same `ranges` and `counts`, so the returned values line up with its
/// points (first dimension varies fastest).
///
/// # Errors
/// [`Error::InvalidParameter`] if any count is below two, plus the errors of
/// [`distance_field`].
pub fn distance_field_on_grid<const N: usize>(
    references: &Serie<Point<N>>,
    ranges: [(f64, f64); N],
    counts: [usize; N],
) -> Result<Serie<f64>> {
    if let Some(&c) = counts.iter().find(|&&c| c < 2) {
        return Err(Error::invalid_parameter(
            "counts",
            c,
            "every grid dimension needs at least two samples",
        ));
    }

    let grid = create_evaluation_grid(ranges, counts);
    tracing::debug!(num_cells = grid.count(), "evaluating grid distance field");
    distance_field(&grid, references)
}

/// Signed distance to an oriented reference set.
///
/// The magnitude is the unsigned distance to the nearest reference point `p`.
/// The sign is the sign of `dot(q - p, n)` where `n` is the normal attached to
/// `p`; points lying exactly on the tangent plane count as outside (positive).
///
/// # Errors
/// [`Error::SizeMismatch`] if `normals` and `references` differ in length,
/// plus the errors of [`distance_field`].
pub fn signed_distance_field<const N: usize>(
    queries: &Serie<Point<N>>,
    references: &Serie<Point<N>>,
    normals: &Serie<Point<N>>,
) -> Result<Serie<f64>> {
    if normals.count() != references.count() {
        return Err(Error::SizeMismatch {
            what: "reference normals",
            expected: references.count(),
            found: normals.count(),
        });
    }
    if queries.is_empty() {
        return Err(Error::EmptyInput("distance field queries"));
    }
    let tree = KdTree::new(references, normals)?;

    queries.try_par_map(|q, _| {
        let nearest = tree.find_nearest(q)?;
        let (index, normal) = (nearest.index, normals[nearest.index]);
        let side = (*q - references[index]).dot(&normal);
        let distance = nearest.distance();
        Ok(match side < 0.0 {
            true => -distance,
            false => distance,
        })
    })
}
