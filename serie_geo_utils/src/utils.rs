/////////////////////////////////////////////////////////////////////////////////////////////
//
// Supplies helpers for seeded random point generation and regular evaluation grids.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{point::Point, serie::Serie};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generate random points in the unit hypercube from an explicit seed.
///
/// The same seed always produces the same sequence of points, across runs
/// and platforms. There is no implicit global generator; callers that want
/// fresh randomness must supply their own seed.
///
/// # Examples
/// ```
/// use serie_geo_utils::generate_random_points;
///
/// let pts = generate_random_points::<3>(100, 42);
/// assert_eq!(pts.count(), 100);
/// assert!(pts.iter().all(|p| p.coords().iter().all(|c| (0.0..1.0).contains(c))));
/// ```
pub fn generate_random_points<const N: usize>(n: usize, seed: u64) -> Serie<Point<N>> {
    let mut rng = StdRng::seed_from_u64(seed);
    random_points_with(n, &mut rng)
}

/// Same as [`generate_random_points`] but draws from a caller-supplied generator.
pub fn random_points_with<const N: usize, R: Rng>(
    n: usize,
    rng: &mut R,
) -> Serie<Point<N>> {
    (0..n)
        .map(|_| Point::new(std::array::from_fn(|_| rng.random_range(0.0..1.0))))
        .collect()
}

/// Create a regular evaluation grid from per-dimension ranges and sample counts.
///
/// The first dimension varies fastest: the point at grid index
/// `(i, j[, k])` is stored at `i + j * counts[0] (+ k * counts[0] * counts[1])`.
/// A dimension with a count of one is placed at its range start.
///
/// # Arguments
/// * `ranges` - Inclusive `(min, max)` range for each dimension.
/// * `counts` - Number of grid samples per dimension.
///
/// # Examples
/// ```
/// use serie_geo_utils::create_evaluation_grid;
///
/// let grid = create_evaluation_grid([(0.0, 1.0), (0.0, 2.0)], [2, 3]);
/// assert_eq!(grid.count(), 6);
/// assert_eq!(grid[1].coords(), [1.0, 0.0]);
/// assert_eq!(grid[2].coords(), [0.0, 1.0]);
/// ```
pub fn create_evaluation_grid<const N: usize>(
    ranges: [(f64, f64); N],
    counts: [usize; N],
) -> Serie<Point<N>> {
    let total_points: usize = counts.iter().product();

    let mut strides = [1usize; N];
    for d in 1..N {
        strides[d] = strides[d - 1] * counts[d - 1];
    }

    (0..total_points)
        .map(|row_idx| {
            Point::new(std::array::from_fn(|d| {
                let (start, end) = ranges[d];
                let step = match counts[d] > 1 {
                    true => (end - start) / (counts[d] as f64 - 1.0),
                    false => 0.0,
                };
                let index_in_dim = (row_idx / strides[d]) % counts[d];
                start + step * index_in_dim as f64
            }))
        })
        .collect()
}
