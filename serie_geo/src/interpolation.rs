/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements inverse-distance-weighted interpolation with barriers, groups and smoothing.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Inverse-distance-weighted (IDW) interpolation of scattered samples.
//!
//! [`interpolate_field`] is the full engine: KD-tree or brute-force neighbour
//! selection, curved barriers, group weighting and an optional smoothing
//! post-pass. [`idw`] is the plain brute-force estimator.
//!
//! Targets are independent of each other and are evaluated in parallel.

use crate::discontinuity::{crosses_any, CurvedDiscontinuity};
use crate::error::{Error, Result};
use crate::interpolant_config::{
    BarrierMode, GroupInfo, InterpolationParams, SmoothingMethod, ZeroWeightPolicy,
};
use crate::kdtree::{KdTree, Neighbour};
use serie_geo_utils::{FieldValue, Point, Serie};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Coincidence tolerance used by [`idw`] when the caller has no better value.
pub const DEFAULT_IDW_SMOOTHING: f64 = 1e-10;

/// Where the neighbours of a target come from.
enum Candidates<'a, const N: usize> {
    /// Every sample is a candidate.
    All(&'a Serie<Point<N>>),

    /// Over-fetch `fetch` nearest samples and keep the first `keep` valid ones.
    Nearest {
        tree: KdTree<N>,
        fetch: usize,
        keep: usize,
    },
}

impl<const N: usize> Candidates<'_, N> {
    /// Candidates of `q` in ascending distance order.
    fn collect(&self, q: &Point<N>) -> Result<Vec<Neighbour>> {
        match self {
            Candidates::All(samples) => {
                let mut all: Vec<Neighbour> = samples
                    .iter()
                    .enumerate()
                    .map(|(index, s)| Neighbour {
                        index,
                        distance_sq: s.distance_squared(q),
                    })
                    .collect();
                all.sort_by(|a, b| {
                    a.distance_sq
                        .total_cmp(&b.distance_sq)
                        .then(a.index.cmp(&b.index))
                });
                Ok(all)
            }
            Candidates::Nearest { tree, fetch, .. } => tree.find_k_nearest(q, *fetch),
        }
    }

    fn keep(&self) -> usize {
        match self {
            Candidates::All(samples) => samples.count(),
            Candidates::Nearest { keep, .. } => *keep,
        }
    }

    /// Lowest sample index with `|q - s|² <= tolerance`.
    fn coincident(&self, q: &Point<N>, tolerance: f64) -> Option<usize> {
        match self {
            Candidates::All(samples) => samples
                .iter()
                .position(|s| s.distance_squared(q) <= tolerance),
            Candidates::Nearest { tree, .. } => {
                // Slightly inflated so rounding in sqrt cannot drop a boundary sample
                let radius = tolerance.sqrt() * (1.0 + 4.0 * f64::EPSILON);
                tree.find_in_radius(q, radius).into_iter().find(|&i| {
                    tree.squared_distance(i, q)
                        .is_ok_and(|d2| d2 <= tolerance)
                })
            }
        }
    }
}

/// Group most represented among the candidates; ties go to the group of the
/// nearest candidate among the tied groups.
fn target_group(candidates: &[Neighbour], groups: &Serie<GroupInfo>) -> Option<usize> {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for c in candidates {
        *counts.entry(groups[c.index].group_id).or_default() += 1;
    }
    let max_count = counts.values().copied().max()?;

    candidates
        .iter()
        .map(|c| groups[c.index].group_id)
        .find(|g| counts.get(g) == Some(&max_count))
}

/// Interpolates `values` known at `samples` onto every target point.
///
/// # Arguments
/// * `targets` - Query positions.
/// * `samples` - Sample positions.
/// * `values` - One value per sample, scalar or fixed-size vector.
/// * `groups` - Optional group membership per sample. Required when
///   `params.respect_groups` is set.
/// * `params` - See [`InterpolationParams`].
///
/// # Per target
/// 1. A sample within `smoothing` squared distance of the target returns its
///    value directly (lowest sample index wins).
/// 2. Otherwise candidates excluded by a barrier are dropped and the nearest
///    remaining ones (up to `num_neighbors`) are kept. The target's group is
///    the majority group among these kept candidates.
/// 3. The kept candidates are weighted in proportion to
///    `1 / (d + smoothing)^power` and adjusted for barrier penalties and groups.
/// 4. If no weight is left, `params.zero_weight_policy` decides the result.
///
/// The smoothing post-pass then runs over the interpolated targets.
///
/// # Errors
/// - [`Error::EmptyInput`] for empty targets or samples.
/// - [`Error::SizeMismatch`] when `values` or `groups` do not match `samples`.
/// - [`Error::InvalidParameter`] for invalid parameters, non-finite
///   positions, or groups requested but not supplied.
/// - [`Error::NoContributingSamples`] under [`ZeroWeightPolicy::Error`].
///
/// # Examples
/// ```
/// use serie_geo::{interpolate_field, InterpolationParams};
/// use serie_geo_utils::{Point, Serie};
///
/// let samples = Serie::new(vec![Point::new([0.0, 0.0]), Point::new([10.0, 0.0])]);
/// let values = Serie::new(vec![10.0, 20.0]);
/// let targets = Serie::new(vec![Point::new([5.0, 0.0])]);
///
/// let params = InterpolationParams::builder().power(1.0).build().unwrap();
/// let result = interpolate_field(&targets, &samples, &values, None, &params).unwrap();
/// assert!((result[0] - 15.0).abs() < 1e-12);
/// ```
pub fn interpolate_field<const N: usize, V: FieldValue>(
    targets: &Serie<Point<N>>,
    samples: &Serie<Point<N>>,
    values: &Serie<V>,
    groups: Option<&Serie<GroupInfo>>,
    params: &InterpolationParams,
) -> Result<Serie<V>> {
    params.validate()?;
    if targets.is_empty() {
        return Err(Error::EmptyInput("interpolation targets"));
    }
    if samples.is_empty() {
        return Err(Error::EmptyInput("interpolation samples"));
    }
    if values.count() != samples.count() {
        return Err(Error::SizeMismatch {
            what: "sample values",
            expected: samples.count(),
            found: values.count(),
        });
    }
    if let Some(groups) = groups {
        if groups.count() != samples.count() {
            return Err(Error::SizeMismatch {
                what: "sample groups",
                expected: samples.count(),
                found: groups.count(),
            });
        }
    }
    if params.respect_groups && groups.is_none() {
        return Err(Error::invalid_parameter(
            "respect_groups",
            true,
            "group information must be supplied",
        ));
    }
    if !params.discontinuities.is_empty() && N < 2 {
        return Err(Error::invalid_parameter(
            "discontinuities",
            params.discontinuities.len(),
            "barriers need at least two dimensions",
        ));
    }
    if let Some(i) = targets.iter().position(|t| !t.is_finite()) {
        return Err(Error::invalid_parameter(
            "targets",
            format!("{:?} at index {}", targets[i].coords(), i),
            "coordinates must be finite",
        ));
    }

    let candidates = match params.num_neighbors {
        None => {
            if let Some(i) = samples.iter().position(|s| !s.is_finite()) {
                return Err(Error::invalid_parameter(
                    "samples",
                    format!("{:?} at index {}", samples[i].coords(), i),
                    "coordinates must be finite",
                ));
            }
            Candidates::All(samples)
        }
        Some(k) => Candidates::Nearest {
            tree: KdTree::from_points(samples)?,
            fetch: (2 * k).min(samples.count()),
            keep: k,
        },
    };

    let group_info = match params.respect_groups {
        true => groups,
        false => None,
    };

    tracing::debug!(
        num_targets = targets.count(),
        num_samples = samples.count(),
        num_barriers = params.discontinuities.len(),
        "interpolating field"
    );

    let fallbacks = AtomicUsize::new(0);
    let interpolated = targets.try_par_map(|q, target| {
        interpolate_one(
            q,
            target,
            samples,
            values,
            group_info,
            &candidates,
            params,
            &fallbacks,
        )
    })?;

    let fallbacks = fallbacks.into_inner();
    if fallbacks > 0 {
        tracing::warn!(
            fallbacks,
            policy = ?params.zero_weight_policy,
            "targets had no contributing samples"
        );
    }

    match params.smoothing_method {
        SmoothingMethod::None => Ok(interpolated),
        _ => smooth_field(targets, interpolated, params),
    }
}

#[allow(clippy::too_many_arguments)]
fn interpolate_one<const N: usize, V: FieldValue>(
    q: &Point<N>,
    target: usize,
    samples: &Serie<Point<N>>,
    values: &Serie<V>,
    groups: Option<&Serie<GroupInfo>>,
    candidates: &Candidates<'_, N>,
    params: &InterpolationParams,
    fallbacks: &AtomicUsize,
) -> Result<V> {
    if let Some(i) = candidates.coincident(q, params.smoothing) {
        return Ok(values[i]);
    }

    let near = candidates.collect(q)?;

    // First `keep` candidates not excluded by a barrier, with their barrier factor
    let mut contributing: Vec<(Neighbour, f64)> = Vec::with_capacity(candidates.keep().min(near.len()));
    for candidate in &near {
        if contributing.len() >= candidates.keep() {
            break;
        }

        let mut factor = 1.0;
        if !params.discontinuities.is_empty()
            && crosses_any(&params.discontinuities, &q.xy(), &samples[candidate.index].xy())
        {
            match params.barrier_mode {
                BarrierMode::Exclude => continue,
                BarrierMode::Penalize(penalty) => factor = penalty,
            }
        }
        contributing.push((*candidate, factor));
    }

    let home_group = groups.and_then(|g| {
        let visible: Vec<Neighbour> = contributing.iter().map(|&(c, _)| c).collect();
        target_group(&visible, g)
    });

    // Weights are taken relative to the nearest contributor, which keeps them
    // in (0, 1] whatever the distance scale and power.
    let reference = contributing
        .first()
        .map(|(c, _)| c.distance() + params.smoothing)
        .unwrap_or(1.0);

    let mut sum = V::zero();
    let mut weight_sum = 0.0;

    for &(candidate, factor) in &contributing {
        let mut weight =
            (reference / (candidate.distance() + params.smoothing)).powf(params.power) * factor;

        if let Some(groups) = groups {
            let info = &groups[candidate.index];
            weight *= info.weight;
            if Some(info.group_id) != home_group {
                weight *= params.cross_group_penalty;
            }
        }

        sum.add_scaled(&values[candidate.index], weight);
        weight_sum += weight;
    }

    if weight_sum > 0.0 && weight_sum.is_finite() {
        return Ok(sum.scaled(1.0 / weight_sum));
    }

    fallbacks.fetch_add(1, Ordering::Relaxed);
    match params.zero_weight_policy {
        ZeroWeightPolicy::NearestSample => Ok(values[near[0].index]),
        ZeroWeightPolicy::NaN => Ok(V::nan()),
        ZeroWeightPolicy::Error => Err(Error::NoContributingSamples { target }),
    }
}

/// Runs the smoothing post-pass `smoothing_iterations` times. Each pass
/// reads the output of the previous one.
fn smooth_field<const N: usize, V: FieldValue>(
    targets: &Serie<Point<N>>,
    field: Serie<V>,
    params: &InterpolationParams,
) -> Result<Serie<V>> {
    let tree = KdTree::from_points(targets)?;
    let radius = params.smoothing_radius;

    let mut current = field;
    for _ in 0..params.smoothing_iterations {
        let previous = current;
        current = targets.par_map(|q, i| {
            let neighbours: Vec<usize> = tree
                .find_in_radius(q, radius)
                .into_iter()
                .filter(|&j| {
                    params.discontinuities.is_empty()
                        || !crosses_any(&params.discontinuities, &q.xy(), &targets[j].xy())
                })
                .collect();

            if neighbours.is_empty() {
                return previous[i];
            }

            match params.smoothing_method {
                SmoothingMethod::Gaussian => {
                    let two_r2 = 2.0 * radius * radius;
                    weighted_mean(neighbours.iter().map(|&j| {
                        (previous[j], (-targets[j].distance_squared(q) / two_r2).exp())
                    }))
                    .unwrap_or(previous[i])
                }
                SmoothingMethod::Mean => {
                    weighted_mean(neighbours.iter().map(|&j| (previous[j], 1.0)))
                        .unwrap_or(previous[i])
                }
                SmoothingMethod::Median => component_median(&neighbours, &previous),
                SmoothingMethod::None => previous[i],
            }
        });
    }

    Ok(current)
}

fn weighted_mean<V: FieldValue>(items: impl Iterator<Item = (V, f64)>) -> Option<V> {
    let mut sum = V::zero();
    let mut weight_sum = 0.0;
    for (value, weight) in items {
        sum.add_scaled(&value, weight);
        weight_sum += weight;
    }
    match weight_sum > 0.0 {
        true => Some(sum.scaled(1.0 / weight_sum)),
        false => None,
    }
}

/// Per-component median; even counts average the two middle values.
fn component_median<V: FieldValue>(indices: &[usize], field: &Serie<V>) -> V {
    let mut out = V::zero();
    let mut buffer: Vec<f64> = Vec::with_capacity(indices.len());
    for c in 0..V::ITEM_SIZE {
        buffer.clear();
        buffer.extend(indices.iter().map(|&j| field[j].component(c)));
        buffer.sort_by(f64::total_cmp);

        let mid = buffer.len() / 2;
        *out.component_mut(c) = match buffer.len() % 2 {
            1 => buffer[mid],
            _ => 0.5 * (buffer[mid - 1] + buffer[mid]),
        };
    }
    out
}

/// Plain brute-force inverse-distance weighting.
///
/// For each target, the first sample (in input order) with
/// `|q - s|² < smoothing`, or exactly at `q`, returns its value. Otherwise
/// every sample contributes with weight `1 / sqrt(|q - s|² + smoothing)^power`.
///
/// # Errors
/// [`Error::SizeMismatch`] when `values` does not match `samples`,
/// [`Error::EmptyInput`] for empty samples and [`Error::InvalidParameter`]
/// for a negative or non-finite `power` or `smoothing`.
pub fn idw<const N: usize, V: FieldValue>(
    samples: &Serie<Point<N>>,
    values: &Serie<V>,
    targets: &Serie<Point<N>>,
    power: f64,
    smoothing: f64,
) -> Result<Serie<V>> {
    if values.count() != samples.count() {
        return Err(Error::SizeMismatch {
            what: "sample values",
            expected: samples.count(),
            found: values.count(),
        });
    }
    if samples.is_empty() {
        return Err(Error::EmptyInput("interpolation samples"));
    }
    for (name, value) in [("power", power), ("smoothing", smoothing)] {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::invalid_parameter(
                name,
                value,
                "must be finite and non-negative",
            ));
        }
    }

    Ok(targets.par_map(|q, _| {
        let exact = samples.iter().position(|s| {
            let d2 = s.distance_squared(q);
            d2 < smoothing || d2 == 0.0
        });
        if let Some(j) = exact {
            return values[j];
        }

        // Scaled by the nearest distance so the weights cannot all overflow
        let nearest = samples
            .iter()
            .map(|s| (s.distance_squared(q) + smoothing).sqrt())
            .fold(f64::INFINITY, f64::min);

        let mut sum = V::zero();
        let mut weight_sum = 0.0;
        for (s, v) in samples.iter().zip(values.iter()) {
            let weight = (nearest / (s.distance_squared(q) + smoothing).sqrt()).powf(power);
            sum.add_scaled(v, weight);
            weight_sum += weight;
        }
        sum.scaled(1.0 / weight_sum)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use serie_geo_utils::{generate_random_points, Point2, Point3};

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new([x, y])
    }

    fn vertical_fault(x: f64) -> CurvedDiscontinuity {
        CurvedDiscontinuity::new(vec![p(x, -100.0), p(x, 100.0)]).unwrap()
    }

    #[test]
    fn midpoint_of_two_samples_averages() {
        let samples = Serie::new(vec![p(0.0, 0.0), p(10.0, 0.0)]);
        let values = Serie::new(vec![10.0, 20.0]);
        let targets = Serie::new(vec![p(5.0, 0.0)]);

        for num_neighbors in [None, Some(1), Some(4)] {
            let params = InterpolationParams::builder()
                .power(1.0)
                .num_neighbors(num_neighbors)
                .build()
                .unwrap();
            let result = interpolate_field(&targets, &samples, &values, None, &params).unwrap();
            match num_neighbors {
                // Only the nearest sample (lowest index on ties) contributes
                Some(1) => assert_eq!(result[0], 10.0),
                _ => assert_abs_diff_eq!(result[0], 15.0, epsilon = 1e-12),
            }
        }
    }

    #[test]
    fn coincident_targets_return_sample_values() {
        let samples = generate_random_points::<3>(60, 9);
        let values: Serie<f64> = samples.map(|s, i| s[0] * 3.0 - s[2] + i as f64);

        for num_neighbors in [None, Some(6)] {
            let params = InterpolationParams::builder()
                .num_neighbors(num_neighbors)
                .build()
                .unwrap();
            let result = interpolate_field(&samples, &samples, &values, None, &params).unwrap();
            assert_eq!(result, values);
        }
    }

    #[test]
    fn coincidence_tolerance_uses_lowest_index() {
        let samples = Serie::new(vec![p(1.0, 0.0), p(0.0, 0.05), p(0.0, 0.0)]);
        let values = Serie::new(vec![1.0, 2.0, 3.0]);
        let targets = Serie::new(vec![p(0.0, 0.0)]);

        for num_neighbors in [None, Some(2)] {
            let params = InterpolationParams::builder()
                .num_neighbors(num_neighbors)
                .smoothing(0.01)
                .build()
                .unwrap();
            let result = interpolate_field(&targets, &samples, &values, None, &params).unwrap();
            assert_eq!(result[0], 2.0);
        }
    }

    #[test]
    fn result_is_bounded_by_sample_values() {
        let mut rng = StdRng::seed_from_u64(17);
        let samples = generate_random_points::<2>(80, 3);
        let values: Serie<f64> = (0..80).map(|_| rng.random_range(-5.0..5.0)).collect();
        let targets = generate_random_points::<2>(200, 4);
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        for num_neighbors in [None, Some(8)] {
            let params = InterpolationParams::builder()
                .num_neighbors(num_neighbors)
                .power(2.5)
                .build()
                .unwrap();
            let result = interpolate_field(&targets, &samples, &values, None, &params).unwrap();
            assert!(result.iter().all(|&v| v >= lo - 1e-12 && v <= hi + 1e-12));
        }
    }

    #[test]
    fn nearest_mode_matches_bruteforce_with_all_neighbours() {
        let samples = generate_random_points::<3>(30, 5);
        let values: Serie<[f64; 2]> = samples.map(|s, _| [s[0] + s[1], s[2] * 2.0]);
        let targets = generate_random_points::<3>(40, 6);

        let brute = InterpolationParams::builder().num_neighbors(None).build().unwrap();
        let knn = InterpolationParams::builder().num_neighbors(Some(30)).build().unwrap();

        let a = interpolate_field(&targets, &samples, &values, None, &brute).unwrap();
        let b = interpolate_field(&targets, &samples, &values, None, &knn).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(x[0], y[0], epsilon = 1e-12);
            assert_abs_diff_eq!(x[1], y[1], epsilon = 1e-12);
        }
    }

    #[test]
    fn barrier_excludes_samples_on_the_far_side() {
        let samples = Serie::new(vec![p(-1.0, 0.0), p(-2.0, 1.0), p(1.0, 0.0), p(2.0, -1.0)]);
        let values = Serie::new(vec![1.0, 1.0, 100.0, 100.0]);
        let targets = Serie::new(vec![p(-0.5, 0.0), p(0.5, 0.0)]);

        let params = InterpolationParams::builder()
            .discontinuity(vertical_fault(0.0))
            .build()
            .unwrap();
        let result = interpolate_field(&targets, &samples, &values, None, &params).unwrap();
        assert_abs_diff_eq!(result[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result[1], 100.0, epsilon = 1e-12);

        let open = InterpolationParams::default();
        let blended = interpolate_field(&targets, &samples, &values, None, &open).unwrap();
        assert!(blended[0] > 1.0 && blended[1] < 100.0);
    }

    #[test]
    fn penalised_barrier_reduces_far_side_influence() {
        let samples = Serie::new(vec![p(-1.0, 0.0), p(1.0, 0.0)]);
        let values = Serie::new(vec![0.0, 10.0]);
        let targets = Serie::new(vec![p(-0.2, 0.0)]);

        let run = |mode| {
            let params = InterpolationParams::builder()
                .power(1.0)
                .discontinuity(vertical_fault(0.0))
                .barrier_mode(mode)
                .build()
                .unwrap();
            interpolate_field(&targets, &samples, &values, None, &params).unwrap()[0]
        };

        let full = run(BarrierMode::Penalize(1.0));
        let damped = run(BarrierMode::Penalize(0.1));
        let excluded = run(BarrierMode::Exclude);

        // Weights 1/0.8 and 1/1.2
        assert_abs_diff_eq!(full, 10.0 * (1.0 / 1.2) / (1.0 / 0.8 + 1.0 / 1.2), epsilon = 1e-12);
        assert!(damped < full && damped > excluded);
        assert_eq!(excluded, 0.0);
    }

    #[test]
    fn zero_weight_policies() {
        let samples = Serie::new(vec![p(1.0, 0.0), p(2.0, 0.0)]);
        let values = Serie::new(vec![5.0, 7.0]);
        let targets = Serie::new(vec![p(-1.0, 0.0)]);

        let with_policy = |policy| {
            InterpolationParams::builder()
                .discontinuity(vertical_fault(0.0))
                .zero_weight_policy(policy)
                .build()
                .unwrap()
        };

        let nearest = interpolate_field(
            &targets,
            &samples,
            &values,
            None,
            &with_policy(ZeroWeightPolicy::NearestSample),
        )
        .unwrap();
        assert_eq!(nearest[0], 5.0);

        let nan = interpolate_field(&targets, &samples, &values, None, &with_policy(ZeroWeightPolicy::NaN))
            .unwrap();
        assert!(nan[0].is_nan());

        let err = interpolate_field(
            &targets,
            &samples,
            &values,
            None,
            &with_policy(ZeroWeightPolicy::Error),
        );
        assert_eq!(err, Err(Error::NoContributingSamples { target: 0 }));
    }

    #[test]
    fn over_fetching_survives_barrier_filtering() {
        // The two nearest samples are behind the fault, the next two are not
        let samples = Serie::new(vec![p(0.6, 0.0), p(0.6, 0.1), p(-1.0, 0.0), p(-1.0, 0.1)]);
        let values = Serie::new(vec![50.0, 50.0, 2.0, 2.0]);
        let targets = Serie::new(vec![p(0.0, 0.0)]);

        let params = InterpolationParams::builder()
            .num_neighbors(Some(2))
            .discontinuity(vertical_fault(0.5))
            .build()
            .unwrap();
        let result = interpolate_field(&targets, &samples, &values, None, &params).unwrap();
        assert_abs_diff_eq!(result[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn home_group_ignores_samples_hidden_by_a_barrier() {
        // One visible group 1 sample, three nearer group 2 samples behind the fault
        let samples = Serie::new(vec![p(-2.0, 0.0), p(0.6, 0.0), p(0.6, 0.1), p(0.6, -0.1)]);
        let values = Serie::new(vec![1.0, 99.0, 99.0, 99.0]);
        let groups = Serie::new(vec![
            GroupInfo::new(1, 1.0),
            GroupInfo::new(2, 1.0),
            GroupInfo::new(2, 1.0),
            GroupInfo::new(2, 1.0),
        ]);
        let targets = Serie::new(vec![p(0.0, 0.0)]);

        for policy in [ZeroWeightPolicy::NearestSample, ZeroWeightPolicy::Error] {
            let params = InterpolationParams::builder()
                .num_neighbors(Some(2))
                .discontinuity(vertical_fault(0.5))
                .respect_groups(true)
                .cross_group_penalty(0.0)
                .zero_weight_policy(policy)
                .build()
                .unwrap();
            let result = interpolate_field(&targets, &samples, &values, Some(&groups), &params).unwrap();
            assert_eq!(result[0], 1.0);
        }
    }

    #[test]
    fn home_group_is_voted_by_the_kept_neighbours_only() {
        // Four candidates are fetched for k = 2; group 2 only wins if all four vote
        let samples = Serie::new(vec![p(1.0, 0.0), p(0.0, 1.2), p(-1.4, 0.0), p(0.0, -1.6)]);
        let values = Serie::new(vec![10.0, 20.0, 20.0, 20.0]);
        let groups = Serie::new(vec![
            GroupInfo::new(1, 1.0),
            GroupInfo::new(2, 1.0),
            GroupInfo::new(2, 1.0),
            GroupInfo::new(2, 1.0),
        ]);
        let targets = Serie::new(vec![p(0.0, 0.0)]);

        let params = InterpolationParams::builder()
            .num_neighbors(Some(2))
            .respect_groups(true)
            .cross_group_penalty(0.0)
            .build()
            .unwrap();
        let result = interpolate_field(&targets, &samples, &values, Some(&groups), &params).unwrap();
        assert_eq!(result[0], 10.0);
    }

    #[test]
    fn large_distances_and_powers_keep_their_weights() {
        let targets = Serie::new(vec![p(0.0, 0.0)]);
        let values = Serie::new(vec![4.0, 8.0]);
        let params = InterpolationParams::builder()
            .power(200.0)
            .zero_weight_policy(ZeroWeightPolicy::Error)
            .build()
            .unwrap();

        // (1e3)^200 overflows, the relative weights do not
        let balanced = Serie::new(vec![p(1.0e3, 0.0), p(-1.0e3, 0.0)]);
        let result = interpolate_field(&targets, &balanced, &values, None, &params).unwrap();
        assert_abs_diff_eq!(result[0], 6.0, epsilon = 1e-12);
        let plain = idw(&balanced, &values, &targets, 200.0, 0.0).unwrap();
        assert_abs_diff_eq!(plain[0], 6.0, epsilon = 1e-12);

        let skewed = Serie::new(vec![p(1.0e3, 0.0), p(-2.0e3, 0.0)]);
        let result = interpolate_field(&targets, &skewed, &values, None, &params).unwrap();
        assert_abs_diff_eq!(result[0], 4.0, epsilon = 1e-12);
        let plain = idw(&skewed, &values, &targets, 200.0, 0.0).unwrap();
        assert_abs_diff_eq!(plain[0], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn groups_weight_and_penalise_samples() {
        let samples = Serie::new(vec![p(-1.0, 0.0), p(-1.0, 0.5), p(1.0, 0.0)]);
        let values = Serie::new(vec![0.0, 0.0, 10.0]);
        let targets = Serie::new(vec![p(0.0, 0.0)]);
        let groups = Serie::new(vec![GroupInfo::new(1, 1.0), GroupInfo::new(1, 1.0), GroupInfo::new(2, 1.0)]);

        let base = InterpolationParams::builder().num_neighbors(None).power(1.0);

        let ignored = interpolate_field(
            &targets,
            &samples,
            &values,
            Some(&groups),
            &base.clone().build().unwrap(),
        )
        .unwrap();
        let neutral = interpolate_field(
            &targets,
            &samples,
            &values,
            Some(&groups),
            &base.clone().respect_groups(true).build().unwrap(),
        )
        .unwrap();
        assert_abs_diff_eq!(ignored[0], neutral[0], epsilon = 1e-12);

        // Group 1 is the majority, so the lone group 2 sample is penalised away
        let isolated = interpolate_field(
            &targets,
            &samples,
            &values,
            Some(&groups),
            &base.clone().respect_groups(true).cross_group_penalty(0.0).build().unwrap(),
        )
        .unwrap();
        assert_eq!(isolated[0], 0.0);

        // A heavy group weight pulls the result toward that sample
        let heavy = Serie::new(vec![GroupInfo::new(1, 1.0), GroupInfo::new(1, 1.0), GroupInfo::new(2, 100.0)]);
        let pulled = interpolate_field(
            &targets,
            &samples,
            &values,
            Some(&heavy),
            &base.respect_groups(true).build().unwrap(),
        )
        .unwrap();
        assert!(pulled[0] > neutral[0]);
    }

    #[test]
    fn majority_ties_go_to_the_nearest_group() {
        let near = [
            Neighbour { index: 2, distance_sq: 0.5 },
            Neighbour { index: 0, distance_sq: 1.0 },
            Neighbour { index: 1, distance_sq: 2.0 },
            Neighbour { index: 3, distance_sq: 3.0 },
        ];
        let groups = Serie::new(vec![
            GroupInfo::new(7, 1.0),
            GroupInfo::new(7, 1.0),
            GroupInfo::new(3, 1.0),
            GroupInfo::new(3, 1.0),
        ]);
        assert_eq!(target_group(&near, &groups), Some(3));
        assert_eq!(target_group(&near[1..], &groups), Some(7));
        assert_eq!(target_group(&[], &groups), None);
    }

    #[test]
    fn smoothing_methods_flatten_a_spike() {
        let targets: Serie<Point2> = (0..5).map(|i| p(i as f64, 0.0)).collect();
        let samples = targets.clone();
        let values = Serie::new(vec![0.0, 0.0, 9.0, 0.0, 0.0]);

        let smooth = |method| {
            let params = InterpolationParams::builder()
                .smoothing_method(method)
                .smoothing_radius(1.0)
                .build()
                .unwrap();
            interpolate_field(&targets, &samples, &values, None, &params).unwrap()
        };

        let mean = smooth(SmoothingMethod::Mean);
        assert_abs_diff_eq!(mean[2], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mean[1], 3.0, epsilon = 1e-12);
        assert_eq!(mean[0], 0.0);

        let median = smooth(SmoothingMethod::Median);
        assert_eq!(median.as_slice(), &[0.0; 5]);

        let gaussian = smooth(SmoothingMethod::Gaussian);
        let w = (-0.5f64).exp();
        assert_abs_diff_eq!(gaussian[2], 9.0 / (1.0 + 2.0 * w), epsilon = 1e-12);
        assert!(gaussian[2] < 9.0 && gaussian[1] > 0.0);

        let none = smooth(SmoothingMethod::None);
        assert_eq!(none, values);
    }

    #[test]
    fn repeated_smoothing_reads_previous_pass() {
        let targets: Serie<Point2> = (0..5).map(|i| p(i as f64, 0.0)).collect();
        let values = Serie::new(vec![0.0, 0.0, 9.0, 0.0, 0.0]);
        let params = InterpolationParams::builder()
            .smoothing_method(SmoothingMethod::Mean)
            .smoothing_radius(1.0)
            .smoothing_iterations(2)
            .build()
            .unwrap();

        let result = interpolate_field(&targets, &targets, &values, None, &params).unwrap();
        // Pass one: [0, 3, 3, 3, 0]; pass two averages that
        assert_abs_diff_eq!(result[0], 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(result[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn smoothing_does_not_cross_barriers() {
        let targets: Serie<Point2> = (0..4).map(|i| p(i as f64, 0.0)).collect();
        let values = Serie::new(vec![0.0, 0.0, 10.0, 10.0]);
        let params = InterpolationParams::builder()
            .smoothing_method(SmoothingMethod::Mean)
            .smoothing_radius(1.5)
            .discontinuity(vertical_fault(1.5))
            .build()
            .unwrap();

        let result = interpolate_field(&targets, &targets, &values, None, &params).unwrap();
        assert_eq!(result, values);
    }

    #[test]
    fn three_dimensional_targets_use_planar_barriers() {
        let samples = Serie::new(vec![Point3::new([-1.0, 0.0, 5.0]), Point3::new([1.0, 0.0, -5.0])]);
        let values = Serie::new(vec![1.0, 2.0]);
        let targets = Serie::new(vec![Point3::new([-0.5, 0.0, 0.0])]);
        let params = InterpolationParams::builder()
            .discontinuity(vertical_fault(0.0))
            .build()
            .unwrap();

        let result = interpolate_field(&targets, &samples, &values, None, &params).unwrap();
        assert_abs_diff_eq!(result[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let samples = Serie::new(vec![p(0.0, 0.0), p(1.0, 0.0)]);
        let values = Serie::new(vec![1.0, 2.0]);
        let targets = Serie::new(vec![p(0.5, 0.5)]);
        let params = InterpolationParams::default();

        let short = Serie::new(vec![1.0]);
        assert!(matches!(
            interpolate_field(&targets, &samples, &short, None, &params),
            Err(Error::SizeMismatch { what: "sample values", .. })
        ));

        let groups = Serie::new(vec![GroupInfo::default()]);
        assert!(matches!(
            interpolate_field(&targets, &samples, &values, Some(&groups), &params),
            Err(Error::SizeMismatch { what: "sample groups", .. })
        ));

        let empty: Serie<Point2> = Serie::default();
        assert!(matches!(
            interpolate_field(&empty, &samples, &values, None, &params),
            Err(Error::EmptyInput(_))
        ));

        let grouped = InterpolationParams { respect_groups: true, ..InterpolationParams::default() };
        assert!(matches!(
            interpolate_field(&targets, &samples, &values, None, &grouped),
            Err(Error::InvalidParameter { name: "respect_groups", .. })
        ));

        let bad = InterpolationParams { num_neighbors: Some(0), ..InterpolationParams::default() };
        assert!(matches!(
            interpolate_field(&targets, &samples, &values, None, &bad),
            Err(Error::InvalidParameter { name: "num_neighbors", .. })
        ));
    }

    #[test]
    fn plain_idw_matches_closed_form() {
        let samples = Serie::new(vec![p(0.0, 0.0), p(10.0, 0.0), p(0.0, 10.0)]);
        let values = Serie::new(vec![10.0, 20.0, 30.0]);
        let targets = Serie::new(vec![p(5.0, 0.0), p(0.0, 10.0), p(2.0, 3.0)]);

        let result = idw(&samples, &values, &targets, 2.0, 0.0).unwrap();

        // Equal distance to the first two samples, sqrt(125) to the third
        let (w1, w3) = (1.0 / 25.0, 1.0 / 125.0);
        assert_abs_diff_eq!(result[0], (w1 * 30.0 + w3 * 30.0) / (2.0 * w1 + w3), epsilon = 1e-12);
        assert_eq!(result[1], 30.0);

        let d: Vec<f64> = samples.iter().map(|s| s.distance_squared(&targets[2])).collect();
        let expected = (10.0 / d[0] + 20.0 / d[1] + 30.0 / d[2]) / (1.0 / d[0] + 1.0 / d[1] + 1.0 / d[2]);
        assert_abs_diff_eq!(result[2], expected, epsilon = 1e-12);
    }

    #[test]
    fn plain_idw_smoothing_acts_as_coincidence_tolerance() {
        let samples = Serie::new(vec![p(0.0, 0.0), p(1.0, 0.0)]);
        let values = Serie::new(vec![[1.0, -1.0], [3.0, -3.0]]);
        let targets = Serie::new(vec![p(0.001, 0.0)]);

        let snapped = idw(&samples, &values, &targets, 2.0, 1e-4).unwrap();
        assert_eq!(snapped[0], [1.0, -1.0]);

        let blended = idw(&samples, &values, &targets, 2.0, DEFAULT_IDW_SMOOTHING).unwrap();
        assert!(blended[0][0] > 1.0 && blended[0][0] < 1.01);

        assert!(matches!(
            idw(&samples, &values, &targets, -1.0, 0.0),
            Err(Error::InvalidParameter { name: "power", .. })
        ));
    }
}
