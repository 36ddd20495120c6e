/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides a balanced, implicitly stored KD-tree for nearest-neighbour and radius queries.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # kdtree
//!
//! A static KD-tree over `N`-dimensional points.
//!
//! The tree is stored implicitly in one flat array of `(point, index)` pairs.
//! The node for the range `[lo, hi)` is the element at `lo + (hi - lo) / 2`;
//! its left subtree is `[lo, mid)` and its right subtree `[mid + 1, hi)`. The
//! splitting axis is `depth % N`. Building partitions that single array in
//! place with a partial selection per level, so there are no per-node
//! allocations and no pointers to chase.
//!
//! Trees are immutable once built. Any change to the input requires a rebuild.
//! Queries never mutate the tree, so one tree can be shared between threads.

use crate::error::{Error, Result};
use rayon::prelude::*;
use serie_geo_utils::{Point, Serie};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A neighbour found by a query: its input index and squared distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    pub index: usize,
    pub distance_sq: f64,
}

impl Neighbour {
    /// Euclidean distance to the query.
    #[inline]
    pub fn distance(&self) -> f64 {
        self.distance_sq.sqrt()
    }
}

// Heap entry ordered by (distance, index) so the k-nearest set is unique.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    distance_sq: f64,
    index: usize,
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_sq
            .total_cmp(&other.distance_sq)
            .then(self.index.cmp(&other.index))
    }
}

/// Half-open range of the backing array that forms one subtree.
#[derive(Debug, Clone, Copy)]
struct Span {
    lo: usize,
    hi: usize,
    depth: usize,
}

impl Span {
    #[inline]
    fn is_empty(&self) -> bool {
        self.lo >= self.hi
    }

    #[inline]
    fn mid(&self) -> usize {
        self.lo + (self.hi - self.lo) / 2
    }

    #[inline]
    fn left(&self) -> Span {
        Span {
            lo: self.lo,
            hi: self.mid(),
            depth: self.depth + 1,
        }
    }

    #[inline]
    fn right(&self) -> Span {
        Span {
            lo: self.mid() + 1,
            hi: self.hi,
            depth: self.depth + 1,
        }
    }
}

/// Static KD-tree over `N`-dimensional points with one payload per point.
///
/// # Examples
///
/// ```
/// use serie_geo::KdTree;
/// use serie_geo_utils::{Point, Serie};
///
/// let points = Serie::new(vec![
///     Point::new([0.0, 0.0]),
///     Point::new([10.0, 0.0]),
///     Point::new([0.0, 10.0]),
/// ]);
/// let labels = Serie::new(vec!["origin", "east", "north"]);
///
/// let tree = KdTree::new(&points, &labels).unwrap();
/// let nearest = tree.find_nearest(&Point::new([1.0, 1.0])).unwrap();
///
/// assert_eq!(nearest.index, 0);
/// assert_eq!(nearest.distance(), 2f64.sqrt());
/// assert_eq!(tree.payload(nearest.index), Some(&"origin"));
/// ```
#[derive(Debug, Clone)]
pub struct KdTree<const N: usize, T = usize> {
    /// `(point, input index)` pairs arranged as an implicit balanced tree.
    nodes: Vec<(Point<N>, usize)>,

    /// Position in `nodes` of each input index.
    slots: Vec<usize>,

    /// Payloads in input order.
    payloads: Vec<T>,
}

impl<const N: usize> KdTree<N, usize> {
    /// Builds a tree whose payload for each point is its input index.
    pub fn from_points(points: &Serie<Point<N>>) -> Result<Self> {
        let indices: Serie<usize> = (0..points.count()).collect();
        Self::new(points, &indices)
    }
}

impl<const N: usize, T: Clone> KdTree<N, T> {
    /// Builds a balanced tree over `points`, attaching `payloads[i]` to `points[i]`.
    ///
    /// Medians are chosen by partial selection ordered by the splitting
    /// coordinate and then by input index, so equal coordinates always
    /// produce the same tree.
    ///
    /// # Errors
    /// - [`Error::SizeMismatch`] if `points` and `payloads` differ in length.
    /// - [`Error::EmptyInput`] if there are no points.
    /// - [`Error::InvalidParameter`] if a coordinate is not finite.
    pub fn new(points: &Serie<Point<N>>, payloads: &Serie<T>) -> Result<Self> {
        if points.count() != payloads.count() {
            return Err(Error::SizeMismatch {
                what: "kd-tree payloads",
                expected: points.count(),
                found: payloads.count(),
            });
        }
        if points.is_empty() {
            return Err(Error::EmptyInput("kd-tree points"));
        }
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(Error::invalid_parameter(
                "points",
                format!("{:?} at index {}", points[i].coords(), i),
                "coordinates must be finite",
            ));
        }

        let mut nodes: Vec<(Point<N>, usize)> =
            points.iter().copied().enumerate().map(|(i, p)| (p, i)).collect();
        Self::build_tree(&mut nodes, 0);

        let mut slots = vec![0usize; nodes.len()];
        nodes
            .iter()
            .enumerate()
            .for_each(|(slot, &(_, index))| slots[index] = slot);

        tracing::debug!(num_points = nodes.len(), dimension = N, "built kd-tree");

        Ok(Self {
            nodes,
            slots,
            payloads: payloads.as_slice().to_vec(),
        })
    }

    /// Recursively partitions `nodes` so that its median along the current
    /// axis sits in the middle, then recurses on both halves.
    fn build_tree(nodes: &mut [(Point<N>, usize)], depth: usize) {
        if nodes.len() <= 1 {
            return;
        }

        let axis = depth % N;
        let mid = nodes.len() / 2;
        nodes.select_nth_unstable_by(mid, |a, b| {
            a.0[axis].total_cmp(&b.0[axis]).then(a.1.cmp(&b.1))
        });

        let (left, rest) = nodes.split_at_mut(mid);
        Self::build_tree(left, depth + 1);
        Self::build_tree(&mut rest[1..], depth + 1);
    }
}

impl<const N: usize, T> KdTree<N, T> {
    /// Number of points in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false` for a constructed tree.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Payload attached to the point with input index `index`.
    #[inline]
    pub fn payload(&self, index: usize) -> Option<&T> {
        self.payloads.get(index)
    }

    /// All payloads in input order.
    #[inline]
    pub fn payloads(&self) -> &[T] {
        &self.payloads
    }

    /// Position of the point with input index `index`.
    #[inline]
    pub fn position(&self, index: usize) -> Option<Point<N>> {
        self.slots.get(index).map(|&slot| self.nodes[slot].0)
    }

    /// Squared distance between a stored point and an arbitrary point.
    ///
    /// O(1); avoids a second traversal when the index is already known.
    pub fn squared_distance(&self, index: usize, point: &Point<N>) -> Result<f64> {
        self.position(index)
            .map(|p| p.distance_squared(point))
            .ok_or(Error::IndexOutOfBounds {
                index,
                count: self.len(),
            })
    }

    #[inline]
    fn root(&self) -> Span {
        Span {
            lo: 0,
            hi: self.nodes.len(),
            depth: 0,
        }
    }

    fn check_query(query: &Point<N>) -> Result<()> {
        match query.is_finite() {
            true => Ok(()),
            false => Err(Error::invalid_parameter(
                "query",
                format!("{:?}", query.coords()),
                "coordinates must be finite",
            )),
        }
    }

    /// Finds the stored point closest to `query`.
    ///
    /// When several points are equally close, the first one met during the
    /// traversal is kept.
    pub fn find_nearest(&self, query: &Point<N>) -> Result<Neighbour> {
        Self::check_query(query)?;

        let mut best = Neighbour {
            index: usize::MAX,
            distance_sq: f64::INFINITY,
        };
        self.nearest_impl(self.root(), query, &mut best);
        Ok(best)
    }

    /// Finds the nearest point and returns its index together with its payload.
    pub fn find_nearest_payload(&self, query: &Point<N>) -> Result<(usize, &T)> {
        let nearest = self.find_nearest(query)?;
        Ok((nearest.index, &self.payloads[nearest.index]))
    }

    fn nearest_impl(&self, span: Span, query: &Point<N>, best: &mut Neighbour) {
        if span.is_empty() {
            return;
        }

        let mid = span.mid();
        let (point, index) = &self.nodes[mid];
        let dist = point.distance_squared(query);
        if dist < best.distance_sq {
            *best = Neighbour {
                index: *index,
                distance_sq: dist,
            };
        }

        let axis = span.depth % N;
        let diff = query[axis] - point[axis];
        let (near, far) = match diff <= 0.0 {
            true => (span.left(), span.right()),
            false => (span.right(), span.left()),
        };

        self.nearest_impl(near, query, best);

        // The far side can only help if the splitting plane is closer than the best so far
        if diff * diff < best.distance_sq {
            self.nearest_impl(far, query, best);
        }
    }

    /// Finds the `k` stored points closest to `query`, closest first.
    ///
    /// Returns `min(k, len)` neighbours sorted by ascending distance, with
    /// equal distances ordered by input index. `k = 0` returns an empty list.
    pub fn find_k_nearest(&self, query: &Point<N>, k: usize) -> Result<Vec<Neighbour>> {
        Self::check_query(query)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let k = k.min(self.len());
        let mut heap = BinaryHeap::with_capacity(k + 1);
        self.k_nearest_impl(self.root(), query, k, &mut heap);

        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| Neighbour {
                index: c.index,
                distance_sq: c.distance_sq,
            })
            .collect())
    }

    fn k_nearest_impl(
        &self,
        span: Span,
        query: &Point<N>,
        k: usize,
        heap: &mut BinaryHeap<Candidate>,
    ) {
        if span.is_empty() {
            return;
        }

        let mid = span.mid();
        let (point, index) = &self.nodes[mid];
        let candidate = Candidate {
            distance_sq: point.distance_squared(query),
            index: *index,
        };

        if heap.len() < k {
            heap.push(candidate);
        } else if heap.peek().is_some_and(|worst| candidate < *worst) {
            heap.pop();
            heap.push(candidate);
        }

        let axis = span.depth % N;
        let diff = query[axis] - point[axis];
        let (near, far) = match diff <= 0.0 {
            true => (span.left(), span.right()),
            false => (span.right(), span.left()),
        };

        self.k_nearest_impl(near, query, k, heap);

        let visit_far = heap.len() < k
            || heap
                .peek()
                .is_some_and(|worst| diff * diff <= worst.distance_sq);
        if visit_far {
            self.k_nearest_impl(far, query, k, heap);
        }
    }

    /// Runs [`KdTree::find_k_nearest`] for every query in parallel.
    ///
    /// The result holds one neighbour list per query, in query order.
    pub fn find_k_nearest_batch(
        &self,
        queries: &Serie<Point<N>>,
        k: usize,
    ) -> Result<Vec<Vec<Neighbour>>>
    where
        T: Sync,
    {
        queries
            .as_slice()
            .par_iter()
            .map(|q| self.find_k_nearest(q, k))
            .collect()
    }

    /// Returns the input indices of all points within `radius` of `query`
    /// (boundary included), in ascending index order.
    ///
    /// A negative radius yields no points.
    pub fn find_in_radius(&self, query: &Point<N>, radius: f64) -> Vec<usize> {
        let mut result = Vec::new();
        if radius < 0.0 || !query.is_finite() {
            return result;
        }
        self.radius_impl(self.root(), query, radius * radius, &mut result);
        result.sort_unstable();
        result
    }

    fn radius_impl(&self, span: Span, query: &Point<N>, radius_sq: f64, result: &mut Vec<usize>) {
        if span.is_empty() {
            return;
        }

        let mid = span.mid();
        let (point, index) = &self.nodes[mid];
        if point.distance_squared(query) <= radius_sq {
            result.push(*index);
        }

        let axis = span.depth % N;
        let diff = query[axis] - point[axis];

        // |diff| <= radius ⇒ the ball intersects the splitting plane
        if diff * diff <= radius_sq {
            self.radius_impl(span.left(), query, radius_sq, result);
            self.radius_impl(span.right(), query, radius_sq, result);
        } else if diff < 0.0 {
            self.radius_impl(span.left(), query, radius_sq, result);
        } else {
            self.radius_impl(span.right(), query, radius_sq, result);
        }
    }
}
