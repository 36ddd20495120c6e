/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the fixed-dimension point/vector primitive shared by all spatial algorithms.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Index, Mul, Neg, Sub};

/// An immutable `N`-dimensional coordinate tuple.
///
/// Used both as a position and as a displacement vector. The dimension is a
/// compile-time parameter, so 2D and 3D code paths share one implementation.
///
/// # Examples
///
/// ```
/// use serie_geo_utils::Point;
///
/// let a = Point::new([1.0, 2.0, 2.0]);
/// assert_eq!(a.norm(), 3.0);
///
/// let b = Point::new([1.0, 0.0, 0.0]);
/// assert_eq!((a - b).coords(), [0.0, 2.0, 2.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<const N: usize> {
    coords: [f64; N],
}

/// A point in the plane.
pub type Point2 = Point<2>;

/// A point in space.
pub type Point3 = Point<3>;

impl<const N: usize> Point<N> {
    #[inline]
    pub const fn new(coords: [f64; N]) -> Self {
        Self { coords }
    }

    /// The origin.
    #[inline]
    pub const fn zero() -> Self {
        Self { coords: [0.0; N] }
    }

    #[inline]
    pub const fn coords(&self) -> [f64; N] {
        self.coords
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.coords
    }

    #[inline]
    pub const fn dimension(&self) -> usize {
        N
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    #[inline]
    pub fn norm_squared(&self) -> f64 {
        self.dot(self)
    }

    /// Euclidean length.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    #[inline]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    /// Standard euclidean distance
    #[inline]
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Returns the unit vector in the same direction, or `None` for a zero-length vector.
    pub fn normalized(&self) -> Option<Self> {
        let n = self.norm();
        if n == 0.0 || !n.is_finite() {
            return None;
        }
        Some(*self * (1.0 / n))
    }

    /// Drops every coordinate past the first two.
    ///
    /// # Panics
    /// Panics when `N < 2`.
    #[inline]
    pub fn xy(&self) -> Point2 {
        Point2::new([self.coords[0], self.coords[1]])
    }

    /// True when every coordinate is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.coords.iter().all(|c| c.is_finite())
    }
}

impl Point2 {
    /// Scalar (z-component) cross product of two plane vectors.
    #[inline]
    pub fn perp_dot(&self, other: &Self) -> f64 {
        self.coords[0] * other.coords[1] - self.coords[1] * other.coords[0]
    }
}

impl Point3 {
    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        let [ax, ay, az] = self.coords;
        let [bx, by, bz] = other.coords;
        Self::new([ay * bz - az * by, az * bx - ax * bz, ax * by - ay * bx])
    }
}

impl<const N: usize> Default for Point<N> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const N: usize> From<[f64; N]> for Point<N> {
    fn from(coords: [f64; N]) -> Self {
        Self::new(coords)
    }
}

impl<const N: usize> From<Point<N>> for [f64; N] {
    fn from(p: Point<N>) -> Self {
        p.coords
    }
}

impl<const N: usize> Index<usize> for Point<N> {
    type Output = f64;

    #[inline]
    fn index(&self, axis: usize) -> &f64 {
        &self.coords[axis]
    }
}

impl<const N: usize> Sub for Point<N> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(std::array::from_fn(|i| self.coords[i] - rhs.coords[i]))
    }
}

impl<const N: usize> Add for Point<N> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(std::array::from_fn(|i| self.coords[i] + rhs.coords[i]))
    }
}

impl<const N: usize> Mul<f64> for Point<N> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.coords.map(|c| c * rhs))
    }
}

impl<const N: usize> Neg for Point<N> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(self.coords.map(|c| -c))
    }
}

// serde only implements arrays for concrete lengths, so points are
// written out by hand as fixed-length tuples.
impl<const N: usize> Serialize for Point<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(N)?;
        for c in &self.coords {
            tup.serialize_element(c)?;
        }
        tup.end()
    }
}

struct PointVisitor<const N: usize>(PhantomData<[f64; N]>);

impl<'de, const N: usize> Visitor<'de> for PointVisitor<N> {
    type Value = Point<N>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a sequence of {} coordinates", N)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Point<N>, A::Error> {
        let mut coords = [0.0; N];
        for (i, slot) in coords.iter_mut().enumerate() {
            *slot = seq
                .next_element()?
                .ok_or_else(|| de::Error::invalid_length(i, &self))?;
        }
        Ok(Point::new(coords))
    }
}

impl<'de, const N: usize> Deserialize<'de> for Point<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_tuple(N, PointVisitor::<N>(PhantomData))
    }
}
