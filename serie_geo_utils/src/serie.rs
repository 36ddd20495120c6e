/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the Serie container: an ordered, fixed-item-size sequence with indexed access.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! The [`Serie`] container.
//!
//! A `Serie<T>` is an insertion-ordered, randomly indexable sequence of
//! homogeneous items. Items with a fixed number of numeric components
//! implement [`SerieItem`], which exposes that count via [`Serie::item_size`].

use crate::point::Point;
use crate::traits::SerieItem;
use faer::Mat;
use rayon::prelude::*;
use std::ops::Index;
use thiserror::Error;

/// Errors raised by [`Serie`] accessors and conversions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerieError {
    #[error("index {index} is out of bounds for a serie of {count} items")]
    OutOfBounds { index: usize, count: usize },

    #[error("expected {expected} columns per item, got {found}")]
    ItemSizeMismatch { expected: usize, found: usize },
}

/// Ordered, fixed-item-size sequence of homogeneous items.
///
/// # Examples
///
/// ```
/// use serie_geo_utils::{Point, Serie};
///
/// let positions = Serie::new(vec![
///     Point::new([0.0, 0.0]),
///     Point::new([3.0, 4.0]),
/// ]);
/// assert_eq!(positions.item_size(), 2);
///
/// let lengths = positions.map(|p, _| p.norm());
/// assert_eq!(lengths.as_slice(), &[0.0, 5.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Serie<T> {
    items: Vec<T>,
}

impl<T> Serie<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// A serie of `count` copies of `value`.
    pub fn filled(count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self {
            items: vec![value; count],
        }
    }

    /// Number of items.
    #[inline]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Replaces the item at `index`.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), SerieError> {
        let count = self.items.len();
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(SerieError::OutOfBounds { index, count }),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Builds a new serie by applying `f(item, index)` to every item in order.
    pub fn map<U, F>(&self, mut f: F) -> Serie<U>
    where
        F: FnMut(&T, usize) -> U,
    {
        Serie::new(
            self.items
                .iter()
                .enumerate()
                .map(|(i, item)| f(item, i))
                .collect(),
        )
    }

    /// Parallel version of [`Serie::map`]; output order still matches input order.
    pub fn par_map<U, F>(&self, f: F) -> Serie<U>
    where
        T: Sync,
        U: Send,
        F: Fn(&T, usize) -> U + Sync + Send,
    {
        Serie::new(
            self.items
                .par_iter()
                .enumerate()
                .map(|(i, item)| f(item, i))
                .collect(),
        )
    }

    /// Fallible [`Serie::par_map`]; returns an error if any item fails.
    pub fn try_par_map<U, E, F>(&self, f: F) -> Result<Serie<U>, E>
    where
        T: Sync,
        U: Send,
        E: Send,
        F: Fn(&T, usize) -> Result<U, E> + Sync + Send,
    {
        let items = self
            .items
            .par_iter()
            .enumerate()
            .map(|(i, item)| f(item, i))
            .collect::<Result<Vec<U>, E>>()?;
        Ok(Serie::new(items))
    }

    /// Calls `f(item, index)` for every item in order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T, usize),
    {
        self.items.iter().enumerate().for_each(|(i, item)| f(item, i));
    }
}

impl<T: SerieItem> Serie<T> {
    /// Number of numeric components per item.
    #[inline]
    pub fn item_size(&self) -> usize {
        T::ITEM_SIZE
    }
}

impl<const N: usize> Serie<Point<N>> {
    /// Reads one point per matrix row.
    pub fn from_mat(points: &Mat<f64>) -> Result<Self, SerieError> {
        if points.ncols() != N {
            return Err(SerieError::ItemSizeMismatch {
                expected: N,
                found: points.ncols(),
            });
        }
        Ok(Self::new(
            (0..points.nrows())
                .map(|i| Point::new(std::array::from_fn(|j| points[(i, j)])))
                .collect(),
        ))
    }

    /// Writes one point per matrix row.
    pub fn to_mat(&self) -> Mat<f64> {
        Mat::from_fn(self.count(), N, |i, j| self.items[i][j])
    }
}

impl Serie<f64> {
    /// Reads the first column of a matrix.
    pub fn from_col_mat(values: &Mat<f64>) -> Result<Self, SerieError> {
        if values.ncols() != 1 {
            return Err(SerieError::ItemSizeMismatch {
                expected: 1,
                found: values.ncols(),
            });
        }
        Ok(Self::new((0..values.nrows()).map(|i| values[(i, 0)]).collect()))
    }

    pub fn to_col_mat(&self) -> Mat<f64> {
        Mat::from_fn(self.count(), 1, |i, _| self.items[i])
    }
}

impl<T> Index<usize> for Serie<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> From<Vec<T>> for Serie<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> FromIterator<T> for Serie<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for Serie<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Serie<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
