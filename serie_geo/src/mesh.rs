/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the triangle mesh topology: adjacency, border detection and vertex lookup.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Triangle mesh topology.
//!
//! A [`Mesh`] owns its vertex positions and triangles and derives everything
//! else once, at construction: vertex adjacency, per-edge triangle counts,
//! border vertices and a [`KdTree`] over the vertices. The mesh cannot be
//! edited afterwards; build a new one instead.

use crate::error::{Error, Result};
use crate::kdtree::{KdTree, Neighbour};
use serie_geo_utils::{create_evaluation_grid, Point, Point2, Serie};
use std::collections::BTreeMap;

/// Triangulated surface in `N` dimensions (2 or 3).
#[derive(Debug, Clone)]
pub struct Mesh<const N: usize> {
    vertices: Serie<Point<N>>,
    triangles: Serie<[usize; 3]>,

    /// Sorted, deduplicated neighbours of every vertex.
    neighbours: Vec<Vec<usize>>,

    /// Number of triangles using each undirected edge `(low, high)`.
    edge_counts: BTreeMap<(usize, usize), usize>,

    /// Vertices touching an edge not shared by exactly two triangles, ascending.
    border_nodes: Vec<usize>,
    is_border: Vec<bool>,

    tree: KdTree<N>,
}

/// Planar mesh.
pub type Mesh2D = Mesh<2>;

/// Surface mesh in space.
pub type Mesh3D = Mesh<3>;

impl<const N: usize> Mesh<N> {
    /// Validates the triangles and builds the mesh topology.
    ///
    /// # Errors
    /// - [`Error::EmptyInput`] when there are no vertices or no triangles.
    /// - [`Error::InvalidTriangle`] when a triangle references a missing
    ///   vertex or uses the same vertex twice.
    /// - [`Error::InvalidParameter`] for non-finite vertex coordinates.
    ///
    /// # Examples
    /// ```
    /// use serie_geo::Mesh2D;
    /// use serie_geo_utils::{Point2, Serie};
    ///
    /// let vertices = Serie::new(vec![
    ///     Point2::new([0.0, 0.0]),
    ///     Point2::new([1.0, 0.0]),
    ///     Point2::new([0.0, 1.0]),
    ///     Point2::new([1.0, 1.0]),
    /// ]);
    /// let triangles = Serie::new(vec![[0, 1, 2], [1, 3, 2]]);
    ///
    /// let mesh = Mesh2D::new(vertices, triangles).unwrap();
    /// assert_eq!(mesh.neighbours(1), &[0, 2, 3]);
    /// assert_eq!(mesh.border_nodes(), &[0, 1, 2, 3]);
    /// ```
    pub fn new(vertices: Serie<Point<N>>, triangles: Serie<[usize; 3]>) -> Result<Self> {
        if vertices.is_empty() {
            return Err(Error::EmptyInput("mesh vertices"));
        }
        if triangles.is_empty() {
            return Err(Error::EmptyInput("mesh triangles"));
        }

        let num_vertices = vertices.count();
        for (t, tri) in triangles.iter().enumerate() {
            let invalid = |reason| Error::InvalidTriangle {
                triangle: t,
                vertices: *tri,
                num_vertices,
                reason,
            };
            if tri.iter().any(|&v| v >= num_vertices) {
                return Err(invalid("vertex index out of range"));
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                return Err(invalid("repeated vertex"));
            }
        }

        let tree = KdTree::from_points(&vertices)?;

        let mut neighbours = vec![Vec::new(); num_vertices];
        let mut edge_counts: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        for tri in triangles.iter() {
            for k in 0..3 {
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                neighbours[a].push(b);
                neighbours[b].push(a);
                *edge_counts.entry((a.min(b), a.max(b))).or_default() += 1;
            }
        }
        for list in neighbours.iter_mut() {
            list.sort_unstable();
            list.dedup();
        }

        let mut is_border = vec![false; num_vertices];
        edge_counts
            .iter()
            .filter(|&(_, &count)| count != 2)
            .for_each(|(&(a, b), _)| {
                is_border[a] = true;
                is_border[b] = true;
            });
        let border_nodes: Vec<usize> = (0..num_vertices).filter(|&v| is_border[v]).collect();

        tracing::debug!(
            num_vertices,
            num_triangles = triangles.count(),
            num_edges = edge_counts.len(),
            num_border_nodes = border_nodes.len(),
            "built mesh topology"
        );

        Ok(Self {
            vertices,
            triangles,
            neighbours,
            edge_counts,
            border_nodes,
            is_border,
            tree,
        })
    }

    #[inline]
    pub fn vertices(&self) -> &Serie<Point<N>> {
        &self.vertices
    }

    #[inline]
    pub fn triangles(&self) -> &Serie<[usize; 3]> {
        &self.triangles
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.count()
    }

    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.triangles.count()
    }

    /// Number of distinct undirected edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edge_counts.len()
    }

    /// Sorted neighbours of `vertex`; empty for a vertex outside every triangle.
    ///
    /// # Panics
    /// Panics if `vertex` is out of range.
    #[inline]
    pub fn neighbours(&self, vertex: usize) -> &[usize] {
        &self.neighbours[vertex]
    }

    /// Vertices on an open or non-manifold edge, in ascending order.
    #[inline]
    pub fn border_nodes(&self) -> &[usize] {
        &self.border_nodes
    }

    #[inline]
    pub fn is_border(&self, vertex: usize) -> bool {
        self.is_border.get(vertex).copied().unwrap_or(false)
    }

    /// Edges `[low, high]` not shared by exactly two triangles, in ascending order.
    pub fn border_edges(&self) -> Vec<[usize; 2]> {
        self.edge_counts
            .iter()
            .filter(|&(_, &count)| count != 2)
            .map(|(&(a, b), _)| [a, b])
            .collect()
    }

    /// Nearest vertex to `position`, with its squared distance.
    pub fn closest_vertex(&self, position: &Point<N>) -> Result<Neighbour> {
        self.tree.find_nearest(position)
    }
}

/// Builds an `n × n` vertex grid of side `size` centred on the origin, with
/// two triangles per cell.
///
/// Vertex `i + j * n` sits in column `i` and row `j`. Cell `(i, j)` is split
/// into `[v0, v1, v2]` and `[v1, v3, v2]` where `v0 = i + j * n`,
/// `v1 = v0 + 1`, `v2 = v0 + n` and `v3 = v2 + 1`.
///
/// # Errors
/// [`Error::InvalidParameter`] when `n < 2` or `size` is not a positive
/// finite number.
pub fn generate_grid2d_mesh(n: usize, size: f64) -> Result<Mesh2D> {
    if n < 2 {
        return Err(Error::invalid_parameter(
            "n",
            n,
            "a grid mesh needs at least two vertices per side",
        ));
    }
    if !(size.is_finite() && size > 0.0) {
        return Err(Error::invalid_parameter(
            "size",
            size,
            "must be positive and finite",
        ));
    }

    let half = 0.5 * size;
    let vertices: Serie<Point2> = create_evaluation_grid([(-half, half), (-half, half)], [n, n]);

    let mut triangles = Vec::with_capacity(2 * (n - 1) * (n - 1));
    for j in 0..n - 1 {
        for i in 0..n - 1 {
            let v0 = i + j * n;
            let v1 = v0 + 1;
            let v2 = v0 + n;
            let v3 = v2 + 1;
            triangles.push([v0, v1, v2]);
            triangles.push([v1, v3, v2]);
        }
    }

    Mesh::new(vertices, Serie::new(triangles))
}
