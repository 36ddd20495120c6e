/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements harmonic diffusion (Laplace relaxation) of vertex fields under Dirichlet constraints.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Harmonic diffusion of a vertex field over a [`Mesh`].
//!
//! Free vertices are relaxed toward the average of their neighbours with
//! damped Gauss-Seidel sweeps, while constrained vertices keep the value they
//! were pinned to. Sweeps run in vertex order and always read the latest
//! values, so one run is fully deterministic.
//!
//! The solver moves through the states of [`SolverState`]:
//! `Unconstrained` → `Constrained` → `Iterating` → `Converged` or
//! `MaxIterationsReached`.

use crate::config::DiffusionParams;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::progress::{progress_from_rel, ProgressMsg, ProgressSink};
use serie_geo_utils::{FieldValue, Point, Serie};
use std::sync::Arc;

/// Lifecycle of a [`HarmonicDiffusion`] solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    /// No vertex is pinned yet.
    Unconstrained,

    /// At least one vertex is pinned and no sweep has run since.
    Constrained,

    /// Sweeps are running.
    Iterating,

    /// The last sweep changed no value by `eps` or more.
    Converged,

    /// `max_iter` sweeps ran without converging.
    MaxIterationsReached,
}

/// How a solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Converged,
    MaxIterationsReached,
}

/// A copy of the field stored during a recorded solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<V> {
    pub name: String,

    /// Number of sweeps completed when the copy was taken.
    pub iteration: usize,
    pub values: Serie<V>,
}

/// Result of [`HarmonicDiffusion::solve`].
#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionOutcome<V> {
    /// Name of the final field, as configured.
    pub name: String,
    pub field: Serie<V>,

    /// Number of sweeps performed.
    pub iterations: usize,

    /// Largest absolute change of the last sweep.
    pub last_change: f64,

    /// Largest absolute change of every sweep, in order.
    pub change_history: Vec<f64>,
    pub termination: Termination,
    pub snapshots: Vec<Snapshot<V>>,
}

/// Harmonic diffusion solver over a borrowed mesh.
///
/// # Examples
/// ```
/// use serie_geo::{generate_grid2d_mesh, DiffusionParams, HarmonicDiffusion, Termination};
/// use serie_geo_utils::Point;
///
/// let mesh = generate_grid2d_mesh(11, 10.0).unwrap();
/// let params = DiffusionParams::builder().max_iter(5000).build().unwrap();
///
/// let mut solver = HarmonicDiffusion::new(&mesh, 0.0, params).unwrap();
/// solver.constrain_borders(0.0);
/// solver.add_constraint(&Point::new([0.0, 0.0]), 1.0).unwrap();
///
/// let outcome = solver.solve();
/// assert_eq!(outcome.termination, Termination::Converged);
/// assert!(outcome.field.iter().all(|&v| (0.0..=1.0).contains(&v)));
/// ```
#[derive(Debug)]
pub struct HarmonicDiffusion<'mesh, const N: usize, V: FieldValue> {
    mesh: &'mesh Mesh<N>,
    params: DiffusionParams,
    values: Vec<V>,
    constrained: Vec<bool>,
    state: SolverState,
    progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl<'mesh, const N: usize, V: FieldValue> HarmonicDiffusion<'mesh, N, V> {
    /// Creates a solver with every vertex set to `init_value`.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] when `params` fails validation.
    pub fn new(mesh: &'mesh Mesh<N>, init_value: V, params: DiffusionParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            mesh,
            params,
            values: vec![init_value; mesh.num_vertices()],
            constrained: vec![false; mesh.num_vertices()],
            state: SolverState::Unconstrained,
            progress_callback: None,
        })
    }

    /// Attaches a sink that receives one message per sweep and per snapshot.
    pub fn progress_callback(mut self, progress_callback: Arc<dyn ProgressSink>) -> Self {
        self.progress_callback = Some(progress_callback);
        self
    }

    #[inline]
    pub fn state(&self) -> SolverState {
        self.state
    }

    #[inline]
    pub fn params(&self) -> &DiffusionParams {
        &self.params
    }

    #[inline]
    pub fn mesh(&self) -> &'mesh Mesh<N> {
        self.mesh
    }

    /// Current field, one value per mesh vertex.
    #[inline]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    #[inline]
    pub fn is_constrained(&self, vertex: usize) -> bool {
        self.constrained.get(vertex).copied().unwrap_or(false)
    }

    /// Pinned vertices in ascending order.
    pub fn constrained_nodes(&self) -> Vec<usize> {
        (0..self.constrained.len())
            .filter(|&v| self.constrained[v])
            .collect()
    }

    // The first value given to a vertex stays for the whole run.
    fn pin(&mut self, vertex: usize, value: V) -> bool {
        if self.constrained[vertex] {
            return false;
        }
        self.constrained[vertex] = true;
        self.values[vertex] = value;
        self.state = SolverState::Constrained;
        true
    }

    /// Pins one vertex by index.
    ///
    /// Returns `false` when the vertex was already pinned, in which case its
    /// first value is kept.
    ///
    /// # Errors
    /// [`Error::IndexOutOfBounds`] for an unknown vertex.
    pub fn constrain_vertex(&mut self, vertex: usize, value: V) -> Result<bool> {
        if vertex >= self.values.len() {
            return Err(Error::IndexOutOfBounds {
                index: vertex,
                count: self.values.len(),
            });
        }
        Ok(self.pin(vertex, value))
    }

    /// Pins the mesh vertex closest to `position` and returns its index.
    ///
    /// A vertex that is already pinned keeps its first value.
    ///
    /// With the default `constraint_tolerance` of `None` every position
    /// matches: a point far outside the mesh pins whichever vertex is
    /// closest, usually one on the border. Set a tolerance through
    /// [`DiffusionParamsBuilder::constraint_tolerance`](crate::DiffusionParamsBuilder::constraint_tolerance)
    /// to reject such positions.
    ///
    /// # Errors
    /// [`Error::ConstraintNotFound`] when `constraint_tolerance` is set and the
    /// closest vertex is farther away, [`Error::InvalidParameter`] for a
    /// non-finite position.
    pub fn add_constraint(&mut self, position: &Point<N>, value: V) -> Result<usize> {
        let closest = self.mesh.closest_vertex(position)?;

        if let Some(tolerance) = self.params.constraint_tolerance {
            if closest.distance() > tolerance {
                return Err(Error::ConstraintNotFound {
                    position: position.coords().to_vec(),
                    tolerance,
                    distance: closest.distance(),
                });
            }
        }

        if !self.pin(closest.index, value) {
            tracing::debug!(vertex = closest.index, "vertex already constrained, keeping first value");
        }
        Ok(closest.index)
    }

    /// Pins every border vertex that is not pinned yet to `value` and returns
    /// how many were newly pinned.
    pub fn constrain_borders(&mut self, value: V) -> usize {
        let mesh = self.mesh;
        let mut pinned = 0;
        for &v in mesh.border_nodes() {
            if self.pin(v, value) {
                pinned += 1;
            }
        }
        pinned
    }

    /// One damped Gauss-Seidel sweep. Returns the largest absolute component change.
    fn sweep(&mut self) -> f64 {
        let epsilon = self.params.epsilon;
        let mut max_change = 0.0_f64;

        for i in 0..self.values.len() {
            if self.constrained[i] {
                continue;
            }
            let neighbours = self.mesh.neighbours(i);
            if neighbours.is_empty() {
                continue;
            }

            let mut average = V::zero();
            for &n in neighbours {
                average.add_scaled(&self.values[n], 1.0);
            }
            let average = average.scaled(1.0 / neighbours.len() as f64);

            let old = self.values[i];
            let mut new = average.scaled(epsilon);
            new.add_scaled(&old, 1.0 - epsilon);

            max_change = max_change.max(new.max_abs_diff(&old));
            self.values[i] = new;
        }

        max_change
    }

    fn snapshot(&self, name: String, iteration: usize) -> Snapshot<V> {
        if let Some(sink) = &self.progress_callback {
            sink.emit(ProgressMsg::SnapshotRecorded {
                name: name.clone(),
                iter: iteration,
            });
        }
        Snapshot {
            name,
            iteration,
            values: Serie::new(self.values.clone()),
        }
    }

    /// Relaxes the field until convergence or until `max_iter` sweeps.
    ///
    /// The solver keeps its field afterwards: calling `solve` again continues
    /// from the current values, and constraints may still be added in between.
    pub fn solve(&mut self) -> DiffusionOutcome<V> {
        let DiffusionParams {
            max_iter,
            eps,
            record,
            step_interval,
            ..
        } = self.params;
        let name = self.params.name.clone();

        let num_constrained = self.constrained.iter().filter(|&&c| c).count();
        tracing::debug!(
            num_vertices = self.values.len(),
            num_constrained,
            max_iter,
            eps,
            "starting harmonic diffusion"
        );
        if let Some(sink) = &self.progress_callback {
            sink.emit(ProgressMsg::Message {
                message: format!(
                    "diffusing {name} over {} vertices ({num_constrained} constrained)",
                    self.values.len()
                ),
            });
        }

        let mut snapshots = Vec::new();
        if record && step_interval == 0 {
            snapshots.push(self.snapshot(format!("{name}_init"), 0));
        }

        self.state = SolverState::Iterating;
        let mut change_history = Vec::with_capacity(max_iter.min(1024));
        let mut termination = Termination::MaxIterationsReached;
        let mut step_count = 1usize;

        for iter in 0..max_iter {
            let change = self.sweep();
            change_history.push(change);

            if record && step_interval > 0 && iter % step_interval == 0 {
                snapshots.push(self.snapshot(format!("{name}{step_count}"), iter + 1));
                step_count += 1;
            }

            if let Some(sink) = &self.progress_callback {
                sink.emit(ProgressMsg::SolverIteration {
                    iter: iter + 1,
                    max_change: change,
                    progress: progress_from_rel(change, change_history[0], eps),
                });
            }

            if change < eps {
                termination = Termination::Converged;
                break;
            }
        }

        let iterations = change_history.len();
        let last_change = change_history.last().copied().unwrap_or(0.0);
        match termination {
            Termination::Converged => {
                self.state = SolverState::Converged;
                tracing::debug!(iterations, last_change, "harmonic diffusion converged");
            }
            Termination::MaxIterationsReached => {
                self.state = SolverState::MaxIterationsReached;
                tracing::warn!(
                    iterations,
                    last_change,
                    eps,
                    "harmonic diffusion stopped at the iteration limit"
                );
            }
        }

        DiffusionOutcome {
            name,
            field: Serie::new(self.values.clone()),
            iterations,
            last_change,
            change_history,
            termination,
            snapshots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{generate_grid2d_mesh, Mesh2D};
    use crate::progress::closure_sink;
    use approx::assert_abs_diff_eq;
    use serie_geo_utils::Point2;
    use std::sync::Mutex;

    #[test]
    fn pinned_borders_pull_centre_to_zero() {
        let mesh = generate_grid2d_mesh(3, 2.0).unwrap();
        let mut solver = HarmonicDiffusion::new(&mesh, 5.0, DiffusionParams::default()).unwrap();
        assert_eq!(solver.state(), SolverState::Unconstrained);

        assert_eq!(solver.constrain_borders(0.0), 8);
        assert_eq!(solver.state(), SolverState::Constrained);
        assert_eq!(solver.values()[4], 5.0);

        let outcome = solver.solve();
        assert_eq!(outcome.termination, Termination::Converged);
        assert_eq!(solver.state(), SolverState::Converged);
        assert!(outcome.iterations <= DiffusionParams::default().max_iter);
        assert!(outcome.field[4].abs() < 1e-5);
        assert!(mesh.border_nodes().iter().all(|&v| outcome.field[v] == 0.0));

        // Each sweep halves the centre value
        for w in outcome.change_history.windows(2) {
            assert_abs_diff_eq!(w[1], 0.5 * w[0], epsilon = 1e-12);
        }
    }

    #[test]
    fn linear_boundary_values_give_a_linear_field() {
        let mesh = generate_grid2d_mesh(7, 6.0).unwrap();
        let params = DiffusionParams::builder()
            .max_iter(10_000)
            .eps(1e-12)
            .epsilon(1.0)
            .build()
            .unwrap();
        let mut solver = HarmonicDiffusion::new(&mesh, 0.0, params).unwrap();
        for &v in mesh.border_nodes() {
            let p = mesh.vertices()[v];
            assert!(solver.constrain_vertex(v, 2.0 * p[0] - p[1]).unwrap());
        }

        let outcome = solver.solve();
        assert_eq!(outcome.termination, Termination::Converged);
        for (p, &value) in mesh.vertices().iter().zip(outcome.field.iter()) {
            assert_abs_diff_eq!(value, 2.0 * p[0] - p[1], epsilon = 1e-6);
        }
        assert!(outcome.change_history.last().unwrap() < &outcome.change_history[0]);
    }

    #[test]
    fn vector_components_relax_independently() {
        let mesh = generate_grid2d_mesh(5, 4.0).unwrap();
        let params = DiffusionParams::builder().max_iter(5000).eps(1e-10).build().unwrap();
        let mut solver = HarmonicDiffusion::new(&mesh, [0.0, 0.0], params).unwrap();
        solver.constrain_borders([1.0, -3.0]);

        let outcome = solver.solve();
        for v in outcome.field.iter() {
            assert_abs_diff_eq!(v[0], 1.0, epsilon = 1e-8);
            assert_abs_diff_eq!(v[1], -3.0, epsilon = 1e-8);
        }
    }

    #[test]
    fn first_constraint_wins_and_tolerance_is_enforced() {
        let mesh = generate_grid2d_mesh(5, 4.0).unwrap();
        let params = DiffusionParams::builder().constraint_tolerance(0.2).build().unwrap();
        let mut solver = HarmonicDiffusion::new(&mesh, 0.0, params).unwrap();

        let v = solver.add_constraint(&Point2::new([0.1, -0.1]), 3.0).unwrap();
        assert_eq!(mesh.vertices()[v], Point2::new([0.0, 0.0]));
        assert_eq!(solver.add_constraint(&Point2::new([0.0, 0.0]), 9.0).unwrap(), v);
        assert_eq!(solver.values()[v], 3.0);
        assert!(!solver.constrain_vertex(v, 7.0).unwrap());
        assert_eq!(solver.constrained_nodes(), vec![v]);

        assert!(matches!(
            solver.add_constraint(&Point2::new([0.5, 0.5]), 1.0),
            Err(Error::ConstraintNotFound { .. })
        ));
        assert_eq!(
            solver.constrain_vertex(25, 1.0),
            Err(Error::IndexOutOfBounds { index: 25, count: 25 })
        );

        // Border pinning skips the already pinned centre
        assert_eq!(solver.constrain_borders(0.0), 16);
        let outcome = solver.solve();
        assert_eq!(outcome.field[v], 3.0);
    }

    #[test]
    fn iteration_limit_is_respected() {
        let mesh = generate_grid2d_mesh(9, 8.0).unwrap();
        let params = DiffusionParams::builder().max_iter(3).eps(1e-30).build().unwrap();
        let mut solver = HarmonicDiffusion::new(&mesh, 1.0, params).unwrap();
        solver.constrain_borders(0.0);

        let outcome = solver.solve();
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.change_history.len(), 3);
        assert_eq!(outcome.termination, Termination::MaxIterationsReached);
        assert_eq!(solver.state(), SolverState::MaxIterationsReached);
        assert_eq!(outcome.last_change, outcome.change_history[2]);
    }

    #[test]
    fn recording_names_follow_the_step_counter() {
        let mesh = generate_grid2d_mesh(5, 4.0).unwrap();
        let params = DiffusionParams::builder()
            .max_iter(5)
            .eps(1e-30)
            .record(2)
            .name("temperature")
            .build()
            .unwrap();
        let mut solver = HarmonicDiffusion::new(&mesh, 1.0, params).unwrap();
        solver.constrain_borders(0.0);
        let outcome = solver.solve();

        let names: Vec<&str> = outcome.snapshots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["temperature1", "temperature2", "temperature3"]);
        let iterations: Vec<usize> = outcome.snapshots.iter().map(|s| s.iteration).collect();
        assert_eq!(iterations, vec![1, 3, 5]);
        assert_eq!(outcome.snapshots[2].values, outcome.field);
        assert_eq!(outcome.name, "temperature");
    }

    #[test]
    fn zero_interval_records_the_initial_field() {
        let mesh = generate_grid2d_mesh(4, 3.0).unwrap();
        let params = DiffusionParams::builder().record(0).name("u").build().unwrap();
        let mut solver = HarmonicDiffusion::new(&mesh, 2.0, params).unwrap();
        solver.constrain_borders(0.0);
        let before = Serie::new(solver.values().to_vec());

        let outcome = solver.solve();
        assert_eq!(outcome.snapshots.len(), 1);
        assert_eq!(outcome.snapshots[0].name, "u_init");
        assert_eq!(outcome.snapshots[0].iteration, 0);
        assert_eq!(outcome.snapshots[0].values, before);
    }

    #[test]
    fn vertices_without_neighbours_keep_their_value() {
        let vertices = Serie::new(vec![
            Point2::new([0.0, 0.0]),
            Point2::new([1.0, 0.0]),
            Point2::new([0.0, 1.0]),
            Point2::new([5.0, 5.0]),
        ]);
        let mesh = Mesh2D::new(vertices, Serie::new(vec![[0, 1, 2]])).unwrap();
        let mut solver = HarmonicDiffusion::new(&mesh, 4.0, DiffusionParams::default()).unwrap();
        solver.constrain_vertex(0, 1.0).unwrap();

        let outcome = solver.solve();
        assert_eq!(outcome.field[3], 4.0);
        assert_abs_diff_eq!(outcome.field[1], 1.0, epsilon = 1e-4);
    }

    #[test]
    fn progress_sink_sees_every_sweep() {
        let mesh = generate_grid2d_mesh(3, 2.0).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_thread = Arc::clone(&seen);
        let notes = Arc::new(Mutex::new(Vec::new()));
        let notes_in_thread = Arc::clone(&notes);
        let (sink, handle) = closure_sink(1024, move |msg| match msg {
            ProgressMsg::SolverIteration { iter, progress, .. } => {
                seen_in_thread.lock().unwrap().push((iter, progress));
            }
            ProgressMsg::Message { message } => notes_in_thread.lock().unwrap().push(message),
            ProgressMsg::SnapshotRecorded { .. } => {}
        });

        let mut solver = HarmonicDiffusion::new(&mesh, 1.0, DiffusionParams::default())
            .unwrap()
            .progress_callback(sink);
        solver.constrain_borders(0.0);
        let outcome = solver.solve();
        drop(solver);
        handle.join().unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), outcome.iterations);
        assert_eq!(seen.last().unwrap().0, outcome.iterations);
        assert_eq!(seen.last().unwrap().1, 1.0);
        assert!(seen.iter().all(|&(_, p)| (0.0..=1.0).contains(&p)));

        let notes = notes.lock().unwrap();
        assert_eq!(notes.as_slice(), &["diffusing field over 9 vertices (8 constrained)".to_string()]);
    }

    #[test]
    fn far_positions_snap_unless_a_tolerance_is_set() {
        let mesh = generate_grid2d_mesh(5, 4.0).unwrap();
        let far = Point2::new([1.0e6, 1.0e6]);

        let mut open = HarmonicDiffusion::new(&mesh, 0.0, DiffusionParams::default()).unwrap();
        let v = open.add_constraint(&far, 1.0).unwrap();
        assert_eq!(mesh.vertices()[v], Point2::new([2.0, 2.0]));
        assert!(mesh.is_border(v));

        let params = DiffusionParams::builder().constraint_tolerance(0.5).build().unwrap();
        let mut strict = HarmonicDiffusion::new(&mesh, 0.0, params).unwrap();
        assert!(matches!(
            strict.add_constraint(&far, 1.0),
            Err(Error::ConstraintNotFound { tolerance, .. }) if tolerance == 0.5
        ));
        assert_eq!(strict.state(), SolverState::Unconstrained);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let mesh = generate_grid2d_mesh(3, 2.0).unwrap();
        let params = DiffusionParams {
            max_iter: 0,
            ..DiffusionParams::default()
        };
        assert!(matches!(
            HarmonicDiffusion::new(&mesh, 0.0, params),
            Err(Error::InvalidParameter { name: "max_iter", .. })
        ));
    }
}
