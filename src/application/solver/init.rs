//! Vertex initialization for the barrier Frank-Wolfe optimizer.
//!
//! Probes every free security with the solver, once fixed to 0 and once
//! fixed to 1. A security where only one probe is feasible is not actually
//! free and gets settled. Every feasible probe contributes a vertex, and the
//! vertices' centroid becomes the optimizer's starting interior point.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::domain::error::DomainError;
use crate::domain::model::ConstraintModel;
use crate::domain::outcome::PartialOutcome;
use crate::domain::vertex::VertexSet;
use crate::port::outbound::solver::{FeasibilityResult, Solver};

/// Starting point for the optimizer.
#[derive(Debug, Clone)]
pub struct InitResult {
    /// Distinct feasible vertices found while probing.
    pub vertices: VertexSet,
    /// Centroid of `vertices`, or 0.5 everywhere when none were found.
    pub interior_point: Vec<f64>,
    /// Input settlements plus everything forced during probing.
    pub partial_outcome: PartialOutcome,
    /// Securities still free after probing.
    pub unsettled_indices: Vec<usize>,
    /// Wall-clock time spent.
    pub elapsed: Duration,
    /// At least one probe hit the solver deadline.
    pub timed_out: bool,
}

impl InitResult {
    /// Number of distinct vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Probe the model and collect starting vertices.
///
/// Probing runs in index order against the evolving partial outcome, so the
/// same model and input settlements always give the same vertex set.
///
/// # Errors
///
/// Returns [`DomainError::ConflictingSettlement`] only if the solver reports
/// results that contradict an earlier settlement.
pub fn initialize(
    solver: &dyn Solver,
    model: &ConstraintModel,
    settled: &PartialOutcome,
) -> Result<InitResult, DomainError> {
    let start = Instant::now();
    let dimension = model.dimension();
    let constraints = model.constraints();

    let mut partial = settled.clone();
    let mut vertices = VertexSet::new();
    let mut timed_out = false;

    for index in 0..dimension {
        if partial.is_settled(index) {
            continue;
        }

        let zero =
            solver.find_vertex_with_fixed_coordinate(dimension, constraints, &partial, index, false);
        let one =
            solver.find_vertex_with_fixed_coordinate(dimension, constraints, &partial, index, true);

        timed_out |= zero.is_timeout() || one.is_timeout();
        let forced = match (&zero, &one) {
            (FeasibilityResult::Feasible(_), FeasibilityResult::Infeasible) => Some(false),
            (FeasibilityResult::Infeasible, FeasibilityResult::Feasible(_)) => Some(true),
            _ => None,
        };

        for probe in [zero, one] {
            if let Some(vertex) = probe.vertex() {
                vertices.insert(vertex);
            }
        }

        if let Some(value) = forced {
            debug!(index, value, "Security settled by constraints");
            partial.settle(index, value)?;
        }
    }

    if vertices.is_empty() {
        match solver.find_feasible(dimension, constraints, &partial) {
            FeasibilityResult::Feasible(vertex) => {
                vertices.insert(vertex);
            }
            FeasibilityResult::Timeout => timed_out = true,
            FeasibilityResult::Infeasible => {}
        }
    }

    let interior_point = vertices.centroid().unwrap_or_else(|| vec![0.5; dimension]);
    let elapsed = start.elapsed();

    if timed_out {
        warn!(
            solver = solver.name(),
            dimension,
            vertices = vertices.len(),
            "Initialization hit the solver deadline"
        );
    } else {
        debug!(
            solver = solver.name(),
            dimension,
            vertices = vertices.len(),
            settled = partial.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Initialization complete"
        );
    }

    Ok(InitResult {
        vertices,
        interior_point,
        unsettled_indices: partial.unsettled_indices(dimension),
        partial_outcome: partial,
        elapsed,
        timed_out,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::adapter::outbound::solver::BranchBoundSolver;
    use crate::domain::vertex::Vertex;

    fn exactly_one(n: usize) -> ConstraintModel {
        let mut model = ConstraintModel::new(n);
        let all: Vec<usize> = (0..n).collect();
        model.add_exactly_one(&all).unwrap();
        model
    }

    #[test]
    fn binary_market_has_two_vertices_and_centered_interior() {
        let result =
            initialize(&BranchBoundSolver::default(), &exactly_one(2), &PartialOutcome::new())
                .unwrap();

        assert_eq!(result.vertex_count(), 2);
        assert_eq!(result.interior_point, vec![0.5, 0.5]);
        assert_eq!(result.unsettled_indices, vec![0, 1]);
        assert!(!result.timed_out);
    }

    #[test]
    fn pre_settled_index_is_excluded_and_fixed_in_vertices() {
        let settled = PartialOutcome::new().with(0, false).unwrap();
        let result =
            initialize(&BranchBoundSolver::default(), &exactly_one(3), &settled).unwrap();

        assert!(!result.unsettled_indices.contains(&0));
        assert_eq!(result.unsettled_indices, vec![1, 2]);
        assert!(result.vertex_count() > 0);
        for vertex in &result.vertices {
            assert_eq!(vertex.bits()[0], 0);
        }
    }

    #[test]
    fn implication_forces_settlement() {
        // x0 = 1 is required and x0 implies x1.
        let mut model = ConstraintModel::new(2);
        model
            .add_constraint(crate::domain::Constraint::eq(vec![1.0, 0.0], 1.0))
            .unwrap();
        model.add_implication(0, 1).unwrap();

        let result =
            initialize(&BranchBoundSolver::default(), &model, &PartialOutcome::new()).unwrap();

        assert_eq!(result.partial_outcome.get(0), Some(true));
        assert_eq!(result.partial_outcome.get(1), Some(true));
        assert!(result.unsettled_indices.is_empty());
        assert_eq!(result.vertex_count(), 1);
        assert!(result.vertices.contains(&Vertex::from_bits(vec![1, 1])));
    }

    #[test]
    fn infeasible_model_yields_no_vertices_and_uniform_interior() {
        let mut model = exactly_one(2);
        model.add_implication(0, 1).unwrap();
        model.add_implication(1, 0).unwrap();

        let result =
            initialize(&BranchBoundSolver::default(), &model, &PartialOutcome::new()).unwrap();

        assert_eq!(result.vertex_count(), 0);
        assert_eq!(result.interior_point, vec![0.5, 0.5]);
        assert!(!result.timed_out);
    }

    #[test]
    fn timeout_is_flagged_and_settles_nothing() {
        let solver = BranchBoundSolver::with_timeout(Duration::ZERO);
        let result = initialize(&solver, &exactly_one(3), &PartialOutcome::new()).unwrap();

        assert!(result.timed_out);
        assert!(result.partial_outcome.is_empty());
        assert_eq!(result.vertex_count(), 0);
    }

    #[test]
    fn repeated_runs_find_the_same_vertices() {
        let mut model = ConstraintModel::new(4);
        model.add_exactly_one(&[0, 1]).unwrap();
        model.add_exactly_one(&[2, 3]).unwrap();
        model.add_implication(0, 2).unwrap();
        let solver = BranchBoundSolver::default();

        let first = initialize(&solver, &model, &PartialOutcome::new()).unwrap();
        let second = initialize(&solver, &model, &PartialOutcome::new()).unwrap();

        let a: HashSet<Vertex> = first.vertices.iter().cloned().collect();
        let b: HashSet<Vertex> = second.vertices.iter().cloned().collect();
        assert_eq!(a, b);
        assert_eq!(first.interior_point, second.interior_point);
    }
}
