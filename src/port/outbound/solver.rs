//! Solver port for binary feasibility search and linear minimization.
//!
//! Defines the interface the vertex initializer and the Frank-Wolfe oracle use
//! to reason about the polytope of admissible outcome vectors.
//!
//! # Overview
//!
//! - [`Solver`]: feasibility search plus linear-relaxation minimization
//! - [`FeasibilityResult`]: feasible vertex, infeasible, or out of time
//! - [`LpProblem`] / [`LpSolution`]: linear minimization over bounded variables

use crate::domain::constraint::{Constraint, VariableBounds};
use crate::domain::outcome::PartialOutcome;
use crate::domain::vertex::Vertex;

/// Outcome of a binary feasibility search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeasibilityResult {
    /// A complete 0/1 assignment satisfying every constraint.
    Feasible(Vertex),
    /// The search space was exhausted without a solution.
    Infeasible,
    /// The deadline passed before the search finished.
    Timeout,
}

impl FeasibilityResult {
    /// Return `true` for a feasible result.
    #[must_use]
    pub const fn is_feasible(&self) -> bool {
        matches!(self, Self::Feasible(_))
    }

    /// Return `true` for a proven-infeasible result.
    #[must_use]
    pub const fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible)
    }

    /// Return `true` if the deadline was hit.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// The vertex, if one was found.
    #[must_use]
    pub fn vertex(self) -> Option<Vertex> {
        match self {
            Self::Feasible(v) => Some(v),
            Self::Infeasible | Self::Timeout => None,
        }
    }
}

/// Binary feasibility and linear minimization solver.
///
/// Implementations wrap specific backends (built-in branch-and-bound, HiGHS)
/// and provide a unified interface to the optimizer.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`) so distinct market
/// groups can be analyzed concurrently with one shared solver.
pub trait Solver: Send + Sync {
    /// Return the solver name for logging and configuration.
    fn name(&self) -> &'static str;

    /// Find any 0/1 vector of length `dimension` satisfying `constraints`
    /// and agreeing with every settled security in `fixed`.
    fn find_feasible(
        &self,
        dimension: usize,
        constraints: &[Constraint],
        fixed: &PartialOutcome,
    ) -> FeasibilityResult;

    /// Minimize `objective · x` subject to the constraints and bounds.
    fn minimize_linear(&self, problem: &LpProblem) -> LpSolution;

    /// Return `true` when some binary vector satisfies `constraints`.
    ///
    /// A timeout is reported as `false`.
    fn check_feasibility(&self, dimension: usize, constraints: &[Constraint]) -> bool {
        self.find_feasible(dimension, constraints, &PartialOutcome::new())
            .is_feasible()
    }

    /// Search for a vertex with security `index` forced to `value` on top of
    /// the settled securities in `base`.
    ///
    /// A `base` that already settles `index` to the other value is reported
    /// as [`FeasibilityResult::Infeasible`].
    fn find_vertex_with_fixed_coordinate(
        &self,
        dimension: usize,
        constraints: &[Constraint],
        base: &PartialOutcome,
        index: usize,
        value: bool,
    ) -> FeasibilityResult {
        match base.with(index, value) {
            Ok(fixed) => self.find_feasible(dimension, constraints, &fixed),
            Err(_) => FeasibilityResult::Infeasible,
        }
    }
}

/// Linear programming problem definition.
///
/// Represents a minimization problem of the form:
///
/// ```text
/// minimize    c^T * x
/// subject to  constraints
///             bounds on x
/// ```
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Objective function coefficients.
    pub objective: Vec<f64>,

    /// Linear constraints on the variables.
    pub constraints: Vec<Constraint>,

    /// Lower and upper bounds for each variable.
    pub bounds: Vec<VariableBounds>,
}

impl LpProblem {
    /// Create a new LP problem with the specified number of variables.
    ///
    /// Initializes all objective coefficients to zero and all variable bounds
    /// to [0, 1].
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            objective: vec![0.0; num_vars],
            constraints: Vec::new(),
            bounds: vec![VariableBounds::default(); num_vars],
        }
    }

    /// Return the number of decision variables.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }
}

/// Solution to a linear programming problem.
#[derive(Debug, Clone)]
pub struct LpSolution {
    /// Values for each decision variable.
    pub values: Vec<f64>,

    /// Objective function value at `values`.
    pub objective: f64,

    /// Termination status of the solver.
    pub status: SolutionStatus,
}

impl LpSolution {
    /// Return `true` if the solver found a feasible optimum.
    #[must_use]
    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}

/// Termination status of an optimization solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// Solver found a feasible optimum.
    Optimal,

    /// No feasible point was found.
    Infeasible,

    /// Solver encountered an internal error.
    Error,
}
