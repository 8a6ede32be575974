//! Built-in depth-first branch-and-bound solver.
//!
//! Feasibility search assigns securities in index order, trying 0 before 1.
//! Each node recomputes every constraint's achievable left-hand-side interval
//! and prunes as soon as one cannot reach its bound. Every branch owns its
//! assignment, so nothing is undone on backtrack.
//!
//! Linear minimization is approximate: it starts each coordinate at its
//! cheaper bound and projects the point back onto violated constraints.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::domain::constraint::Constraint;
use crate::domain::outcome::PartialOutcome;
use crate::domain::vertex::Vertex;
use crate::port::outbound::solver::{
    FeasibilityResult, LpProblem, LpSolution, SolutionStatus, Solver,
};

/// Default wall-clock budget for one feasibility search.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of projection sweeps in [`BranchBoundSolver::minimize_linear`].
pub const DEFAULT_PROJECTION_ITERATIONS: usize = 100;

/// Tuning for [`BranchBoundSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Deadline for each feasibility search.
    pub timeout: Duration,
    /// Maximum projection sweeps during linear minimization.
    pub projection_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            projection_iterations: DEFAULT_PROJECTION_ITERATIONS,
        }
    }
}

/// Branch-and-bound feasibility solver with an approximate LP minimizer.
#[derive(Debug, Default, Clone)]
pub struct BranchBoundSolver {
    config: SolverConfig,
}

impl BranchBoundSolver {
    /// Create a solver with the given configuration.
    #[must_use]
    pub const fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Create a solver with the default projection budget and a custom timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(SolverConfig {
            timeout,
            ..SolverConfig::default()
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }
}

impl Solver for BranchBoundSolver {
    fn name(&self) -> &'static str {
        "branch_bound"
    }

    fn find_feasible(
        &self,
        dimension: usize,
        constraints: &[Constraint],
        fixed: &PartialOutcome,
    ) -> FeasibilityResult {
        let mut search = Search {
            constraints,
            deadline: Instant::now() + self.config.timeout,
            nodes: 0,
        };
        let result = search.explore(fixed.to_assignment(dimension));

        debug!(
            solver = self.name(),
            dimension,
            settled = fixed.len(),
            nodes = search.nodes,
            feasible = result.is_feasible(),
            timeout = result.is_timeout(),
            "Feasibility search finished"
        );
        result
    }

    fn minimize_linear(&self, problem: &LpProblem) -> LpSolution {
        let bounds = |i: usize| problem.bounds.get(i).copied().unwrap_or_default();

        let mut x: Vec<f64> = problem
            .objective
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let b = bounds(i);
                if c < 0.0 {
                    b.upper
                } else {
                    b.lower
                }
            })
            .collect();

        let mut sweeps = 0;
        for _ in 0..self.config.projection_iterations {
            sweeps += 1;
            let mut moved = false;
            for constraint in &problem.constraints {
                let violation = constraint.violation(constraint.lhs(&x));
                let norm = constraint.norm_squared();
                if violation == 0.0 || norm <= f64::EPSILON {
                    continue;
                }
                moved = true;
                let step = violation / norm;
                for (i, (xi, a)) in x.iter_mut().zip(&constraint.coefficients).enumerate() {
                    *xi = bounds(i).clamp(*xi + step * a);
                }
            }
            if !moved {
                break;
            }
        }

        let feasible = problem.constraints.iter().all(|c| c.is_satisfied_by(&x));
        let objective: f64 = x.iter().zip(&problem.objective).map(|(x, c)| x * c).sum();
        trace!(sweeps, feasible, objective, "Linear minimization finished");

        LpSolution {
            values: x,
            objective,
            status: if feasible {
                SolutionStatus::Optimal
            } else {
                SolutionStatus::Infeasible
            },
        }
    }
}

struct Search<'a> {
    constraints: &'a [Constraint],
    deadline: Instant,
    nodes: usize,
}

impl Search<'_> {
    fn explore(&mut self, assignment: Vec<Option<bool>>) -> FeasibilityResult {
        self.nodes += 1;
        if Instant::now() >= self.deadline {
            return FeasibilityResult::Timeout;
        }
        if !self.consistent(&assignment) {
            return FeasibilityResult::Infeasible;
        }

        let Some(next) = assignment.iter().position(Option::is_none) else {
            let values: Vec<bool> = assignment.iter().map(|v| v.unwrap_or(false)).collect();
            return FeasibilityResult::Feasible(Vertex::from_assignment(&values));
        };

        for value in [false, true] {
            let mut branch = assignment.clone();
            branch[next] = Some(value);
            match self.explore(branch) {
                FeasibilityResult::Infeasible => {}
                found => return found,
            }
        }
        FeasibilityResult::Infeasible
    }

    /// Every constraint can still reach its bound given the partial assignment.
    fn consistent(&self, assignment: &[Option<bool>]) -> bool {
        self.constraints.iter().all(|constraint| {
            let (mut min_lhs, mut max_lhs) = (0.0, 0.0);
            for (&a, value) in constraint.coefficients.iter().zip(assignment) {
                match value {
                    Some(true) => {
                        min_lhs += a;
                        max_lhs += a;
                    }
                    Some(false) => {}
                    None => {
                        min_lhs += f64::min(a, 0.0);
                        max_lhs += f64::max(a, 0.0);
                    }
                }
            }
            constraint.admits_interval(min_lhs, max_lhs)
        })
    }
}
