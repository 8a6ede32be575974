//! HiGHS solver implementation via good_lp.
//!
//! HiGHS is a high-performance open-source linear/mixed-integer programming
//! solver. Feasibility is answered exactly as a binary ILP with a zero
//! objective and linear minimization is solved to optimality. The HiGHS call
//! is not interrupted; [`FeasibilityResult::Timeout`] stands for any solver
//! failure that is not a proof of infeasibility, so the caller retries.

use good_lp::solvers::highs::highs;
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable,
};
use tracing::warn;

use crate::domain::constraint::{Constraint, ConstraintSense, VariableBounds};
use crate::domain::outcome::PartialOutcome;
use crate::domain::vertex::Vertex;
use crate::port::outbound::solver::{
    FeasibilityResult, LpProblem, LpSolution, SolutionStatus, Solver,
};

/// HiGHS-based feasibility and LP solver.
#[derive(Debug, Default, Clone)]
pub struct HighsSolver;

impl HighsSolver {
    /// Create a new HiGHS solver instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Solver for HighsSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn find_feasible(
        &self,
        dimension: usize,
        constraints: &[Constraint],
        fixed: &PartialOutcome,
    ) -> FeasibilityResult {
        let problem = LpProblem {
            objective: vec![0.0; dimension],
            constraints: constraints.to_vec(),
            bounds: fixed.to_bounds(dimension),
        };
        feasibility(solve_with_good_lp(&problem, true))
    }

    fn minimize_linear(&self, problem: &LpProblem) -> LpSolution {
        let n = problem.num_vars();
        match solve_with_good_lp(problem, false) {
            Ok(values) => {
                let objective = values.iter().zip(&problem.objective).map(|(x, c)| x * c).sum();
                LpSolution {
                    values,
                    objective,
                    status: SolutionStatus::Optimal,
                }
            }
            Err(e) => LpSolution {
                values: vec![0.0; n],
                objective: 0.0,
                status: match e {
                    ResolutionError::Infeasible => SolutionStatus::Infeasible,
                    _ => SolutionStatus::Error,
                },
            },
        }
    }
}

fn feasibility(solved: Result<Vec<f64>, ResolutionError>) -> FeasibilityResult {
    match solved {
        Ok(values) => FeasibilityResult::Feasible(Vertex::round(&values)),
        Err(ResolutionError::Infeasible) => FeasibilityResult::Infeasible,
        Err(e) => {
            warn!(error = %e, "HiGHS feasibility search failed, treating as inconclusive");
            FeasibilityResult::Timeout
        }
    }
}

fn solve_with_good_lp(problem: &LpProblem, integer: bool) -> Result<Vec<f64>, ResolutionError> {
    let n = problem.num_vars();
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut vars = variables!();
    let var_list: Vec<Variable> = (0..n)
        .map(|i| {
            let bounds = problem.bounds.get(i).copied().unwrap_or_else(VariableBounds::binary);
            let mut v = variable().min(bounds.lower).max(bounds.upper);
            if integer {
                v = v.integer();
            }
            vars.add(v)
        })
        .collect();

    let objective: Expression = var_list
        .iter()
        .zip(&problem.objective)
        .map(|(v, &c)| c * *v)
        .sum();

    let mut model = vars.minimise(&objective).using(highs);

    for constr in &problem.constraints {
        let lhs: Expression = var_list
            .iter()
            .zip(&constr.coefficients)
            .map(|(v, &c)| c * *v)
            .sum();
        let rhs = constr.rhs;

        model = match constr.sense {
            ConstraintSense::GreaterEqual => model.with(constraint!(lhs >= rhs)),
            ConstraintSense::LessEqual => model.with(constraint!(lhs <= rhs)),
            ConstraintSense::Equal => model.with(constraint!(lhs == rhs)),
        };
    }

    let solution = model.solve()?;
    Ok(var_list.iter().map(|v| solution.value(*v)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ConstraintModel;

    #[test]
    fn finds_vertex_of_exactly_one() {
        let mut model = ConstraintModel::new(3);
        model.add_exactly_one(&[0, 1, 2]).unwrap();

        let result = HighsSolver::new().find_feasible(3, model.constraints(), &PartialOutcome::new());
        let FeasibilityResult::Feasible(vertex) = result else {
            panic!("expected a vertex, got {result:?}");
        };
        assert!(model.is_satisfied_by(&vertex.to_point()));
    }

    #[test]
    fn contradiction_is_infeasible() {
        let mut model = ConstraintModel::new(2);
        model.add_exactly_one(&[0, 1]).unwrap();
        model.add_implication(0, 1).unwrap();
        model.add_implication(1, 0).unwrap();

        assert!(!HighsSolver::new().check_feasibility(2, model.constraints()));
    }

    #[test]
    fn solver_failure_is_not_infeasibility() {
        assert_eq!(
            feasibility(Err(ResolutionError::Unbounded)),
            FeasibilityResult::Timeout
        );
        assert_eq!(
            feasibility(Err(ResolutionError::Other("numerical trouble"))),
            FeasibilityResult::Timeout
        );
        assert_eq!(
            feasibility(Err(ResolutionError::Infeasible)),
            FeasibilityResult::Infeasible
        );
    }

    #[test]
    fn minimizes_over_simplex() {
        let mut problem = LpProblem::new(2);
        problem.objective = vec![1.0, -1.0];
        problem.constraints = vec![Constraint::eq(vec![1.0, 1.0], 1.0)];

        let solution = HighsSolver::new().minimize_linear(&problem);

        assert!(solution.is_optimal());
        assert!((solution.objective + 1.0).abs() < 1e-6);
    }
}
