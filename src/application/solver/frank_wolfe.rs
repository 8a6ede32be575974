//! Barrier Frank-Wolfe algorithm for Bregman projection.
//!
//! The Frank-Wolfe (conditional gradient) algorithm solves:
//!
//! ```text
//! min_{mu in M} D(mu || theta)
//! ```
//!
//! where D is the LMSR Bregman divergence and M is the marginal polytope,
//! the convex hull of the feasible outcome vertices.
//!
//! Each iteration asks a linear minimization oracle for the vertex that most
//! decreases the divergence, then moves toward it with a golden-section line
//! search. Candidates touching the boundary of the unit cube score `+inf`,
//! which acts as a log barrier keeping the iterate interior.

use tracing::{debug, trace};

use super::bregman::{bregman_divergence, bregman_gradient};
use super::init::InitResult;
use crate::domain::constraint::VariableBounds;
use crate::domain::market_state::MarketState;
use crate::domain::model::ConstraintModel;
use crate::domain::vertex::{MarginalPoint, Vertex, VertexSet};
use crate::port::outbound::solver::{LpProblem, Solver};

/// Iterates are kept in `[MU_LOWER, MU_UPPER]`.
pub const MU_LOWER: f64 = 0.01;
/// Upper clamp for iterates.
pub const MU_UPPER: f64 = 0.99;
/// Largest step taken toward the oracle vertex.
pub const DEFAULT_MAX_STEP: f64 = 0.5;
/// Bracket width at which the golden-section search stops.
pub const LINE_SEARCH_TOLERANCE: f64 = 1e-4;

/// Configuration for the Frank-Wolfe algorithm.
#[derive(Debug, Clone)]
pub struct FrankWolfeConfig {
    /// Maximum number of iterations before terminating.
    pub max_iterations: usize,
    /// Convergence tolerance for the Frank-Wolfe gap.
    pub tolerance: f64,
    /// Fraction of the divergence that must be captured before stopping early.
    pub alpha: f64,
    /// Cap on the line-search step.
    pub max_step: f64,
}

impl Default for FrankWolfeConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
            alpha: 0.9,
            max_step: DEFAULT_MAX_STEP,
        }
    }
}

/// Why the optimizer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The gap fell below tolerance.
    Converged,
    /// The line search found no step that lowers the divergence. The gap is
    /// still at or above tolerance but bounds the iterate as usual.
    Stalled,
    /// The gap became a small enough fraction of the divergence.
    AlphaExtracted,
    /// `max_iterations` was reached.
    IterationLimit,
    /// The oracle produced no vertex.
    OracleExhausted,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Converged => write!(f, "converged"),
            Self::Stalled => write!(f, "stalled"),
            Self::AlphaExtracted => write!(f, "alpha extracted"),
            Self::IterationLimit => write!(f, "iteration limit"),
            Self::OracleExhausted => write!(f, "oracle exhausted"),
        }
    }
}

/// Result of a Frank-Wolfe projection.
#[derive(Debug, Clone)]
pub struct FrankWolfeResult {
    /// Final iterate: arbitrage-free marginal prices.
    pub mu: Vec<f64>,
    /// Last Frank-Wolfe gap.
    pub gap: f64,
    /// Bregman divergence at `mu`.
    pub divergence: f64,
    /// Number of iterations executed.
    pub iterations: usize,
    /// Active vertex set at termination.
    pub vertices: VertexSet,
    /// Whether the gap fell below tolerance. Implies `gap < tolerance`.
    pub converged: bool,
    /// Why the loop ended.
    pub stop_reason: StopReason,
}

/// Frank-Wolfe algorithm implementation.
#[derive(Debug, Clone, Default)]
pub struct FrankWolfe {
    config: FrankWolfeConfig,
}

impl FrankWolfe {
    /// Create a new Frank-Wolfe instance with the given configuration.
    #[must_use]
    pub const fn new(config: FrankWolfeConfig) -> Self {
        Self { config }
    }

    /// Return the current configuration.
    #[must_use]
    pub const fn config(&self) -> &FrankWolfeConfig {
        &self.config
    }

    /// Minimize `D(mu || theta)` over the polytope of `model`.
    ///
    /// Starts from the initializer's interior point and active vertex set.
    /// Settled securities stay fixed in every oracle call.
    pub fn optimize(
        &self,
        state: &MarketState,
        model: &ConstraintModel,
        init: &InitResult,
        solver: &dyn Solver,
    ) -> FrankWolfeResult {
        let prices = state.prices();
        let dimension = model.dimension();
        let bounds = init.partial_outcome.to_bounds(dimension);

        let mut active = init.vertices.clone();
        let mut mu = MarginalPoint::clamped(init.interior_point.clone(), MU_LOWER, MU_UPPER);
        let mut divergence = bregman_divergence(mu.as_slice(), &prices);
        let mut gap = f64::INFINITY;
        let mut iterations = 0;
        let mut stop_reason = StopReason::IterationLimit;

        while iterations < self.config.max_iterations {
            iterations += 1;

            let grad = bregman_gradient(mu.as_slice(), &prices);

            let Some(vertex) = self.oracle(&grad, &active, model, bounds.clone(), solver) else {
                stop_reason = StopReason::OracleExhausted;
                break;
            };

            gap = -grad
                .iter()
                .zip(mu.as_slice())
                .enumerate()
                .map(|(i, (g, m))| g * (vertex.coord(i) - m))
                .sum::<f64>();

            if gap < self.config.tolerance {
                stop_reason = StopReason::Converged;
                break;
            }

            let step = self.line_search(&mu, &vertex, &prices);
            let candidate = MarginalPoint::clamped(mu.toward(&vertex, step), MU_LOWER, MU_UPPER);
            let next_divergence = bregman_divergence(candidate.as_slice(), &prices);

            trace!(iteration = iterations, gap, step, divergence = next_divergence, "Frank-Wolfe step");

            // A discarded step keeps `gap` and `divergence` on the same iterate.
            if step < LINE_SEARCH_TOLERANCE || next_divergence >= divergence {
                stop_reason = StopReason::Stalled;
                break;
            }

            mu = candidate;
            divergence = next_divergence;
            active.insert(vertex);

            if divergence > 0.0 && gap / divergence < 1.0 - self.config.alpha {
                stop_reason = StopReason::AlphaExtracted;
                break;
            }
        }

        debug!(
            iterations,
            gap,
            divergence,
            vertices = active.len(),
            stop = %stop_reason,
            "Frank-Wolfe finished"
        );

        FrankWolfeResult {
            mu: mu.into_inner(),
            gap,
            divergence,
            iterations,
            vertices: active,
            converged: stop_reason == StopReason::Converged,
            stop_reason,
        }
    }

    /// Vertex minimizing `<grad, v>` among known vertices and the solver's
    /// rounded relaxation.
    fn oracle(
        &self,
        grad: &[f64],
        active: &VertexSet,
        model: &ConstraintModel,
        bounds: Vec<VariableBounds>,
        solver: &dyn Solver,
    ) -> Option<Vertex> {
        let problem = LpProblem {
            objective: grad.to_vec(),
            constraints: model.constraints().to_vec(),
            bounds,
        };
        let relaxed = solver.minimize_linear(&problem);
        let candidate = Some(Vertex::round(&relaxed.values))
            .filter(|v| v.len() == model.dimension() && model.is_satisfied_by(&v.to_point()));

        let known = active.argmin(grad);
        match (known, candidate) {
            (Some((v, best)), Some(c)) => {
                if c.dot(grad) < best {
                    Some(c)
                } else {
                    Some(v.clone())
                }
            }
            (Some((v, _)), None) => Some(v.clone()),
            (None, c) => c,
        }
    }

    /// Golden-section search of `D((1 - a) * mu + a * v)` over `a` in [0, 1],
    /// capped at `max_step`.
    fn line_search(&self, mu: &MarginalPoint, vertex: &Vertex, prices: &[f64]) -> f64 {
        let objective = |alpha: f64| {
            let point = mu.toward(vertex, alpha);
            if point.iter().any(|&x| x <= 0.0 || x >= 1.0) {
                return f64::INFINITY;
            }
            bregman_divergence(&point, prices)
        };

        golden_section(objective, 0.0, 1.0, LINE_SEARCH_TOLERANCE).min(self.config.max_step)
    }
}

fn golden_section(f: impl Fn(f64) -> f64, lower: f64, upper: f64, tolerance: f64) -> f64 {
    let inv_phi = (5f64.sqrt() - 1.0) / 2.0;
    let (mut a, mut b) = (lower, upper);
    let mut c = b - inv_phi * (b - a);
    let mut d = a + inv_phi * (b - a);
    let (mut fc, mut fd) = (f(c), f(d));

    while b - a > tolerance {
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - inv_phi * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + inv_phi * (b - a);
            fd = f(d);
        }
    }
    (a + b) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::solver::BranchBoundSolver;
    use crate::application::solver::init::initialize;
    use crate::domain::outcome::PartialOutcome;

    fn binary_market() -> ConstraintModel {
        let mut model = ConstraintModel::new(2);
        model.add_exactly_one(&[0, 1]).unwrap();
        model
    }

    fn run(prices: &[f64], model: &ConstraintModel) -> FrankWolfeResult {
        let solver = BranchBoundSolver::default();
        let init = initialize(&solver, model, &PartialOutcome::new()).unwrap();
        let state = MarketState::from_prices(prices, 100.0);
        FrankWolfe::default().optimize(&state, model, &init, &solver)
    }

    #[test]
    fn golden_section_finds_parabola_minimum() {
        let x = golden_section(|x| (x - 0.3) * (x - 0.3), 0.0, 1.0, 1e-6);
        assert!((x - 0.3).abs() < 1e-5);
    }

    #[test]
    fn fair_market_has_no_exploitable_divergence() {
        let result = run(&[0.6, 0.4], &binary_market());

        assert!(result.divergence < 0.01, "{result:?}");
        assert!((result.mu[0] - 0.6).abs() < 0.01);
    }

    #[test]
    fn converged_flag_implies_gap_below_tolerance() {
        let model = binary_market();
        let tolerance = FrankWolfeConfig::default().tolerance;

        for prices in [[0.6, 0.4], [0.55, 0.53], [0.7, 0.5], [0.5, 0.5]] {
            let result = run(&prices, &model);

            assert_eq!(result.converged, result.stop_reason == StopReason::Converged);
            if result.converged {
                assert!(result.gap < tolerance, "{prices:?}: {result:?}");
            }
            if result.stop_reason == StopReason::Stalled {
                assert!(!result.converged, "{prices:?}: {result:?}");
                assert!(result.gap >= tolerance, "{prices:?}: {result:?}");
            }
        }
    }

    #[test]
    fn overround_market_keeps_positive_divergence() {
        let result = run(&[0.55, 0.53], &binary_market());

        assert!(result.divergence > 0.0, "{result:?}");
        assert!(result.iterations >= 1);
    }

    #[test]
    fn iterate_stays_strictly_interior() {
        let result = run(&[0.97, 0.03], &binary_market());

        for &m in &result.mu {
            assert!((MU_LOWER..=MU_UPPER).contains(&m));
        }
    }

    #[test]
    fn empty_oracle_stops_immediately() {
        let mut model = binary_market();
        model.add_implication(0, 1).unwrap();
        model.add_implication(1, 0).unwrap();

        let result = run(&[0.5, 0.5], &model);

        assert_eq!(result.stop_reason, StopReason::OracleExhausted);
        assert_eq!(result.iterations, 1);
        assert!(!result.converged);
    }

    #[test]
    fn iteration_cap_is_reported() {
        let model = binary_market();
        let solver = BranchBoundSolver::default();
        let init = initialize(&solver, &model, &PartialOutcome::new()).unwrap();
        let state = MarketState::from_prices(&[0.8, 0.2], 100.0);
        let fw = FrankWolfe::new(FrankWolfeConfig {
            max_iterations: 1,
            alpha: 0.999_999,
            ..FrankWolfeConfig::default()
        });

        let result = fw.optimize(&state, &model, &init, &solver);

        assert_eq!(result.iterations, 1);
        assert_eq!(result.stop_reason, StopReason::IterationLimit);
    }

    fn implication_model() -> ConstraintModel {
        let mut model = ConstraintModel::new(4);
        model.add_exactly_one(&[0, 1]).unwrap();
        model.add_exactly_one(&[2, 3]).unwrap();
        model.add_implication(0, 2).unwrap();
        model
    }

    fn run_two_markets(prices: &[f64]) -> FrankWolfeResult {
        let model = implication_model();
        let solver = BranchBoundSolver::default();
        let init = initialize(&solver, &model, &PartialOutcome::new()).unwrap();
        let state = MarketState::from_prices(prices, 100.0).with_mass(2.0);
        FrankWolfe::default().optimize(&state, &model, &init, &solver)
    }

    #[test]
    fn consistent_correlated_prices_have_no_divergence() {
        let result = run_two_markets(&[0.3, 0.7, 0.7, 0.3]);

        assert!(result.divergence < 0.01, "{result:?}");
    }

    #[test]
    fn violated_implication_keeps_divergence() {
        // P(a) = 0.7 above P(b) = 0.2 although a implies b.
        let result = run_two_markets(&[0.7, 0.3, 0.2, 0.8]);

        assert!(result.divergence > 0.2, "{result:?}");
        assert!(result.mu[0] <= result.mu[2] + 0.02, "{result:?}");
        assert!(!result.vertices.is_empty());
    }
}
