//! Linear constraint types over binary securities.
//!
//! These types are shared by the constraint model (market structure) and the
//! solver port (feasibility search and linear minimization).

use serde::{Deserialize, Serialize};

/// Slack used when comparing a left-hand side against its bound.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-9;

/// A single linear constraint: `sum(coeffs[i] * x[i]) {>=, <=, =} rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Coefficients for each variable (dense, one per security).
    pub coefficients: Vec<f64>,
    /// Constraint sense (>=, <=, =).
    pub sense: ConstraintSense,
    /// Right-hand side value.
    pub rhs: f64,
}

impl Constraint {
    /// Create a >= constraint.
    #[must_use]
    pub const fn geq(coefficients: Vec<f64>, rhs: f64) -> Self {
        Self {
            coefficients,
            sense: ConstraintSense::GreaterEqual,
            rhs,
        }
    }

    /// Create a <= constraint.
    #[must_use]
    pub const fn leq(coefficients: Vec<f64>, rhs: f64) -> Self {
        Self {
            coefficients,
            sense: ConstraintSense::LessEqual,
            rhs,
        }
    }

    /// Create an = constraint.
    #[must_use]
    pub const fn eq(coefficients: Vec<f64>, rhs: f64) -> Self {
        Self {
            coefficients,
            sense: ConstraintSense::Equal,
            rhs,
        }
    }

    /// Evaluate the left-hand side at `point`.
    #[must_use]
    pub fn lhs(&self, point: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(point.iter())
            .map(|(a, x)| a * x)
            .sum()
    }

    /// Signed amount by which `lhs` misses the bound, zero when satisfied.
    ///
    /// Positive means the left-hand side must grow, negative that it must shrink.
    #[must_use]
    pub fn violation(&self, lhs: f64) -> f64 {
        match self.sense {
            ConstraintSense::LessEqual if lhs > self.rhs + FEASIBILITY_TOLERANCE => self.rhs - lhs,
            ConstraintSense::GreaterEqual if lhs < self.rhs - FEASIBILITY_TOLERANCE => {
                self.rhs - lhs
            }
            ConstraintSense::Equal if (lhs - self.rhs).abs() > FEASIBILITY_TOLERANCE => {
                self.rhs - lhs
            }
            _ => 0.0,
        }
    }

    /// Check whether `point` satisfies this constraint.
    #[must_use]
    pub fn is_satisfied_by(&self, point: &[f64]) -> bool {
        self.violation(self.lhs(point)) == 0.0
    }

    /// Check whether any value in `[min_lhs, max_lhs]` can satisfy the bound.
    #[must_use]
    pub fn admits_interval(&self, min_lhs: f64, max_lhs: f64) -> bool {
        match self.sense {
            ConstraintSense::LessEqual => min_lhs <= self.rhs + FEASIBILITY_TOLERANCE,
            ConstraintSense::GreaterEqual => max_lhs >= self.rhs - FEASIBILITY_TOLERANCE,
            ConstraintSense::Equal => {
                min_lhs <= self.rhs + FEASIBILITY_TOLERANCE
                    && max_lhs >= self.rhs - FEASIBILITY_TOLERANCE
            }
        }
    }

    /// Squared Euclidean norm of the coefficient vector.
    #[must_use]
    pub fn norm_squared(&self) -> f64 {
        self.coefficients.iter().map(|a| a * a).sum()
    }
}

/// Constraint sense (comparison operator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintSense {
    /// Greater than or equal (>=).
    GreaterEqual,
    /// Less than or equal (<=).
    LessEqual,
    /// Equal (=).
    Equal,
}

/// Bounds on a relaxed variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableBounds {
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

impl Default for VariableBounds {
    fn default() -> Self {
        Self::binary()
    }
}

impl VariableBounds {
    /// Binary variable bounds [0, 1].
    #[must_use]
    pub const fn binary() -> Self {
        Self {
            lower: 0.0,
            upper: 1.0,
        }
    }

    /// Bounded variable [lower, upper].
    #[must_use]
    pub const fn bounded(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Variable pinned to a single value.
    #[must_use]
    pub const fn fixed(value: f64) -> Self {
        Self {
            lower: value,
            upper: value,
        }
    }

    /// Clamp `value` into these bounds.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.lower).min(self.upper)
    }
}
