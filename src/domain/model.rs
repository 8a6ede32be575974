//! Constraint model describing the logical structure of a market group.
//!
//! A [`ConstraintModel`] holds one binary variable per security and the linear
//! constraints relating them. It is built once when a group is registered and
//! never mutated afterwards.
//!
//! # Examples
//!
//! ```
//! use polyedge::domain::model::ConstraintModel;
//!
//! // Two binary markets (YES/NO each) where A-YES implies B-YES.
//! let mut model = ConstraintModel::new(4);
//! model.add_exactly_one(&[0, 1]).unwrap();
//! model.add_exactly_one(&[2, 3]).unwrap();
//! model.add_implication(0, 2).unwrap();
//!
//! assert_eq!(model.constraints().len(), 3);
//! assert!(model.is_satisfied_by(&[1.0, 0.0, 1.0, 0.0]));
//! assert!(!model.is_satisfied_by(&[1.0, 0.0, 0.0, 1.0]));
//! ```

use serde::{Deserialize, Serialize};

use super::constraint::Constraint;
use super::error::DomainError;

/// Linear constraints over `dimension` binary securities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintModel {
    dimension: usize,
    constraints: Vec<Constraint>,
}

impl ConstraintModel {
    /// Create an unconstrained model over `dimension` securities.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            constraints: Vec::new(),
        }
    }

    /// Number of securities.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Constraints in insertion order.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Require exactly one of `indices` to be true: `sum(x_i) = 1`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::IndexOutOfRange`] for an unknown security.
    pub fn add_exactly_one(&mut self, indices: &[usize]) -> Result<(), DomainError> {
        let coefficients = self.indicator(indices)?;
        self.constraints.push(Constraint::eq(coefficients, 1.0));
        Ok(())
    }

    /// Require `x_i = 1` to force `x_j = 1`: `x_i - x_j <= 0`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::IndexOutOfRange`] for an unknown security.
    pub fn add_implication(&mut self, i: usize, j: usize) -> Result<(), DomainError> {
        self.check_index(i)?;
        self.check_index(j)?;
        let mut coefficients = vec![0.0; self.dimension];
        coefficients[i] += 1.0;
        coefficients[j] -= 1.0;
        self.constraints.push(Constraint::leq(coefficients, 0.0));
        Ok(())
    }

    /// Allow at most one of `indices` to be true: `sum(x_i) <= 1`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::IndexOutOfRange`] for an unknown security.
    pub fn add_mutex(&mut self, indices: &[usize]) -> Result<(), DomainError> {
        let coefficients = self.indicator(indices)?;
        self.constraints.push(Constraint::leq(coefficients, 1.0));
        Ok(())
    }

    /// Append an arbitrary linear constraint.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DimensionMismatch`] when the coefficient vector
    /// does not have one entry per security.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), DomainError> {
        if constraint.coefficients.len() != self.dimension {
            return Err(DomainError::DimensionMismatch {
                expected: self.dimension,
                actual: constraint.coefficients.len(),
            });
        }
        self.constraints.push(constraint);
        Ok(())
    }

    /// Check a point against every constraint.
    ///
    /// Points of the wrong length never satisfy the model.
    #[must_use]
    pub fn is_satisfied_by(&self, point: &[f64]) -> bool {
        point.len() == self.dimension && self.constraints.iter().all(|c| c.is_satisfied_by(point))
    }

    /// Validate that `index` names a security of this model.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::IndexOutOfRange`] otherwise.
    pub fn check_index(&self, index: usize) -> Result<(), DomainError> {
        if index >= self.dimension {
            return Err(DomainError::IndexOutOfRange {
                index,
                dimension: self.dimension,
            });
        }
        Ok(())
    }

    fn indicator(&self, indices: &[usize]) -> Result<Vec<f64>, DomainError> {
        let mut coefficients = vec![0.0; self.dimension];
        for &index in indices {
            self.check_index(index)?;
            coefficients[index] = 1.0;
        }
        Ok(coefficients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constraint::ConstraintSense;

    #[test]
    fn exactly_one_builds_equality() {
        let mut model = ConstraintModel::new(3);
        model.add_exactly_one(&[0, 1, 2]).unwrap();

        let c = &model.constraints()[0];
        assert_eq!(c.sense, ConstraintSense::Equal);
        assert_eq!(c.coefficients, vec![1.0, 1.0, 1.0]);
        assert_eq!(c.rhs, 1.0);
    }

    #[test]
    fn implication_builds_difference() {
        let mut model = ConstraintModel::new(3);
        model.add_implication(2, 0).unwrap();

        let c = &model.constraints()[0];
        assert_eq!(c.sense, ConstraintSense::LessEqual);
        assert_eq!(c.coefficients, vec![-1.0, 0.0, 1.0]);
        assert_eq!(c.rhs, 0.0);
    }

    #[test]
    fn mutex_allows_all_false() {
        let mut model = ConstraintModel::new(3);
        model.add_mutex(&[0, 1, 2]).unwrap();

        assert!(model.is_satisfied_by(&[0.0, 0.0, 0.0]));
        assert!(model.is_satisfied_by(&[0.0, 1.0, 0.0]));
        assert!(!model.is_satisfied_by(&[1.0, 1.0, 0.0]));
    }

    #[test]
    fn out_of_range_index_is_rejected_without_side_effects() {
        let mut model = ConstraintModel::new(2);

        let err = model.add_exactly_one(&[0, 2]).unwrap_err();
        assert_eq!(
            err,
            DomainError::IndexOutOfRange {
                index: 2,
                dimension: 2
            }
        );
        assert!(model.constraints().is_empty());
    }

    #[test]
    fn add_constraint_checks_length() {
        let mut model = ConstraintModel::new(2);
        let result = model.add_constraint(Constraint::leq(vec![1.0], 1.0));
        assert!(matches!(
            result,
            Err(DomainError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn wrong_length_point_is_not_satisfying() {
        let model = ConstraintModel::new(2);
        assert!(!model.is_satisfied_by(&[0.0]));
        assert!(model.is_satisfied_by(&[0.0, 1.0]));
    }
}
