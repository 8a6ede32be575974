//! Partial outcomes: securities whose value is logically forced.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::constraint::VariableBounds;
use super::error::DomainError;

/// Sparse record of settled securities.
///
/// A security, once settled, keeps its value. Settling it again to the same
/// value is a no-op; settling it to the other value is reported as a
/// [`DomainError::ConflictingSettlement`] because it means the constraint graph
/// contradicts itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialOutcome {
    settled: BTreeMap<usize, bool>,
}

impl PartialOutcome {
    /// Create an empty partial outcome.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Force security `index` to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ConflictingSettlement`] if the security was
    /// already settled to the opposite value.
    pub fn settle(&mut self, index: usize, value: bool) -> Result<(), DomainError> {
        match self.settled.get(&index) {
            Some(&existing) if existing != value => Err(DomainError::ConflictingSettlement {
                index,
                existing: u8::from(existing),
                requested: u8::from(value),
            }),
            Some(_) => Ok(()),
            None => {
                self.settled.insert(index, value);
                Ok(())
            }
        }
    }

    /// Return a copy with one more settled security.
    ///
    /// # Errors
    ///
    /// Same as [`settle`](Self::settle).
    pub fn with(&self, index: usize, value: bool) -> Result<Self, DomainError> {
        let mut next = self.clone();
        next.settle(index, value)?;
        Ok(next)
    }

    /// Read the forced value of security `index`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Unsettled`] if the security is free.
    pub fn value(&self, index: usize) -> Result<bool, DomainError> {
        self.settled
            .get(&index)
            .copied()
            .ok_or(DomainError::Unsettled { index })
    }

    /// Forced value if settled.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<bool> {
        self.settled.get(&index).copied()
    }

    /// Whether security `index` is settled.
    #[must_use]
    pub fn is_settled(&self, index: usize) -> bool {
        self.settled.contains_key(&index)
    }

    /// Number of settled securities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.settled.len()
    }

    /// Whether nothing is settled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.settled.is_empty()
    }

    /// Settled `(index, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.settled.iter().map(|(&i, &v)| (i, v))
    }

    /// Indices in `0..dimension` that are still free.
    #[must_use]
    pub fn unsettled_indices(&self, dimension: usize) -> Vec<usize> {
        (0..dimension).filter(|i| !self.is_settled(*i)).collect()
    }

    /// Dense assignment of length `dimension` (`None` for free securities).
    #[must_use]
    pub fn to_assignment(&self, dimension: usize) -> Vec<Option<bool>> {
        (0..dimension).map(|i| self.get(i)).collect()
    }

    /// Relaxation bounds that pin settled securities and leave the rest in [0, 1].
    #[must_use]
    pub fn to_bounds(&self, dimension: usize) -> Vec<VariableBounds> {
        (0..dimension)
            .map(|i| match self.get(i) {
                Some(true) => VariableBounds::fixed(1.0),
                Some(false) => VariableBounds::fixed(0.0),
                None => VariableBounds::binary(),
            })
            .collect()
    }
}
