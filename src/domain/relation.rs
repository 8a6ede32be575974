//! Logical relations between binary markets.
//!
//! A market-catalog collaborator declares how markets depend on each other;
//! each [`RelationKind`] is applied to a [`ConstraintModel`] over the markets'
//! YES securities:
//!
//! - **Implies**: if market A resolves YES, market B must resolve YES
//! - **MutuallyExclusive**: at most one of the markets resolves YES
//! - **ExactlyOne**: exactly one of the markets resolves YES
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use polyedge::domain::id::MarketId;
//! use polyedge::domain::model::ConstraintModel;
//! use polyedge::domain::relation::RelationKind;
//!
//! let yes_index: HashMap<MarketId, usize> =
//!     [(MarketId::new("a"), 0), (MarketId::new("b"), 2)].into_iter().collect();
//!
//! let mut model = ConstraintModel::new(4);
//! let relation = RelationKind::Implies {
//!     if_yes: MarketId::new("a"),
//!     then_yes: MarketId::new("b"),
//! };
//! relation.apply(&mut model, &yes_index).unwrap();
//!
//! assert_eq!(model.constraints().len(), 1);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::MarketId;
use super::model::ConstraintModel;

/// The type of logical relationship between markets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelationKind {
    /// If market A resolves YES, market B must resolve YES.
    ///
    /// Constraint: `x_A - x_B <= 0`
    Implies {
        /// Market that implies the other (the "if" market).
        if_yes: MarketId,
        /// Market that must be true when `if_yes` is true (the "then" market).
        then_yes: MarketId,
    },

    /// At most one of these markets can resolve YES.
    ///
    /// Constraint: `sum(x_i) <= 1`
    MutuallyExclusive {
        /// Markets in the mutually exclusive set.
        markets: Vec<MarketId>,
    },

    /// Exactly one of these markets must resolve YES.
    ///
    /// Constraint: `sum(x_i) = 1`
    ExactlyOne {
        /// Markets where exactly one must resolve YES.
        markets: Vec<MarketId>,
    },
}

impl RelationKind {
    /// Returns all market IDs referenced by this relation kind.
    #[must_use]
    pub fn market_ids(&self) -> Vec<&MarketId> {
        match self {
            Self::Implies { if_yes, then_yes } => vec![if_yes, then_yes],
            Self::MutuallyExclusive { markets } | Self::ExactlyOne { markets } => {
                markets.iter().collect()
            }
        }
    }

    /// Returns the type name as a static string.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Implies { .. } => "implies",
            Self::MutuallyExclusive { .. } => "mutually_exclusive",
            Self::ExactlyOne { .. } => "exactly_one",
        }
    }

    /// Append the constraint encoding this relation to `model`.
    ///
    /// `yes_index` maps each market to the index of its YES security.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnknownMarket`] when a referenced market has no
    /// YES security in the group.
    pub fn apply(
        &self,
        model: &mut ConstraintModel,
        yes_index: &HashMap<MarketId, usize>,
    ) -> Result<(), DomainError> {
        let lookup = |market: &MarketId| {
            yes_index
                .get(market)
                .copied()
                .ok_or_else(|| DomainError::UnknownMarket {
                    market_id: market.to_string(),
                })
        };

        match self {
            Self::Implies { if_yes, then_yes } => {
                model.add_implication(lookup(if_yes)?, lookup(then_yes)?)
            }
            Self::MutuallyExclusive { markets } => {
                let indices = markets.iter().map(lookup).collect::<Result<Vec<_>, _>>()?;
                model.add_mutex(&indices)
            }
            Self::ExactlyOne { markets } => {
                let indices = markets.iter().map(lookup).collect::<Result<Vec<_>, _>>()?;
                model.add_exactly_one(&indices)
            }
        }
    }
}
