//! Market groups: sets of logically related markets analyzed together.
//!
//! A [`MarketGroup`] flattens every outcome of its markets into one security
//! index space and builds the [`ConstraintModel`] over it once, at
//! registration. Each market contributes an exactly-one block; declared
//! relations add cross-market constraints over the markets' YES securities.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{GroupId, InstrumentId, MarketId};
use super::model::ConstraintModel;
use super::relation::RelationKind;

/// A market as seen by the engine: an id and its outcome instruments.
///
/// For binary markets the first outcome is YES and the second is NO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDefinition {
    /// Market identifier.
    pub id: MarketId,
    /// One instrument per outcome, in security order.
    pub outcomes: Vec<InstrumentId>,
}

impl MarketDefinition {
    /// A YES/NO market.
    pub fn binary(
        id: impl Into<MarketId>,
        yes: impl Into<InstrumentId>,
        no: impl Into<InstrumentId>,
    ) -> Self {
        Self {
            id: id.into(),
            outcomes: vec![yes.into(), no.into()],
        }
    }

    /// A market with any number of mutually exclusive outcomes.
    pub fn multi_outcome(id: impl Into<MarketId>, outcomes: Vec<InstrumentId>) -> Self {
        Self {
            id: id.into(),
            outcomes,
        }
    }

    /// The YES instrument (first outcome).
    #[must_use]
    pub fn yes(&self) -> Option<&InstrumentId> {
        self.outcomes.first()
    }
}

/// A group of related markets with its immutable constraint model.
#[derive(Debug, Clone)]
pub struct MarketGroup {
    /// Unique identifier for this group.
    pub id: GroupId,
    /// Markets in registration order.
    pub markets: Vec<MarketId>,
    /// Instrument for each security index.
    pub instruments: Vec<InstrumentId>,
    /// Security indices of each market's outcomes, parallel to `markets`.
    pub blocks: Vec<Vec<usize>>,
    /// Cross-market relations the model was built from.
    pub relations: Vec<RelationKind>,
    /// Constraints over the group's securities.
    pub model: ConstraintModel,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
    index: HashMap<InstrumentId, usize>,
}

impl MarketGroup {
    /// Build a group from markets and the relations between them.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyMarket`] for a market without outcomes and
    /// [`DomainError::UnknownMarket`] for a relation naming a market outside
    /// the group.
    pub fn from_markets(
        markets: Vec<MarketDefinition>,
        relations: Vec<RelationKind>,
    ) -> Result<Self, DomainError> {
        let dimension = markets.iter().map(|m| m.outcomes.len()).sum();
        let mut model = ConstraintModel::new(dimension);
        let mut instruments = Vec::with_capacity(dimension);
        let mut blocks = Vec::with_capacity(markets.len());
        let mut yes_index = HashMap::new();

        for market in &markets {
            if market.outcomes.is_empty() {
                return Err(DomainError::EmptyMarket {
                    market_id: market.id.to_string(),
                });
            }
            let start = instruments.len();
            let block: Vec<usize> = (start..start + market.outcomes.len()).collect();
            model.add_exactly_one(&block)?;
            yes_index.insert(market.id.clone(), start);
            instruments.extend(market.outcomes.iter().cloned());
            blocks.push(block);
        }

        for relation in &relations {
            relation.apply(&mut model, &yes_index)?;
        }

        let mut index = HashMap::with_capacity(instruments.len());
        for (i, instrument) in instruments.iter().enumerate() {
            index.entry(instrument.clone()).or_insert(i);
        }

        Ok(Self {
            id: GroupId::new(),
            markets: markets.into_iter().map(|m| m.id).collect(),
            instruments,
            blocks,
            relations,
            model,
            created_at: Utc::now(),
            index,
        })
    }

    /// Number of securities.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.instruments.len()
    }

    /// Security index of `instrument`, if it belongs to this group.
    #[must_use]
    pub fn index_of(&self, instrument: &InstrumentId) -> Option<usize> {
        self.index.get(instrument).copied()
    }

    /// Check if this group prices `instrument`.
    #[must_use]
    pub fn contains_instrument(&self, instrument: &InstrumentId) -> bool {
        self.index.contains_key(instrument)
    }

    /// Check if this group contains a specific market.
    #[must_use]
    pub fn contains_market(&self, market_id: &MarketId) -> bool {
        self.markets.iter().any(|m| m == market_id)
    }

    /// Get the number of markets in this group.
    #[must_use]
    pub fn market_count(&self) -> usize {
        self.markets.len()
    }

    /// Get the number of constraints in this group.
    #[must_use]
    pub fn constraint_count(&self) -> usize {
        self.model.constraints().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(id: &str) -> MarketDefinition {
        MarketDefinition::binary(id, format!("{id}-yes"), format!("{id}-no"))
    }

    #[test]
    fn binary_market_gets_exactly_one_block() {
        let group = MarketGroup::from_markets(vec![binary("a")], vec![]).unwrap();

        assert_eq!(group.dimension(), 2);
        assert_eq!(group.blocks, vec![vec![0, 1]]);
        assert_eq!(group.constraint_count(), 1);
        assert!(group.model.is_satisfied_by(&[1.0, 0.0]));
        assert!(!group.model.is_satisfied_by(&[1.0, 1.0]));
    }

    #[test]
    fn correlated_markets_link_yes_securities() {
        let group = MarketGroup::from_markets(
            vec![binary("a"), binary("b")],
            vec![RelationKind::Implies {
                if_yes: MarketId::new("a"),
                then_yes: MarketId::new("b"),
            }],
        )
        .unwrap();

        assert_eq!(group.constraint_count(), 3);
        assert_eq!(group.index_of(&InstrumentId::new("b-yes")), Some(2));
        // A yes, B no violates the implication.
        assert!(!group.model.is_satisfied_by(&[1.0, 0.0, 0.0, 1.0]));
        assert!(group.model.is_satisfied_by(&[0.0, 1.0, 0.0, 1.0]));
    }

    #[test]
    fn empty_market_is_rejected() {
        let result = MarketGroup::from_markets(
            vec![MarketDefinition::multi_outcome("empty", vec![])],
            vec![],
        );
        assert!(matches!(result, Err(DomainError::EmptyMarket { .. })));
    }

    #[test]
    fn relation_to_foreign_market_is_rejected() {
        let result = MarketGroup::from_markets(
            vec![binary("a")],
            vec![RelationKind::Implies {
                if_yes: MarketId::new("a"),
                then_yes: MarketId::new("elsewhere"),
            }],
        );
        assert!(matches!(result, Err(DomainError::UnknownMarket { .. })));
    }

    #[test]
    fn lookups() {
        let group = MarketGroup::from_markets(vec![binary("a")], vec![]).unwrap();

        assert!(group.contains_market(&MarketId::new("a")));
        assert!(!group.contains_market(&MarketId::new("b")));
        assert!(group.contains_instrument(&InstrumentId::new("a-no")));
        assert_eq!(group.market_count(), 1);
    }
}
