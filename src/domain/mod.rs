//! Core domain types: constraint models, outcomes, vertices and market groups.
//!
//! Everything here is pure data plus the invariants that keep it consistent.
//! Solving and orchestration live in [`crate::application`].

pub mod constraint;
pub mod error;
pub mod group;
pub mod id;
pub mod market_state;
pub mod model;
pub mod opportunity;
pub mod outcome;
pub mod relation;
pub mod vertex;

pub use constraint::{Constraint, ConstraintSense, VariableBounds};
pub use error::DomainError;
pub use group::{MarketDefinition, MarketGroup};
pub use id::{GroupId, InstrumentId, MarketId};
pub use market_state::{MarketState, Normalization};
pub use model::ConstraintModel;
pub use opportunity::{ArbitrageOpportunity, PriceTick, Trade, TradeSide};
pub use outcome::PartialOutcome;
pub use relation::RelationKind;
pub use vertex::{MarginalPoint, Vertex, VertexSet};
