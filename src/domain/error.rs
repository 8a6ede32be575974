//! Domain errors for constraint models and market groups.
//!
//! These errors signal programming mistakes in the caller: an index outside
//! the model, a contradictory settlement, a vector of the wrong length.
//! Expected analysis conditions (infeasible groups, solver timeouts) are
//! reported as status values instead and never show up here.
//!
//! # Examples
//!
//! ```
//! use polyedge::domain::error::DomainError;
//! use polyedge::domain::model::ConstraintModel;
//!
//! let mut model = ConstraintModel::new(2);
//! let result = model.add_implication(0, 5);
//!
//! assert!(matches!(
//!     result,
//!     Err(DomainError::IndexOutOfRange { index: 5, dimension: 2 })
//! ));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A security index does not exist in the model.
    #[error("security index {index} out of range for dimension {dimension}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of securities in the model.
        dimension: usize,
    },

    /// A security was settled to both 0 and 1.
    #[error("security {index} already settled to {existing}, cannot settle to {requested}")]
    ConflictingSettlement {
        /// The security index.
        index: usize,
        /// Value recorded first.
        existing: u8,
        /// Value requested later.
        requested: u8,
    },

    /// Tried to read the forced value of a free security.
    #[error("security {index} is not settled")]
    Unsettled {
        /// The security index.
        index: usize,
    },

    /// A vector length does not match the model dimension.
    #[error("expected vector of length {expected}, got {actual}")]
    DimensionMismatch {
        /// Required length.
        expected: usize,
        /// Provided length.
        actual: usize,
    },

    /// A price outside the open interval (0, 1) was received.
    #[error("price {price} for {instrument} is outside (0, 1)")]
    InvalidPrice {
        /// Instrument the tick belongs to.
        instrument: String,
        /// The rejected price.
        price: rust_decimal::Decimal,
    },

    /// A market was registered without outcomes.
    #[error("market {market_id} has no outcomes")]
    EmptyMarket {
        /// The market identifier.
        market_id: String,
    },

    /// A relation references a market that is not part of the group.
    #[error("relation references unknown market {market_id}")]
    UnknownMarket {
        /// The missing market identifier.
        market_id: String,
    },

    /// No group is registered under this identifier.
    #[error("unknown market group {group_id}")]
    UnknownGroup {
        /// The missing group identifier.
        group_id: String,
    },
}
