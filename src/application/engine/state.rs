//! Per-group mutable state behind a lock.

use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::application::solver::init::InitResult;
use crate::domain::group::MarketGroup;

/// Lifecycle of a registered group.
///
/// ```text
/// Uninitialized --(vertices found)--> Ready <--> Analyzing
///       |
///       +--(no feasible outcome)--> Unanalyzable
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    /// No successful initialization yet; retried on the next tick.
    Uninitialized,
    /// Vertices cached, ready for the next analysis.
    Ready,
    /// An analysis is in flight.
    Analyzing,
    /// The constraints admit no outcome; never analyzed again.
    Unanalyzable,
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Ready => write!(f, "ready"),
            Self::Analyzing => write!(f, "analyzing"),
            Self::Unanalyzable => write!(f, "unanalyzable"),
        }
    }
}

/// Mutable part of a group slot.
#[derive(Debug)]
pub(crate) struct SlotState {
    pub status: GroupStatus,
    /// Status to return to if an analysis is abandoned.
    pub resting: GroupStatus,
    pub init: Option<InitResult>,
    pub prices: Vec<Option<Decimal>>,
    pub last_update: Option<DateTime<Utc>>,
}

impl SlotState {
    fn new(dimension: usize) -> Self {
        Self {
            status: GroupStatus::Uninitialized,
            resting: GroupStatus::Uninitialized,
            init: None,
            prices: vec![None; dimension],
            last_update: None,
        }
    }

    /// Number of securities without a price.
    pub fn missing_prices(&self) -> usize {
        self.prices.iter().filter(|p| p.is_none()).count()
    }
}

/// A registered group: immutable structure plus locked state.
#[derive(Debug)]
pub(crate) struct GroupSlot {
    pub group: MarketGroup,
    pub state: Mutex<SlotState>,
}

impl GroupSlot {
    pub fn new(group: MarketGroup) -> Self {
        let state = Mutex::new(SlotState::new(group.dimension()));
        Self { group, state }
    }
}
