//! Notifier port for event notifications.
//!
//! This module defines the trait for sending notifications about
//! engine events such as approved opportunities and groups that can no
//! longer be analyzed.

use crate::domain::opportunity::ArbitrageOpportunity;

/// Events that can trigger notifications.
#[derive(Debug, Clone)]
pub enum Event {
    /// An approved arbitrage opportunity.
    OpportunityDetected(OpportunityEvent),
    /// A group admits no feasible outcome and will not be analyzed again.
    GroupUnanalyzable {
        /// The group identifier.
        group_id: String,
    },
    /// An analysis ended without a decision (timeout or iteration cap).
    AnalysisInconclusive {
        /// The group identifier.
        group_id: String,
        /// Why no decision was reached.
        reason: String,
    },
}

/// Opportunity detection event.
#[derive(Debug, Clone)]
pub struct OpportunityEvent {
    /// The group where the opportunity was found.
    pub group_id: String,
    /// Markets of the group.
    pub market_ids: Vec<String>,
    /// Bregman divergence to the arbitrage-free point.
    pub divergence: f64,
    /// Guaranteed profit lower bound.
    pub guaranteed_profit: f64,
    /// Profit after execution cost.
    pub net_profit: f64,
    /// Number of trade legs.
    pub legs: usize,
}

impl From<&ArbitrageOpportunity> for OpportunityEvent {
    fn from(opp: &ArbitrageOpportunity) -> Self {
        Self {
            group_id: opp.group_id.to_string(),
            market_ids: opp.market_ids.iter().map(ToString::to_string).collect(),
            divergence: opp.divergence,
            guaranteed_profit: opp.guaranteed_profit,
            net_profit: opp.net_profit,
            legs: opp.trades.len(),
        }
    }
}

/// Trait for notification handlers.
///
/// Implement this trait to receive events from the engine.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - `notify` is called from analysis threads and should return quickly
pub trait Notifier: Send + Sync {
    /// Handle an event.
    fn notify(&self, event: Event);
}

/// Fan-out over every registered notifier, in registration order.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            notifiers: Vec::new(),
        }
    }

    /// Add a sink.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Registry holding only [`LogNotifier`].
    #[must_use]
    pub fn logging() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(LogNotifier));
        registry
    }

    /// Deliver `event` to every sink.
    pub fn notify_all(&self, event: Event) {
        if let Some((last, rest)) = self.notifiers.split_last() {
            for notifier in rest {
                notifier.notify(event.clone());
            }
            last.notify(event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Discards every event.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}

/// Writes events to the tracing subscriber.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        use tracing::{info, warn};
        match event {
            Event::OpportunityDetected(e) => {
                info!(
                    group_id = %e.group_id,
                    markets = ?e.market_ids,
                    divergence = e.divergence,
                    profit = e.guaranteed_profit,
                    net = e.net_profit,
                    legs = e.legs,
                    "Opportunity detected"
                );
            }
            Event::GroupUnanalyzable { group_id } => {
                warn!(group_id = %group_id, "Group has no feasible outcome");
            }
            Event::AnalysisInconclusive { group_id, reason } => {
                info!(group_id = %group_id, reason = %reason, "Analysis inconclusive");
            }
        }
    }
}
