//! Arbitrage engine: group registry, price intake and per-group analysis.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use super::analyzer::{build_trades, market_state, to_probabilities};
use super::config::EngineConfig;
use super::state::{GroupSlot, GroupStatus};
use crate::adapter::outbound::solver::BranchBoundSolver;
use crate::application::decision::DecisionRule;
use crate::application::solver::frank_wolfe::{FrankWolfe, StopReason};
use crate::application::solver::init::{initialize, InitResult};
use crate::domain::error::DomainError;
use crate::domain::group::{MarketDefinition, MarketGroup};
use crate::domain::id::{GroupId, InstrumentId, MarketId};
use crate::domain::opportunity::{ArbitrageOpportunity, PriceTick};
use crate::domain::outcome::PartialOutcome;
use crate::domain::relation::RelationKind;
use crate::error::ConfigError;
use crate::port::outbound::notifier::{Event, NotifierRegistry, OpportunityEvent};
use crate::port::outbound::solver::Solver;

/// Capacity of the opportunity broadcast channel.
const BROADCAST_CAPACITY: usize = 256;

/// Result of analyzing one group on one tick.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// The decision rule ran; `should_trade` tells whether it approved.
    Opportunity(Box<ArbitrageOpportunity>),
    /// The group admits no feasible outcome.
    Unanalyzable,
    /// No decision this round (solver timeout or iteration cap).
    Inconclusive {
        /// Why no decision was reached.
        reason: String,
    },
    /// Some securities have never been priced.
    AwaitingPrices {
        /// Number of unpriced securities.
        missing: usize,
    },
    /// An analysis of this group was already in flight.
    Skipped,
}

impl AnalysisOutcome {
    /// The opportunity, if the decision rule approved a trade.
    #[must_use]
    pub fn approved(&self) -> Option<&ArbitrageOpportunity> {
        match self {
            Self::Opportunity(opp) if opp.should_trade => Some(opp.as_ref()),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Registry {
    slots: Vec<Arc<GroupSlot>>,
    by_id: HashMap<GroupId, usize>,
    by_instrument: HashMap<InstrumentId, Vec<usize>>,
}

/// Combinatorial arbitrage engine.
///
/// Groups are registered once and analyzed on demand. Distinct groups can be
/// analyzed concurrently from different threads; each group runs at most one
/// analysis at a time.
pub struct ArbitrageEngine {
    config: RwLock<EngineConfig>,
    solver: RwLock<Arc<dyn Solver>>,
    custom_solver: bool,
    registry: RwLock<Registry>,
    notifiers: NotifierRegistry,
    opportunity_tx: broadcast::Sender<ArbitrageOpportunity>,
}

impl ArbitrageEngine {
    /// Create an engine backed by the built-in branch-and-bound solver.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `config` fails validation.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let solver: Arc<dyn Solver> =
            Arc::new(BranchBoundSolver::with_timeout(config.solver_timeout()));
        Ok(Self::build(config, solver, false))
    }

    /// Create an engine with a caller-supplied solver.
    ///
    /// The solver keeps its own deadline; `solver_timeout_seconds` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `config` fails validation.
    pub fn with_solver(config: EngineConfig, solver: Arc<dyn Solver>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, solver, true))
    }

    fn build(config: EngineConfig, solver: Arc<dyn Solver>, custom_solver: bool) -> Self {
        let (opportunity_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            config: RwLock::new(config),
            solver: RwLock::new(solver),
            custom_solver,
            registry: RwLock::new(Registry::default()),
            notifiers: NotifierRegistry::new(),
            opportunity_tx,
        }
    }

    /// Attach notifiers for engine events.
    #[must_use]
    pub fn with_notifiers(mut self, notifiers: NotifierRegistry) -> Self {
        self.notifiers = notifiers;
        self
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> EngineConfig {
        self.config.read().clone()
    }

    /// Replace the configuration after validating it.
    ///
    /// Cached vertices stay valid; only optimizer and decision settings change.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] and keeps the old configuration
    /// if `config` fails validation.
    pub fn update_config(&self, config: EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if !self.custom_solver {
            *self.solver.write() = Arc::new(BranchBoundSolver::with_timeout(config.solver_timeout()));
        }
        *self.config.write() = config;
        info!("Engine configuration updated");
        Ok(())
    }

    /// Receive every approved opportunity.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ArbitrageOpportunity> {
        self.opportunity_tx.subscribe()
    }

    /// Register a YES/NO market as its own group.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DimensionMismatch`] unless the market has exactly
    /// two outcomes.
    pub fn add_binary_market(&self, market: MarketDefinition) -> Result<GroupId, DomainError> {
        if market.outcomes.len() != 2 {
            return Err(DomainError::DimensionMismatch {
                expected: 2,
                actual: market.outcomes.len(),
            });
        }
        self.register(MarketGroup::from_markets(vec![market], Vec::new())?)
    }

    /// Register a market with any number of mutually exclusive outcomes.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyMarket`] when `instruments` is empty.
    pub fn add_multi_outcome_market(
        &self,
        market_id: impl Into<MarketId>,
        instruments: Vec<InstrumentId>,
    ) -> Result<GroupId, DomainError> {
        let market = MarketDefinition::multi_outcome(market_id, instruments);
        self.register(MarketGroup::from_markets(vec![market], Vec::new())?)
    }

    /// Register markets linked by logical relations as one group.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyMarket`] or [`DomainError::UnknownMarket`]
    /// for malformed input.
    pub fn add_correlated_markets(
        &self,
        markets: Vec<MarketDefinition>,
        relations: Vec<RelationKind>,
    ) -> Result<GroupId, DomainError> {
        self.register(MarketGroup::from_markets(markets, relations)?)
    }

    fn register(&self, group: MarketGroup) -> Result<GroupId, DomainError> {
        let id = group.id.clone();
        let mut registry = self.registry.write();
        let slot_index = registry.slots.len();

        for instrument in group.instruments.iter() {
            let slots = registry.by_instrument.entry(instrument.clone()).or_default();
            if !slots.contains(&slot_index) {
                slots.push(slot_index);
            }
        }
        registry.by_id.insert(id.clone(), slot_index);

        info!(
            group_id = %id,
            markets = group.market_count(),
            securities = group.dimension(),
            constraints = group.constraint_count(),
            "Registered market group"
        );
        registry.slots.push(Arc::new(GroupSlot::new(group)));
        Ok(id)
    }

    /// Ids of all registered groups in registration order.
    #[must_use]
    pub fn group_ids(&self) -> Vec<GroupId> {
        self.registry
            .read()
            .slots
            .iter()
            .map(|slot| slot.group.id.clone())
            .collect()
    }

    /// Number of registered groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.registry.read().slots.len()
    }

    /// A copy of a registered group.
    #[must_use]
    pub fn group(&self, id: &GroupId) -> Option<MarketGroup> {
        self.slot(id).map(|slot| slot.group.clone())
    }

    /// Lifecycle status of a registered group.
    #[must_use]
    pub fn status(&self, id: &GroupId) -> Option<GroupStatus> {
        self.slot(id).map(|slot| slot.state.lock().status)
    }

    fn slot(&self, id: &GroupId) -> Option<Arc<GroupSlot>> {
        let registry = self.registry.read();
        registry
            .by_id
            .get(id)
            .and_then(|&i| registry.slots.get(i))
            .cloned()
    }

    /// Record a price for every group containing the tick's instrument.
    ///
    /// Prices are stored even while a group is being analyzed.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidPrice`] for a price outside (0, 1).
    pub fn on_price(&self, tick: &PriceTick) -> Result<Vec<GroupId>, DomainError> {
        if tick.price <= Decimal::ZERO || tick.price >= Decimal::ONE {
            return Err(DomainError::InvalidPrice {
                instrument: tick.instrument_id.to_string(),
                price: tick.price,
            });
        }

        let slots: Vec<Arc<GroupSlot>> = {
            let registry = self.registry.read();
            registry
                .by_instrument
                .get(&tick.instrument_id)
                .map(|indices| {
                    indices
                        .iter()
                        .filter_map(|&i| registry.slots.get(i).cloned())
                        .collect()
                })
                .unwrap_or_default()
        };

        let mut affected = Vec::with_capacity(slots.len());
        for slot in slots {
            let Some(index) = slot.group.index_of(&tick.instrument_id) else {
                continue;
            };
            let mut state = slot.state.lock();
            state.prices[index] = Some(tick.price);
            state.last_update = Some(tick.timestamp);
            affected.push(slot.group.id.clone());
        }

        if affected.is_empty() {
            debug!(instrument = %tick.instrument_id, "Tick for unregistered instrument");
        }
        Ok(affected)
    }

    /// Analyze every registered group once, in registration order.
    #[must_use]
    pub fn analyze_all(&self) -> Vec<(GroupId, AnalysisOutcome)> {
        let slots: Vec<Arc<GroupSlot>> = self.registry.read().slots.clone();
        slots
            .iter()
            .filter_map(|slot| match self.analyze_slot(slot) {
                Ok(outcome) => Some((slot.group.id.clone(), outcome)),
                Err(e) => {
                    warn!(group_id = %slot.group.id, error = %e, "Analysis failed");
                    None
                }
            })
            .collect()
    }

    /// Run one analysis of a group.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnknownGroup`] for an unregistered id, or a
    /// domain error if the solver contradicts itself during initialization.
    pub fn analyze_group(&self, id: &GroupId) -> Result<AnalysisOutcome, DomainError> {
        let slot = self.slot(id).ok_or_else(|| DomainError::UnknownGroup {
            group_id: id.to_string(),
        })?;
        self.analyze_slot(&slot)
    }

    fn analyze_slot(&self, slot: &GroupSlot) -> Result<AnalysisOutcome, DomainError> {
        let (prices, cached) = {
            let mut state = slot.state.lock();
            match state.status {
                GroupStatus::Unanalyzable => return Ok(AnalysisOutcome::Unanalyzable),
                GroupStatus::Analyzing => {
                    debug!(group_id = %slot.group.id, "Analysis in flight, tick dropped");
                    return Ok(AnalysisOutcome::Skipped);
                }
                GroupStatus::Uninitialized | GroupStatus::Ready => {}
            }
            let missing = state.missing_prices();
            if missing > 0 {
                return Ok(AnalysisOutcome::AwaitingPrices { missing });
            }
            state.resting = state.status;
            state.status = GroupStatus::Analyzing;
            let prices: Vec<Decimal> = state.prices.iter().map(|p| p.unwrap_or_default()).collect();
            (prices, state.init.clone())
        };

        let config = self.config();
        let solver = self.solver.read().clone();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run_analysis(slot, &config, solver.as_ref(), &prices, cached)
        }));

        let mut state = slot.state.lock();
        match result {
            Ok(Ok((status, init, outcome))) => {
                state.status = status;
                if init.is_some() {
                    state.init = init;
                }
                Ok(outcome)
            }
            Ok(Err(e)) => {
                state.status = state.resting;
                Err(e)
            }
            Err(payload) => {
                state.status = state.resting;
                drop(state);
                error!(group_id = %slot.group.id, "Analysis panicked, group released");
                panic::resume_unwind(payload)
            }
        }
    }

    /// The analysis proper, run without holding the slot lock.
    ///
    /// Returns the status to settle in, a freshly computed initialization to
    /// cache, and the outcome.
    fn run_analysis(
        &self,
        slot: &GroupSlot,
        config: &EngineConfig,
        solver: &dyn Solver,
        prices: &[Decimal],
        cached: Option<InitResult>,
    ) -> Result<(GroupStatus, Option<InitResult>, AnalysisOutcome), DomainError> {
        let group = &slot.group;

        let (init, fresh) = match cached {
            Some(init) => (init, false),
            None => {
                let init = initialize(solver, &group.model, &PartialOutcome::new())?;
                if init.timed_out {
                    let reason = "initialization timed out".to_string();
                    self.notifiers.notify_all(Event::AnalysisInconclusive {
                        group_id: group.id.to_string(),
                        reason: reason.clone(),
                    });
                    return Ok((
                        GroupStatus::Uninitialized,
                        None,
                        AnalysisOutcome::Inconclusive { reason },
                    ));
                }
                if init.vertex_count() == 0 {
                    warn!(group_id = %group.id, "Group admits no feasible outcome");
                    self.notifiers.notify_all(Event::GroupUnanalyzable {
                        group_id: group.id.to_string(),
                    });
                    return Ok((GroupStatus::Unanalyzable, None, AnalysisOutcome::Unanalyzable));
                }
                (init, true)
            }
        };

        let probabilities = to_probabilities(prices);
        let state = market_state(group, &probabilities, config);
        let fw = FrankWolfe::new(config.frank_wolfe()).optimize(&state, &group.model, &init, solver);
        let cache = fresh.then_some(init);

        if fw.stop_reason == StopReason::IterationLimit && fw.divergence >= config.min_divergence {
            let reason = format!(
                "iteration limit reached with divergence {:.6} and gap {:.6}",
                fw.divergence, fw.gap
            );
            self.notifiers.notify_all(Event::AnalysisInconclusive {
                group_id: group.id.to_string(),
                reason: reason.clone(),
            });
            return Ok((
                GroupStatus::Ready,
                cache,
                AnalysisOutcome::Inconclusive { reason },
            ));
        }

        let mut decision =
            DecisionRule::from(config).should_trade(fw.divergence, fw.gap, config.execution_cost);
        let trades = build_trades(group, &fw.mu, prices, config);
        if decision.should_trade && trades.is_empty() {
            decision.should_trade = false;
            decision.reason = format!(
                "no leg moves more than {} from the market price",
                config.trade_threshold
            );
        }

        let opportunity = ArbitrageOpportunity {
            group_id: group.id.clone(),
            market_ids: group.markets.clone(),
            mu_optimal: fw.mu,
            divergence: fw.divergence,
            gap: fw.gap,
            guaranteed_profit: decision.guaranteed_profit,
            net_profit: decision.net_profit,
            trades,
            should_trade: decision.should_trade,
            reason: decision.reason,
            detected_at: Utc::now(),
        };

        if opportunity.should_trade {
            info!(
                group_id = %group.id,
                divergence = opportunity.divergence,
                profit = opportunity.guaranteed_profit,
                legs = opportunity.trades.len(),
                "Arbitrage opportunity approved"
            );
            self.notifiers
                .notify_all(Event::OpportunityDetected(OpportunityEvent::from(&opportunity)));
            // No subscribers is not an error.
            let _ = self.opportunity_tx.send(opportunity.clone());
        } else {
            debug!(group_id = %group.id, reason = %opportunity.reason, "Trade rejected");
        }

        Ok((
            GroupStatus::Ready,
            cache,
            AnalysisOutcome::Opportunity(Box::new(opportunity)),
        ))
    }
}
