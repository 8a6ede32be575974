//! Background service driving the engine from a tick stream.
//!
//! # Architecture
//!
//! ```text
//! PriceTick --(mpsc)--> EngineService
//!                            |
//!                            +-- ArbitrageEngine::on_price()
//!                            +-- spawn_blocking(analyze_group) per affected group
//!                            +-- periodic sweep over every group
//!                                        |
//!                                        v
//!                          broadcast<ArbitrageOpportunity>
//! ```

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, trace, warn};

use super::orchestrator::{AnalysisOutcome, ArbitrageEngine};
use crate::domain::error::DomainError;
use crate::domain::id::GroupId;
use crate::domain::opportunity::PriceTick;

/// Configuration for the engine service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Interval between sweeps over every registered group.
    pub analysis_interval: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            analysis_interval: Duration::from_millis(5000),
        }
    }
}

/// Handle for controlling the engine service lifecycle.
pub struct EngineHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl EngineHandle {
    /// Signal the service to shut down and wait for in-flight analyses.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            warn!(error = %e, "Engine service task failed");
        }
    }

    /// Wait for the service to stop on its own (tick channel closed).
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!(error = %e, "Engine service task failed");
        }
    }
}

/// The group id always comes back, even when the analysis panicked.
type AnalysisResult = (GroupId, std::thread::Result<Result<AnalysisOutcome, DomainError>>);

/// Background service feeding ticks into an [`ArbitrageEngine`].
///
/// Analyses run on the blocking thread pool with at most one in flight per
/// group; ticks for a group that is still being analyzed update its prices
/// but start no new analysis.
pub struct EngineService {
    engine: Arc<ArbitrageEngine>,
    config: ServiceConfig,
}

impl EngineService {
    /// Create a service around a shared engine.
    #[must_use]
    pub fn new(engine: Arc<ArbitrageEngine>, config: ServiceConfig) -> Self {
        Self { engine, config }
    }

    /// Start the background loop.
    ///
    /// The loop ends when the handle requests shutdown or the tick channel
    /// closes; pending analyses are awaited before the task finishes.
    pub fn start(self, mut ticks: mpsc::Receiver<PriceTick>) -> EngineHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            let mut in_flight: HashSet<GroupId> = HashSet::new();
            let mut analyses: JoinSet<AnalysisResult> = JoinSet::new();
            let mut sweep = tokio::time::interval(self.config.analysis_interval);
            sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Engine service shutting down");
                        break;
                    }

                    tick = ticks.recv() => {
                        let Some(tick) = tick else {
                            info!("Tick channel closed");
                            break;
                        };
                        match self.engine.on_price(&tick) {
                            Ok(groups) => {
                                for id in groups {
                                    self.dispatch(id, &mut in_flight, &mut analyses);
                                }
                            }
                            Err(e) => warn!(instrument = %tick.instrument_id, error = %e, "Rejected tick"),
                        }
                    }

                    Some(joined) = analyses.join_next(), if !analyses.is_empty() => {
                        Self::finish(joined, &mut in_flight);
                    }

                    _ = sweep.tick() => {
                        for id in self.engine.group_ids() {
                            self.dispatch(id, &mut in_flight, &mut analyses);
                        }
                    }
                }
            }

            while let Some(joined) = analyses.join_next().await {
                Self::finish(joined, &mut in_flight);
            }
        });

        EngineHandle { shutdown_tx, task }
    }

    fn dispatch(
        &self,
        id: GroupId,
        in_flight: &mut HashSet<GroupId>,
        analyses: &mut JoinSet<AnalysisResult>,
    ) {
        if in_flight.contains(&id) {
            trace!(group_id = %id, "Analysis in flight, tick dropped");
            return;
        }
        in_flight.insert(id.clone());

        let engine = Arc::clone(&self.engine);
        analyses.spawn_blocking(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| engine.analyze_group(&id)));
            (id, outcome)
        });
    }

    fn finish(
        joined: Result<AnalysisResult, tokio::task::JoinError>,
        in_flight: &mut HashSet<GroupId>,
    ) {
        match joined {
            Ok((id, outcome)) => {
                match &outcome {
                    Ok(Ok(AnalysisOutcome::Opportunity(opp))) => {
                        debug!(group_id = %id, approved = opp.should_trade, "Analysis complete");
                    }
                    Ok(Ok(other)) => trace!(group_id = %id, outcome = ?other, "Analysis complete"),
                    Ok(Err(e)) => warn!(group_id = %id, error = %e, "Analysis failed"),
                    Err(_) => error!(group_id = %id, "Analysis panicked"),
                }
                in_flight.remove(&id);
            }
            // Only reachable through cancellation; panics are caught above.
            Err(e) => warn!(error = %e, "Analysis task aborted"),
        }
    }
}
