//! Handler for the `run` command.
//!
//! Reads one JSON [`PriceTick`] per stdin line, feeds the engine service and
//! prints every approved opportunity as a JSON line on stdout.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::load_config;
use super::scenario::Scenario;
use crate::adapter::inbound::cli::command::RunArgs;
use crate::application::engine::{ArbitrageEngine, EngineService};
use crate::domain::opportunity::{ArbitrageOpportunity, PriceTick};
use crate::port::outbound::notifier::NotifierRegistry;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let scenario = Scenario::load(&args.scenario)?;

    let engine = Arc::new(
        ArbitrageEngine::new(config.engine_config()?)?
            .with_notifiers(NotifierRegistry::logging()),
    );

    let groups = scenario.register(&engine)?;
    scenario.apply_prices(&engine)?;
    info!(groups = groups.len(), "Scenario registered");

    let mut opportunities = engine.subscribe();
    let (tx, rx) = mpsc::channel(config.service.channel_capacity);
    let handle = EngineService::new(Arc::clone(&engine), config.service_config()).start(rx);
    let mut reader = tokio::spawn(forward_ticks(tx));

    loop {
        tokio::select! {
            received = opportunities.recv() => match received {
                Ok(opp) => print_opportunity(&opp)?,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Output fell behind, opportunities dropped");
                }
                Err(RecvError::Closed) => break,
            },
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                reader.abort();
                break;
            }
            finished = &mut reader => {
                match finished {
                    Ok(Ok(count)) => info!(ticks = count, "Input exhausted"),
                    Ok(Err(e)) => warn!(error = %e, "Tick input failed"),
                    Err(e) => warn!(error = %e, "Tick reader stopped"),
                }
                break;
            }
        }
    }

    handle.shutdown().await;
    while let Ok(opp) = opportunities.try_recv() {
        print_opportunity(&opp)?;
    }
    info!("polyedge stopped");
    Ok(())
}

fn print_opportunity(opp: &ArbitrageOpportunity) -> Result<()> {
    println!("{}", serde_json::to_string(opp)?);
    Ok(())
}

/// Forward parsed stdin lines to the service until EOF.
async fn forward_ticks(tx: mpsc::Sender<PriceTick>) -> Result<usize> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut count = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_tick(line) {
            Ok(tick) => {
                if tx.send(tick).await.is_err() {
                    break;
                }
                count += 1;
            }
            Err(e) => warn!(error = %e, line, "Skipping malformed tick"),
        }
    }
    Ok(count)
}

fn parse_tick(line: &str) -> serde_json::Result<PriceTick> {
    serde_json::from_str(line)
}
