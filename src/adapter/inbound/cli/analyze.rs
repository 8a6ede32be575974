//! Handler for the `analyze` command.

use anyhow::{Context, Result};
use serde_json::json;
use tabled::{Table, Tabled};

use super::load_config;
use super::scenario::{RegisteredGroup, Scenario};
use crate::adapter::inbound::cli::command::AnalyzeArgs;
use crate::application::engine::{AnalysisOutcome, ArbitrageEngine};
use crate::port::outbound::notifier::NotifierRegistry;

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "Divergence")]
    divergence: String,
    #[tabled(rename = "Gap")]
    gap: String,
    #[tabled(rename = "Profit")]
    profit: String,
    #[tabled(rename = "Legs")]
    legs: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

impl OutcomeRow {
    fn new(group: &str, outcome: &AnalysisOutcome) -> Self {
        let dash = || "-".to_string();
        match outcome {
            AnalysisOutcome::Opportunity(opp) => Self {
                group: group.to_string(),
                outcome: (if opp.should_trade { "trade" } else { "no trade" }).to_string(),
                divergence: format!("{:.6}", opp.divergence),
                gap: format!("{:.6}", opp.gap),
                profit: format!("{:.6}", opp.guaranteed_profit),
                legs: opp.trades.len().to_string(),
                reason: opp.reason.clone(),
            },
            other => Self {
                group: group.to_string(),
                outcome: label(other).to_string(),
                divergence: dash(),
                gap: dash(),
                profit: dash(),
                legs: dash(),
                reason: match other {
                    AnalysisOutcome::Inconclusive { reason } => reason.clone(),
                    AnalysisOutcome::AwaitingPrices { missing } => {
                        format!("{missing} securities unpriced")
                    }
                    _ => dash(),
                },
            },
        }
    }
}

fn label(outcome: &AnalysisOutcome) -> &'static str {
    match outcome {
        AnalysisOutcome::Opportunity(_) => "opportunity",
        AnalysisOutcome::Unanalyzable => "unanalyzable",
        AnalysisOutcome::Inconclusive { .. } => "inconclusive",
        AnalysisOutcome::AwaitingPrices { .. } => "awaiting prices",
        AnalysisOutcome::Skipped => "skipped",
    }
}

/// Register a scenario, analyze every group once and print the results.
pub fn execute(args: &AnalyzeArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let scenario = Scenario::load(&args.scenario)?;

    let engine = ArbitrageEngine::new(config.engine_config()?)?
        .with_notifiers(NotifierRegistry::logging());

    let groups = scenario.register(&engine)?;
    scenario.apply_prices(&engine)?;

    let results = analyze(&engine, &groups)?;

    if args.json {
        let entries: Vec<_> = results
            .iter()
            .map(|(name, outcome)| json!({ "group": name, "result": outcome }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        let rows: Vec<OutcomeRow> = results
            .iter()
            .map(|(name, outcome)| OutcomeRow::new(name, outcome))
            .collect();
        println!("{}", Table::new(rows));
    }
    Ok(())
}

fn analyze(
    engine: &ArbitrageEngine,
    groups: &[RegisteredGroup],
) -> Result<Vec<(String, AnalysisOutcome)>> {
    groups
        .iter()
        .map(|group| {
            let outcome = engine
                .analyze_group(&group.id)
                .with_context(|| format!("analysis of '{}' failed", group.name))?;
            Ok((group.name.clone(), outcome))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn awaiting_prices_row_names_missing_count() {
        let row = OutcomeRow::new("g", &AnalysisOutcome::AwaitingPrices { missing: 2 });
        assert_eq!(row.outcome, "awaiting prices");
        assert_eq!(row.reason, "2 securities unpriced");
        assert_eq!(row.divergence, "-");
    }

    #[test]
    fn inconclusive_row_keeps_reason() {
        let row = OutcomeRow::new(
            "g",
            &AnalysisOutcome::Inconclusive {
                reason: "initialization timed out".into(),
            },
        );
        assert_eq!(row.outcome, "inconclusive");
        assert_eq!(row.reason, "initialization timed out");
    }
}
