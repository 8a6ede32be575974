//! Command-line interface definitions.
//!
//! Defines the CLI structure for the polyedge application using `clap`.
//! Every subcommand reads a TOML configuration file; `analyze` and `run`
//! additionally take a scenario file describing market groups.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Combinatorial arbitrage detection for related prediction markets
#[derive(Parser, Debug)]
#[command(name = "polyedge")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the polyedge CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a configuration file
    Check(CheckArgs),

    /// Analyze every group of a scenario once and print the results
    Analyze(AnalyzeArgs),

    /// Stream JSON-line price ticks from stdin through the engine
    Run(RunArgs),
}

/// Arguments for `polyedge check`.
#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for `polyedge analyze`.
#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Path to scenario file (groups and prices)
    #[arg(short, long)]
    pub scenario: PathBuf,

    /// Print results as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `polyedge run`.
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Path to scenario file (groups; prices are optional seeds)
    #[arg(short, long)]
    pub scenario: PathBuf,
}
