use clap::Parser;
use polyedge::adapter::inbound::cli::command::{Cli, Commands};
use polyedge::adapter::inbound::cli::{analyze, check, run};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check(args) => check::execute(&args),
        Commands::Analyze(args) => analyze::execute(&args),
        Commands::Run(args) => run::execute(&args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
