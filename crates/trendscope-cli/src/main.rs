mod fetch;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use trendscope_core::{SourceProperty, Timeframe, REGIONS};

use crate::fetch::{run_fetch, FetchArgs};

#[derive(Debug, Parser)]
#[command(name = "trendscope")]
#[command(about = "Search interest over time and rising queries from Google Trends")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch interest over time and rising queries for a keyword
    Fetch(FetchArgs),
    /// List the regions, timeframes and source properties the report offers
    Options,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = trendscope_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Fetch(args) => run_fetch(&config, args).await,
        Commands::Options => {
            print!("{}", options_text());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn options_text() -> String {
    let mut out = format!("regions:    {}\n", REGIONS.join(", "));
    out.push_str("timeframes:\n");
    for t in Timeframe::ALL {
        out.push_str(&format!("  {:<12}{}\n", t.as_str(), t.description()));
    }
    out.push_str("properties: ");
    out.push_str(
        &SourceProperty::ALL
            .into_iter()
            .map(SourceProperty::label)
            .collect::<Vec<_>>()
            .join(", "),
    );
    out.push('\n');
    out
}
