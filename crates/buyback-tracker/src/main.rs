use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use buyback_tracker::{Config, KeyOverrides, Tracker, constants, report};

/// Token holdings and GMX outflows of the GMX buyback contracts
#[derive(Parser, Debug)]
#[command(name = "buyback-tracker", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (defaults to ./config.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,

    /// Directory for CSV output
    #[arg(short, long, default_value = ".", global = true)]
    output_dir: PathBuf,

    /// Arbiscan API key
    #[arg(long, env = "ARBISCAN_API_KEY", hide_env_values = true, global = true)]
    arbiscan_api_key: Option<String>,

    /// Snowscan API key
    #[arg(long, env = "SNOWSCAN_API_KEY", hide_env_values = true, global = true)]
    snowscan_api_key: Option<String>,

    /// CoinGecko demo API key
    #[arg(long, env = "COINGECKO_API_KEY", hide_env_values = true, global = true)]
    coingecko_api_key: Option<String>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// GMX outflows, balances and price
    Overview,
    /// Every token held on both networks, valued in USD
    Portfolio,
    /// Overview and portfolio together (default)
    Dashboard,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let keys = KeyOverrides {
        arbiscan: cli.arbiscan_api_key.clone(),
        snowscan: cli.snowscan_api_key.clone(),
        coingecko: cli.coingecko_api_key.clone(),
    };
    let config = Config::load(cli.config.as_deref(), keys)?;

    info!("Arbitrum contract: {}", config.arbitrum.tracked_address);
    info!("Avalanche contract: {}", config.avalanche.tracked_address);

    let tracker = Arc::new(Tracker::from_config(config));

    match cli.command.unwrap_or(Command::Dashboard) {
        Command::Overview => {
            let overview = tracker.fetch_governance_overview().await;
            match cli.format {
                Format::Text => report::print_overview(&overview),
                Format::Json => print_json(&overview)?,
                Format::Csv => write_outflows(&cli.output_dir, &overview)?,
            }
        }
        Command::Portfolio => {
            let portfolio = tracker.fetch_full_portfolio().await;
            match cli.format {
                Format::Text => report::print_portfolio(&portfolio),
                Format::Json => print_json(&portfolio)?,
                Format::Csv => write_holdings(&cli.output_dir, &portfolio)?,
            }
        }
        Command::Dashboard => {
            let dashboard = tracker.fetch_dashboard().await;
            match cli.format {
                Format::Text => {
                    report::print_overview(&dashboard.overview);
                    report::print_portfolio(&dashboard.portfolio);
                }
                Format::Json => print_json(&dashboard)?,
                Format::Csv => {
                    write_outflows(&cli.output_dir, &dashboard.overview)?;
                    write_holdings(&cli.output_dir, &dashboard.portfolio)?;
                }
            }
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_outflows(output_dir: &Path, overview: &buyback_tracker::GovernanceOverview) -> Result<()> {
    let path = output_dir.join(constants::OUTFLOWS_CSV_FILENAME);
    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    report::write_outflows_csv(file, &overview.outflow_transactions)?;
    println!("  Generated: {}", path.display());
    Ok(())
}

fn write_holdings(output_dir: &Path, portfolio: &buyback_tracker::FullPortfolio) -> Result<()> {
    let path = output_dir.join(constants::HOLDINGS_CSV_FILENAME);
    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    report::write_holdings_csv(file, portfolio)?;
    println!("  Generated: {}", path.display());
    Ok(())
}
