use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use buyback_tracker::{Config, KeyOverrides, Tracker};
use buyback_web::router;

#[derive(Parser, Debug)]
#[command(name = "buyback-web", version, about = "JSON API for the GMX buyback tracker")]
struct Args {
    /// Address to listen on
    #[arg(short, long, env = "BUYBACK_WEB_ADDR", default_value = "127.0.0.1:3000")]
    listen: String,

    /// Path to config file (defaults to ./config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Arbiscan API key
    #[arg(long, env = "ARBISCAN_API_KEY", hide_env_values = true)]
    arbiscan_api_key: Option<String>,

    /// Snowscan API key
    #[arg(long, env = "SNOWSCAN_API_KEY", hide_env_values = true)]
    snowscan_api_key: Option<String>,

    /// CoinGecko demo API key
    #[arg(long, env = "COINGECKO_API_KEY", hide_env_values = true)]
    coingecko_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "buyback_web=debug,tower_http=info,info".into()),
        )
        .init();

    let args = Args::parse();

    let keys = KeyOverrides {
        arbiscan: args.arbiscan_api_key,
        snowscan: args.snowscan_api_key,
        coingecko: args.coingecko_api_key,
    };
    let config = Config::load(args.config.as_deref(), keys)?;

    info!("Starting buyback-web");
    info!("  Arbitrum contract: {}", config.arbitrum.tracked_address);
    info!("  Avalanche contract: {}", config.avalanche.tracked_address);

    let app = router(Arc::new(Tracker::from_config(config)));

    let listener = tokio::net::TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("Failed to bind to {}", args.listen))?;

    info!("Listening on http://{}", args.listen);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
