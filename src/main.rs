//! Pricewatch - Main Entry Point
//!
//! Watches the price of configured tokens on Saturn Network and
//! automatically buys or sells when a threshold is crossed.

use anyhow::{bail, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use pricewatch::config::load_config;
use pricewatch::{
    PaperSigner, PollScheduler, SaturnRestClient, SaturnVenue, TradeSigner, TradingEngine,
};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the bot configuration file (TOML or JSON)
    #[arg(short, long, default_value = "pricewatch.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error), overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Polling delay in seconds, overrides the config file
    #[arg(short, long)]
    delay: Option<u64>,

    /// Address of the trading wallet, overrides the config file
    #[arg(short, long, env = "PRICEWATCH_WALLET")]
    wallet: Option<String>,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let mut config = load_config(Some(&args.config))?;
    if let Some(delay) = args.delay {
        config.settings.poll_delay_seconds = delay;
    }
    if let Some(wallet) = args.wallet {
        config.venue.wallet_address = wallet;
    }
    if let Some(level) = args.log_level {
        config.settings.log_level = level;
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&config.settings.log_level))
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Loading pricewatch v{} ...", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let strategies = config.validate()?;
    let signer = Arc::new(PaperSigner::new(config.venue.wallet_address.clone()));
    let wallet = signer.address().to_string();

    info!("Trading address: {}", wallet);
    for strategy in &strategies {
        info!(
            token = %strategy.token,
            blockchain = %strategy.blockchain,
            chain_id = strategy.blockchain.chain_id(),
            rpc = strategy.blockchain.rpc_url(),
            action = %strategy.action,
            price = %strategy.price_threshold,
            hourly_ether_limit = %strategy.hourly_ether_limit,
            "Using strategy"
        );
    }

    if !config.settings.paper_trading {
        bail!(
            "Live trading needs a transaction signer for the wallet, and none is built in; \
             set settings.paper_trading = true"
        );
    }
    warn!("Paper trading: trades are recorded, never broadcast, and do not count towards hourly limits");

    let rest_client =
        SaturnRestClient::with_timeout(&config.venue.api_url, config.settings.request_timeout())?;
    let mut venue = SaturnVenue::new(rest_client, signer, &config.settings);
    if let Some(rpc_url) = &config.venue.rpc_url {
        venue = venue.with_rpc_url(rpc_url.as_str());
    }
    let venue = Arc::new(venue);

    let engine = Arc::new(TradingEngine::new(venue, wallet, strategies));
    let scheduler = PollScheduler::new(engine, config.settings.poll_delay());

    scheduler
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("Received shutdown signal, cleaning up...");
        })
        .await;

    Ok(())
}
