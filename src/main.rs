//! LendingBot - Main Entry Point
//!
//! Allocates an idle Bitfinex funding balance between fixed-rate and
//! FRR-tracking lending offers on a fixed cadence.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use lending_bot::common::channels::create_trade_channel;
use lending_bot::config::loader;
use lending_bot::strategy::AllocationEngine;
use lending_bot::{BitfinexRestClient, TradeStream};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also stream public funding trades and log them
    #[arg(long)]
    watch_trades: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting LendingBot");
    info!("Configuration file: {}", args.config);

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let config = loader::load_config(Some(&args.config)).context("failed to load configuration")?;
    let credentials = config
        .bitfinex
        .credentials()
        .context("missing API credentials")?;

    let client = BitfinexRestClient::with_timeout(
        &config.bitfinex.rest_url,
        credentials,
        std::time::Duration::from_secs(config.settings.request_timeout_seconds),
    )?;

    // Optional public trades feed; independent of the decision cycle and
    // cancellable on its own
    let trade_stream = if args.watch_trades {
        let (sender, mut receiver) = create_trade_channel();
        let stream =
            TradeStream::connect(&config.bitfinex.ws_url, &config.bitfinex.symbol, sender).await?;
        tokio::spawn(async move {
            while let Some(trade) = receiver.recv().await {
                debug!(
                    id = trade.id,
                    rate = trade.rate,
                    period = trade.period,
                    amount = trade.amount,
                    "funding trade"
                );
            }
        });
        Some(stream)
    } else {
        None
    };

    let mut engine = AllocationEngine::new(
        config.strategy.clone(),
        config.bitfinex.symbol.clone(),
        config.bitfinex.currency.clone(),
    );

    // Wire ctrl-c into the engine's shutdown channel
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received shutdown signal, cleaning up...");
        let _ = shutdown_tx.send(()).await;
    });

    let run_result = engine.run(&client, shutdown_rx).await;

    if let Some(stream) = trade_stream {
        stream.close().await;
    }

    run_result.context("allocation engine stopped")?;

    Ok(())
}
