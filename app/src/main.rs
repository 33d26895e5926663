// In app/src/main.rs

use std::sync::Arc;

use anyhow::Result;
use app_config::Settings;
use backtester::Backtester;
use clap::{Parser, Subcommand};
use market_data::{ChartClient, PriceSource};
use rust_decimal::Decimal;
use tracing_subscriber::prelude::*;
use web_server::AppState;
use web_server::types::{BacktestData, BacktestParams, BacktestRequest};

mod summary;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Moving-average golden/death cross backtester.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the HTTP API.
    Serve,

    /// Runs a single backtest and prints the summary and trade log.
    Backtest {
        /// The ticker to backtest (e.g., "AAPL", "SPY").
        #[arg(short, long)]
        ticker: String,

        /// The start date for the backtest in YYYY-MM-DD format.
        #[arg(long)]
        start_date: String,

        /// The end date (exclusive) in YYYY-MM-DD format.
        #[arg(long)]
        end_date: String,

        /// Short moving-average window. Defaults to `backtest.short_period`.
        #[arg(long)]
        short_period: Option<u32>,

        /// Long moving-average window. Defaults to `backtest.long_period`.
        #[arg(long)]
        long_period: Option<u32>,

        /// Starting cash. Defaults to `backtest.initial_capital`.
        #[arg(long)]
        initial_capital: Option<Decimal>,

        /// Proportional commission per side (0.001 = 0.1%).
        #[arg(long)]
        commission: Option<Decimal>,

        /// Print the full JSON response instead of the text summary.
        #[arg(long)]
        json: bool,
    },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let cli = Cli::parse();

    // Settings are loaded before logging so the configured level applies;
    // a load failure is reported once logging is up.
    let settings = app_config::load_settings();
    let level = settings
        .as_ref()
        .ok()
        .and_then(|s| s.app.log_level.parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new()
            .with_target("hyper_util", tracing::Level::WARN)
            .with_target("reqwest", tracing::Level::WARN)
            .with_default(level),
    );
    tracing_subscriber::registry().with(fmt_layer).init();

    let settings = settings?;
    tracing::info!(environment = %settings.app.environment, "Application settings loaded successfully.");

    // Match on the parsed command and call the appropriate handler.
    match cli.command {
        Commands::Serve => {
            handle_serve(settings).await?;
        }
        Commands::Backtest {
            ticker,
            start_date,
            end_date,
            short_period,
            long_period,
            initial_capital,
            commission,
            json,
        } => {
            let request = BacktestRequest {
                ticker,
                start_date,
                end_date,
                short_period,
                long_period,
                initial_capital,
                commission,
            };
            handle_backtest(&settings, request, json).await?;
        }
    }

    Ok(())
}

// --- "Serve" Subcommand Logic ---

/// Builds the chart client and runs the web server until terminated.
async fn handle_serve(settings: Settings) -> Result<()> {
    let source = ChartClient::new(&settings.market_data)?;
    tracing::info!(base_url = %settings.market_data.base_url, "Price source ready.");

    let app_state = AppState::new(Arc::new(source), settings.backtest.clone(), &settings.cache);
    web_server::run(&settings.server, app_state).await?;

    Ok(())
}

// --- "Backtest" Subcommand Logic ---

/// Handles the logic for the `backtest` subcommand.
async fn handle_backtest(settings: &Settings, request: BacktestRequest, json: bool) -> Result<()> {
    // --- 1. Validate parameters the same way the API does ---
    let params = BacktestParams::from_request(request, &settings.backtest)?;

    // --- 2. Fetch prices ---
    let source = ChartClient::new(&settings.market_data)?;
    let prices = source
        .fetch_daily_closes(&params.symbol, params.start, params.end)
        .await?;
    tracing::info!(ticker = %params.symbol, points = prices.len(), "Price history loaded.");

    // --- 3. Run ---
    let outcome = Backtester::ma_crossover(params.simulation, params.crossover).run(&prices)?;

    // --- 4. Report ---
    if json {
        let data = BacktestData::new(&params, &outcome);
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        let mut text = String::new();
        summary::write_report(&mut text, &params, &outcome)?;
        text.push('\n');
        summary::write_trades(&mut text, &outcome.trades)?;
        println!("{text}");
    }

    Ok(())
}
