// In crates/analytics/src/types.rs

use chrono::{DateTime, Utc};
use core_types::{Side, Signal};
use rust_decimal::Decimal;
use serde::Serialize;

/// A single executed fill. Immutable once recorded.
///
/// For a BUY, `gross_value` is the full cost including commission; for a
/// SELL it is the proceeds net of commission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub timestamp: DateTime<Utc>,
    pub side: Side,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub shares: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub gross_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cash_after: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub portfolio_value_after: Decimal,
}

/// The portfolio state after processing one input step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSnapshot {
    pub timestamp: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub cash: Decimal,
    pub shares_held: u64,
    /// `None` when the step could not be marked to market.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub mark_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub portfolio_value: Decimal,
    pub signal: Signal,
}

/// A comprehensive report of a strategy's performance over a backtest period.
///
/// All percentages are plain ratios times 100, unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct PerformanceReport {
    #[serde(with = "rust_decimal::serde::float")]
    pub initial_capital: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub final_portfolio_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub profit_loss: Decimal,
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,

    pub num_trades: usize,
    pub num_buy_signals: usize,
    pub num_sell_signals: usize,
    pub num_winning_trades: usize,
    pub num_losing_trades: usize,
    pub win_rate_pct: f64,

    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,

    pub trading_days: usize,
    pub years: f64,
}

impl PerformanceReport {
    /// Creates a new, empty report with zero values.
    pub fn new() -> Self {
        Self::default()
    }
}
