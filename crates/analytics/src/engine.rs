use crate::types::{PerformanceReport, PortfolioSnapshot, Trade};
use core_types::Side;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use tracing::warn;

/// Fixed trading-days-per-year convention used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// The engine responsible for calculating performance metrics from a
/// simulated run.
#[derive(Default)]
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates a full performance report from the trade log and the
    /// per-step portfolio snapshots.
    pub fn calculate(
        &self,
        initial_capital: Decimal,
        trades: &[Trade],
        snapshots: &[PortfolioSnapshot],
    ) -> PerformanceReport {
        let mut report = PerformanceReport::new();
        report.initial_capital = initial_capital;

        // 1. Returns
        report.final_portfolio_value = snapshots
            .last()
            .map(|s| s.portfolio_value)
            .unwrap_or(initial_capital);
        report.profit_loss = report.final_portfolio_value - initial_capital;
        if initial_capital > dec!(0) {
            report.total_return_pct = (report.profit_loss / initial_capital)
                .to_f64()
                .unwrap_or(0.0)
                * 100.0;
        }

        // 2. Annualized return. Zero trading days means zero years, reported as 0.
        report.trading_days = snapshots.len();
        report.years = report.trading_days as f64 / TRADING_DAYS_PER_YEAR;
        if report.years > 0.0 && initial_capital > dec!(0) {
            let growth = (report.final_portfolio_value / initial_capital)
                .to_f64()
                .unwrap_or(1.0);
            report.annualized_return_pct = (growth.powf(1.0 / report.years) - 1.0) * 100.0;
        }

        // 3. Trade counts come from executed fills, not from raw signals.
        report.num_trades = trades.len();
        report.num_buy_signals = trades.iter().filter(|t| t.side == Side::Buy).count();
        report.num_sell_signals = trades.iter().filter(|t| t.side == Side::Sell).count();

        // 4. Win rate over BUY->SELL round trips. Ties count as losses.
        let pairs = pair_trades(trades);
        report.num_winning_trades = pairs
            .iter()
            .filter(|(entry, exit)| exit.price > entry.price)
            .count();
        report.num_losing_trades = pairs.len() - report.num_winning_trades;
        if !pairs.is_empty() {
            report.win_rate_pct = report.num_winning_trades as f64 / pairs.len() as f64 * 100.0;
        }

        // 5. Risk
        let values: Vec<Decimal> = snapshots.iter().map(|s| s.portfolio_value).collect();
        report.max_drawdown_pct = max_drawdown_pct(&values);
        report.sharpe_ratio = sharpe_ratio(&values);

        report
    }
}

/// Pairs each BUY with the next SELL.
///
/// The simulator guarantees strict alternation, but the pairing re-checks it:
/// a SELL with no open BUY is skipped and a BUY arriving while another is
/// still open replaces it. A trailing unmatched BUY is left out.
pub fn pair_trades(trades: &[Trade]) -> Vec<(&Trade, &Trade)> {
    let mut pairs = Vec::new();
    let mut open_entry: Option<&Trade> = None;

    for trade in trades {
        match trade.side {
            Side::Buy => {
                if let Some(previous) = open_entry {
                    warn!(
                        previous = %previous.timestamp,
                        current = %trade.timestamp,
                        "BUY while another BUY is unmatched; keeping the later one."
                    );
                }
                open_entry = Some(trade);
            }
            Side::Sell => match open_entry.take() {
                Some(entry) => pairs.push((entry, trade)),
                None => {
                    warn!(timestamp = %trade.timestamp, "SELL without a preceding BUY; skipped.");
                }
            },
        }
    }

    pairs
}

/// The deepest decline from the running maximum, in percent.
///
/// Returns a non-positive number; 0 for a non-decreasing series. Points where
/// the running maximum is zero contribute nothing.
pub fn max_drawdown_pct(values: &[Decimal]) -> f64 {
    let mut peak: Option<Decimal> = None;
    let mut max_drawdown = 0.0_f64;

    for value in values {
        let running_max = peak.map_or(*value, |p| p.max(*value));
        peak = Some(running_max);
        if running_max.is_zero() {
            continue;
        }
        let drawdown = ((*value - running_max) / running_max).to_f64().unwrap_or(0.0) * 100.0;
        max_drawdown = max_drawdown.min(drawdown);
    }

    max_drawdown
}

/// Annualized Sharpe ratio of simple step returns with a zero risk-free rate.
///
/// Uses the sample (N-1) standard deviation. Steps following a zero value are
/// dropped. Fewer than two returns, or zero dispersion, gives 0.
pub fn sharpe_ratio(values: &[Decimal]) -> f64 {
    let returns: Vec<f64> = values
        .windows(2)
        .filter(|w| !w[0].is_zero())
        .filter_map(|w| (w[1] / w[0] - Decimal::ONE).to_f64())
        .collect();

    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean_return = returns.iter().sum::<f64>() / n;
    let std_dev = {
        let variance = returns.iter().map(|r| (*r - mean_return).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    };

    if std_dev > 0.0 {
        mean_return / std_dev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
