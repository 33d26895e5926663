// In app/src/summary.rs

use std::fmt::{self, Write};

use analytics::types::Trade;
use backtester::BacktestOutcome;
use strategies::cross_summary;
use web_server::types::BacktestParams;

const RULE: &str = "-----------------------------------";

/// Renders the performance report in a readable format.
pub fn write_report(out: &mut impl Write, params: &BacktestParams, outcome: &BacktestOutcome) -> fmt::Result {
    let report = &outcome.report;
    let crosses = cross_summary(&outcome.signals);

    writeln!(out, "\n--- MA Crossover Backtest: {} ---", params.symbol)?;
    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "Strategy:              SMA({}) / SMA({}) golden/death cross",
        params.crossover.short_period, params.crossover.long_period
    )?;
    writeln!(out, "Period:                {} .. {}", params.start, params.end)?;
    writeln!(out, "Commission:            {}", params.simulation.commission)?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Initial Capital:       ${:.2}", report.initial_capital)?;
    writeln!(out, "Final Value:           ${:.2}", report.final_portfolio_value)?;
    writeln!(out, "Net P&L:               ${:.2} ({:.2}%)", report.profit_loss, report.total_return_pct)?;
    writeln!(out, "Annualized Return:     {:.2}%", report.annualized_return_pct)?;
    writeln!(out, "Trading Days:          {} ({:.2} years)", report.trading_days, report.years)?;
    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "Crosses:               {} golden, {} death",
        crosses.total_golden_crosses, crosses.total_death_crosses
    )?;
    writeln!(
        out,
        "Total Trades:          {} ({} buys, {} sells)",
        report.num_trades, report.num_buy_signals, report.num_sell_signals
    )?;
    writeln!(
        out,
        "Win Rate:              {:.2}% ({} won, {} lost)",
        report.win_rate_pct, report.num_winning_trades, report.num_losing_trades
    )?;
    writeln!(out, "Max Drawdown:          {:.2}%", report.max_drawdown_pct)?;
    writeln!(out, "Sharpe Ratio:          {:.3}", report.sharpe_ratio)?;
    writeln!(out, "{RULE}")
}

/// Renders one line per executed trade.
pub fn write_trades(out: &mut impl Write, trades: &[Trade]) -> fmt::Result {
    if trades.is_empty() {
        return writeln!(out, "No trades executed.");
    }

    writeln!(
        out,
        "{:<10}  {:<4}  {:>10}  {:>8}  {:>14}  {:>14}",
        "Date", "Side", "Price", "Shares", "Value", "Portfolio"
    )?;
    for trade in trades {
        writeln!(
            out,
            "{:<10}  {:<4}  {:>10.2}  {:>8}  {:>14.2}  {:>14.2}",
            trade.timestamp.format("%Y-%m-%d"),
            trade.side.to_string(),
            trade.price,
            trade.shares,
            trade.gross_value,
            trade.portfolio_value_after
        )?;
    }
    Ok(())
}
