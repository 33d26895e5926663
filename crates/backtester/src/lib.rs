pub mod logger;
pub mod simulator;
pub mod types;

pub use simulator::{AccountState, PositionSimulator, Step};
pub use types::{MAX_INITIAL_CAPITAL, SimulationSettings};

use analytics::engine::AnalyticsEngine;
use analytics::types::{PerformanceReport, PortfolioSnapshot, Trade};
use core_types::{Error, PricePoint, Result, SignalRecord};
use serde::Serialize;
use strategies::types::MACrossoverSettings;
use strategies::{MACrossover, Strategy};
use tracing::info;

/// Everything produced by a single backtest run.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestOutcome {
    /// One record per input price, aligned by index.
    pub signals: Vec<SignalRecord>,
    /// Executed fills in time order.
    pub trades: Vec<Trade>,
    /// One snapshot per input price.
    pub snapshots: Vec<PortfolioSnapshot>,
    pub report: PerformanceReport,
}

/// The main engine for running historical backtests.
///
/// A run is a pure function of the settings, the strategy and the price
/// series: nothing is kept between calls to [`Backtester::run`].
pub struct Backtester {
    settings: SimulationSettings,
    /// A single strategy instance to test.
    strategy: Box<dyn Strategy + Send + Sync>,
}

impl Backtester {
    pub fn new(settings: SimulationSettings, strategy: Box<dyn Strategy + Send + Sync>) -> Self {
        Self { settings, strategy }
    }

    /// Shorthand for a backtest of the moving-average crossover strategy.
    pub fn ma_crossover(settings: SimulationSettings, crossover: MACrossoverSettings) -> Self {
        Self::new(settings, Box::new(MACrossover::new(crossover)))
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn run(&self, prices: &[PricePoint]) -> Result<BacktestOutcome> {
        self.settings.validate()?;
        if prices.is_empty() {
            return Err(Error::NoData("price series is empty".to_string()));
        }

        // --- 1. Signals ---
        let signals = self.strategy.generate(prices)?;

        // --- 2. Simulation ---
        let simulator = PositionSimulator::new(self.settings);
        let (trades, snapshots) = simulator.run(&signals)?;

        // --- 3. Analytics ---
        let report = AnalyticsEngine::new().calculate(self.settings.initial_capital, &trades, &snapshots);

        info!(
            strategy = self.strategy.name(),
            steps = signals.len(),
            trades = report.num_trades,
            final_value = %report.final_portfolio_value,
            total_return_pct = report.total_return_pct,
            "Backtest finished."
        );

        Ok(BacktestOutcome {
            signals,
            trades,
            snapshots,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use core_types::{Side, Signal};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn series(values: &[Decimal]) -> Vec<PricePoint> {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| PricePoint::new(start + Duration::days(i as i64), Some(*v)))
            .collect()
    }

    fn v_shape() -> Vec<PricePoint> {
        let raw = [20, 19, 18, 17, 16, 15, 16, 18, 20, 22, 24, 22, 20, 18, 16, 14, 12];
        series(&raw.iter().map(|v| Decimal::from(*v)).collect::<Vec<_>>())
    }

    fn backtester(capital: Decimal, commission: Decimal, short: u32, long: u32) -> Backtester {
        Backtester::ma_crossover(
            SimulationSettings {
                initial_capital: capital,
                commission,
            },
            MACrossoverSettings {
                short_period: short,
                long_period: long,
            },
        )
    }

    #[test]
    fn flat_prices_leave_capital_untouched() {
        let prices = series(&[dec!(100); 100]);
        let outcome = backtester(dec!(10000), dec!(0.001), 5, 20).run(&prices).unwrap();

        assert!(outcome.signals.iter().all(|r| !r.golden_cross && !r.death_cross));
        assert!(outcome.trades.is_empty());
        assert_eq!(outcome.snapshots.len(), 100);
        assert_eq!(outcome.report.final_portfolio_value, dec!(10000));
        assert_eq!(outcome.report.max_drawdown_pct, 0.0);
        assert_eq!(outcome.report.sharpe_ratio, 0.0);
    }

    #[test]
    fn crossover_round_trip_without_commission() {
        let outcome = backtester(dec!(10000), dec!(0), 2, 4).run(&v_shape()).unwrap();

        assert_eq!(outcome.trades.len(), 2);
        let (buy, sell) = (&outcome.trades[0], &outcome.trades[1]);
        assert_eq!(buy.side, Side::Buy);
        assert_eq!(sell.side, Side::Sell);
        // Golden cross at index 7 (close 18), death cross at index 12 (close 20).
        assert_eq!(buy.price, dec!(18));
        assert_eq!(buy.shares, 555);
        assert_eq!(buy.gross_value, dec!(9990));
        assert_eq!(sell.price, dec!(20));
        assert_eq!(sell.shares, 555);
        assert_eq!(sell.gross_value, dec!(11100));
        assert_eq!(outcome.report.final_portfolio_value, dec!(11110));
        assert_eq!(outcome.report.num_winning_trades, 1);
        assert_eq!(outcome.report.num_trades, 2);
        assert_eq!(outcome.report.num_buy_signals, 1);
        assert_eq!(outcome.report.num_sell_signals, 1);
    }

    #[test]
    fn snapshots_value_cash_plus_marked_shares() {
        let outcome = backtester(dec!(5000), dec!(0.001), 2, 4).run(&v_shape()).unwrap();
        assert_eq!(outcome.snapshots.len(), outcome.signals.len());
        for snapshot in &outcome.snapshots {
            let price = snapshot.mark_price.unwrap();
            assert_eq!(
                snapshot.portfolio_value,
                snapshot.cash + Decimal::from(snapshot.shares_held) * price
            );
        }
        // Warm-up steps before both averages exist are forced to HOLD.
        assert!(outcome.snapshots[..3].iter().all(|s| s.signal == Signal::Hold));
        assert_eq!(outcome.snapshots[7].signal, Signal::Buy);
    }

    #[test]
    fn zero_capital_runs_without_trades() {
        let outcome = backtester(dec!(0), dec!(0.001), 2, 4).run(&v_shape()).unwrap();
        assert!(outcome.trades.is_empty());
        assert_eq!(outcome.report.total_return_pct, 0.0);
        assert_eq!(outcome.report.final_portfolio_value, dec!(0));
    }

    #[test]
    fn tiny_capital_cannot_afford_a_share() {
        let outcome = backtester(dec!(5), dec!(0), 2, 4).run(&v_shape()).unwrap();
        assert!(outcome.trades.is_empty());
        assert_eq!(outcome.report.final_portfolio_value, dec!(5));
    }

    #[test]
    fn runs_are_idempotent() {
        let bt = backtester(dec!(10000), dec!(0.001), 2, 4);
        let prices = v_shape();
        let first = bt.run(&prices).unwrap();
        let second = bt.run(&prices).unwrap();
        assert_eq!(first.trades, second.trades);
        assert_eq!(first.snapshots, second.snapshots);
        assert_eq!(first.report, second.report);
    }

    #[test]
    fn validation_order() {
        let bad_commission = backtester(dec!(10000), dec!(1), 2, 4);
        assert!(matches!(bad_commission.run(&[]), Err(Error::InvalidParameter(_))));

        let negative_capital = backtester(dec!(-1), dec!(0), 2, 4);
        assert!(matches!(negative_capital.run(&v_shape()), Err(Error::InvalidParameter(_))));

        let huge_capital = backtester(dec!(100_000_000_000_000_000_000), dec!(0), 2, 4);
        assert!(matches!(huge_capital.run(&v_shape()), Err(Error::InvalidParameter(_))));

        assert!(matches!(backtester(dec!(10000), dec!(0), 2, 4).run(&[]), Err(Error::NoData(_))));

        let too_short = series(&[dec!(1), dec!(2), dec!(3)]);
        assert_eq!(
            backtester(dec!(10000), dec!(0), 2, 4).run(&too_short).unwrap_err(),
            Error::InsufficientData { len: 3, period: 4 }
        );
        assert!(matches!(
            backtester(dec!(10000), dec!(0), 4, 4).run(&v_shape()),
            Err(Error::InvalidParameter(_))
        ));
    }
}
