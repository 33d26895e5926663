// In crates/web-server/src/types.rs

use crate::{Error, Result};
use analytics::types::{PerformanceReport, PortfolioSnapshot, Trade};
use app_config::BacktestDefaults;
use backtester::{BacktestOutcome, MAX_INITIAL_CAPITAL, SimulationSettings};
use chrono::{DateTime, NaiveDate, Utc};
use core_types::{Side, Signal, SignalRecord, Symbol};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strategies::types::MACrossoverSettings;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Upper bound on the commission a request may ask for (10%).
pub const MAX_COMMISSION: Decimal = dec!(0.1);

/// Body of `POST /api/backtest`. Omitted parameters fall back to the
/// configured defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct BacktestRequest {
    pub ticker: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub short_period: Option<u32>,
    #[serde(default)]
    pub long_period: Option<u32>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub initial_capital: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub commission: Option<Decimal>,
}

/// A validated backtest request.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestParams {
    pub symbol: Symbol,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub crossover: MACrossoverSettings,
    pub simulation: SimulationSettings,
}

impl BacktestParams {
    pub fn from_request(request: BacktestRequest, defaults: &BacktestDefaults) -> Result<Self> {
        let symbol = Symbol::new(&request.ticker);
        if symbol.0.is_empty() {
            return Err(Error::BadRequest("ticker is required".to_string()));
        }

        let start = parse_date("start_date", &request.start_date)?;
        let end = parse_date("end_date", &request.end_date)?;
        if start >= end {
            return Err(Error::BadRequest(format!(
                "Invalid date range: start_date ({start}) must be before end_date ({end})"
            )));
        }

        let crossover = MACrossoverSettings {
            short_period: request.short_period.unwrap_or(defaults.short_period),
            long_period: request.long_period.unwrap_or(defaults.long_period),
        };
        if crossover.short_period == 0 {
            return Err(Error::BadRequest("short_period must be at least 1".to_string()));
        }
        if crossover.short_period >= crossover.long_period {
            return Err(Error::BadRequest(format!(
                "short_period ({}) must be less than long_period ({})",
                crossover.short_period, crossover.long_period
            )));
        }

        let simulation = SimulationSettings {
            initial_capital: request.initial_capital.unwrap_or(defaults.initial_capital),
            commission: request.commission.unwrap_or(defaults.commission),
        };
        if simulation.initial_capital <= Decimal::ZERO || simulation.initial_capital > MAX_INITIAL_CAPITAL {
            return Err(Error::BadRequest(format!(
                "initial_capital ({}) must be greater than 0 and at most {MAX_INITIAL_CAPITAL}",
                simulation.initial_capital
            )));
        }
        if simulation.commission < Decimal::ZERO || simulation.commission > MAX_COMMISSION {
            return Err(Error::BadRequest(format!(
                "commission ({}) must be between 0 and {MAX_COMMISSION}",
                simulation.commission
            )));
        }

        Ok(Self {
            symbol,
            start,
            end,
            crossover,
            simulation,
        })
    }

    /// Canonical identity of the request, used as the cache key.
    pub fn run_key(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}_{}_{}",
            self.symbol,
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT),
            self.crossover.short_period,
            self.crossover.long_period,
            self.simulation.initial_capital.normalize(),
            self.simulation.commission.normalize()
        )
    }
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        Error::BadRequest(format!("Invalid date format for {field}: '{raw}'. Use YYYY-MM-DD"))
    })
}

/// The `{ "success": true, "data": ... }` envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestData {
    pub run_key: String,
    pub request_params: RequestParams,
    pub performance_metrics: PerformanceMetrics,
    pub chart_data: ChartData,
    pub trades: Vec<TradeRow>,
}

impl BacktestData {
    pub fn new(params: &BacktestParams, outcome: &BacktestOutcome) -> Self {
        Self {
            run_key: params.run_key(),
            request_params: RequestParams::from(params),
            performance_metrics: PerformanceMetrics::from(&outcome.report),
            chart_data: ChartData::new(&outcome.signals, &outcome.snapshots),
            trades: outcome.trades.iter().map(TradeRow::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestParams {
    pub ticker: String,
    pub start_date: String,
    pub end_date: String,
    pub short_period: u32,
    pub long_period: u32,
    pub initial_capital: f64,
    pub commission: f64,
}

impl From<&BacktestParams> for RequestParams {
    fn from(params: &BacktestParams) -> Self {
        Self {
            ticker: params.symbol.to_string(),
            start_date: params.start.format(DATE_FORMAT).to_string(),
            end_date: params.end.format(DATE_FORMAT).to_string(),
            short_period: params.crossover.short_period,
            long_period: params.crossover.long_period,
            initial_capital: to_f64(params.simulation.initial_capital),
            commission: to_f64(params.simulation.commission),
        }
    }
}

/// Presentation copy of the report: percentages and years at 2 decimals,
/// Sharpe at 3.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub initial_capital: f64,
    pub final_portfolio_value: f64,
    pub profit_loss: f64,
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

impl From<&PerformanceReport> for PerformanceMetrics {
    fn from(report: &PerformanceReport) -> Self {
        Self {
            initial_capital: to_f64(report.initial_capital),
            final_portfolio_value: to_f64(report.final_portfolio_value),
            profit_loss: to_f64(report.profit_loss),
            total_return_pct: round_to(report.total_return_pct, 2),
            annualized_return_pct: round_to(report.annualized_return_pct, 2),
            num_trades: report.num_trades,
            num_buy_signals: report.num_buy_signals,
            num_sell_signals: report.num_sell_signals,
            num_winning_trades: report.num_winning_trades,
            num_losing_trades: report.num_losing_trades,
            win_rate_pct: round_to(report.win_rate_pct, 2),
            max_drawdown_pct: round_to(report.max_drawdown_pct, 2),
            sharpe_ratio: round_to(report.sharpe_ratio, 3),
            trading_days: report.trading_days,
            years: round_to(report.years, 2),
        }
    }
}

/// Index-aligned series for plotting. Undefined values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub dates: Vec<String>,
    pub prices: Vec<Option<f64>>,
    pub short_ma: Vec<Option<f64>>,
    pub long_ma: Vec<Option<f64>>,
    pub signals: Vec<SignalPoint>,
    pub portfolio_values: Vec<f64>,
}

impl ChartData {
    pub fn new(records: &[SignalRecord], snapshots: &[PortfolioSnapshot]) -> Self {
        Self {
            dates: records.iter().map(|r| format_date(r.timestamp)).collect(),
            prices: records.iter().map(|r| r.price.and_then(|p| p.to_f64())).collect(),
            short_ma: records.iter().map(|r| r.short_ma).collect(),
            long_ma: records.iter().map(|r| r.long_ma).collect(),
            signals: records.iter().filter_map(SignalPoint::from_record).collect(),
            portfolio_values: snapshots.iter().map(|s| to_f64(s.portfolio_value)).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    GoldenCross,
    DeathCross,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalPoint {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: SignalKind,
    pub price: Option<f64>,
}

impl SignalPoint {
    fn from_record(record: &SignalRecord) -> Option<Self> {
        let kind = match record.signal {
            Signal::Buy => SignalKind::GoldenCross,
            Signal::Sell => SignalKind::DeathCross,
            Signal::Hold => return None,
        };
        Some(Self {
            date: format_date(record.timestamp),
            kind,
            price: record.price.and_then(|p| p.to_f64()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRow {
    pub date: String,
    #[serde(rename = "type")]
    pub side: Side,
    pub price: f64,
    pub shares: u64,
    pub value: f64,
    pub cash_after: f64,
    pub portfolio_value: f64,
}

impl From<&Trade> for TradeRow {
    fn from(trade: &Trade) -> Self {
        Self {
            date: format_date(trade.timestamp),
            side: trade.side,
            price: to_f64(trade.price),
            shares: trade.shares,
            value: to_f64(trade.gross_value),
            cash_after: to_f64(trade.cash_after),
            portfolio_value: to_f64(trade.portfolio_value_after),
        }
    }
}

fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format(DATE_FORMAT).to_string()
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(start: &str, end: &str) -> BacktestRequest {
        BacktestRequest {
            ticker: " spy ".to_string(),
            start_date: start.to_string(),
            end_date: end.to_string(),
            short_period: None,
            long_period: None,
            initial_capital: None,
            commission: None,
        }
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let params = BacktestParams::from_request(request("2020-01-01", "2023-12-31"), &BacktestDefaults::default()).unwrap();
        assert_eq!(params.symbol, Symbol::new("SPY"));
        assert_eq!(params.crossover, MACrossoverSettings { short_period: 50, long_period: 200 });
        assert_eq!(params.simulation.initial_capital, dec!(100000));
        assert_eq!(params.simulation.commission, dec!(0.001));
        assert_eq!(params.run_key(), "SPY_2020-01-01_2023-12-31_50_200_100000_0.001");
    }

    #[test]
    fn rejects_bad_dates() {
        let defaults = BacktestDefaults::default();
        for (start, end) in [("2020/01/01", "2020-02-01"), ("2020-01-01", "soon"), ("2020-03-01", "2020-03-01"), ("2021-01-01", "2020-01-01")] {
            assert!(
                matches!(BacktestParams::from_request(request(start, end), &defaults), Err(Error::BadRequest(_))),
                "{start} .. {end}"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        let defaults = BacktestDefaults::default();
        let cases = [
            BacktestRequest { short_period: Some(200), ..request("2020-01-01", "2021-01-01") },
            BacktestRequest { short_period: Some(0), ..request("2020-01-01", "2021-01-01") },
            BacktestRequest { initial_capital: Some(dec!(0)), ..request("2020-01-01", "2021-01-01") },
            BacktestRequest { initial_capital: Some(dec!(100_000_000_000_000_000_000)), ..request("2020-01-01", "2021-01-01") },
            BacktestRequest { commission: Some(dec!(0.2)), ..request("2020-01-01", "2021-01-01") },
            BacktestRequest { commission: Some(dec!(-0.01)), ..request("2020-01-01", "2021-01-01") },
            BacktestRequest { ticker: "  ".to_string(), ..request("2020-01-01", "2021-01-01") },
        ];
        for case in cases {
            assert!(matches!(BacktestParams::from_request(case, &defaults), Err(Error::BadRequest(_))));
        }
        let edge = BacktestRequest { commission: Some(dec!(0.1)), ..request("2020-01-01", "2021-01-01") };
        assert!(BacktestParams::from_request(edge, &defaults).is_ok());
    }

    #[test]
    fn request_body_accepts_numbers_and_omissions() {
        let body = r#"{"ticker":"aapl","start_date":"2020-01-01","end_date":"2021-01-01","initial_capital":10000,"commission":0.002}"#;
        let request: BacktestRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.initial_capital, Some(dec!(10000)));
        assert_eq!(request.commission, Some(dec!(0.002)));
        assert_eq!(request.short_period, None);
    }

    #[test]
    fn rounding_for_presentation() {
        assert_eq!(round_to(12.3456, 2), 12.35);
        assert_eq!(round_to(-11.304347, 2), -11.3);
        assert_eq!(round_to(1.23456, 3), 1.235);
    }
}
