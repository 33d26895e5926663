// In crates/analytics/src/lib.rs

pub mod engine;
pub mod types;

pub use engine::{AnalyticsEngine, TRADING_DAYS_PER_YEAR, max_drawdown_pct, pair_trades, sharpe_ratio};
pub use types::{PerformanceReport, PortfolioSnapshot, Trade};
