// In crates/app-config/src/types.rs

use backtester::SimulationSettings;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use strategies::types::MACrossoverSettings;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    pub server: ServerSettings,
    /// Where daily closes are fetched from.
    pub market_data: MarketDataSettings,
    /// Parameters used when a request leaves them out.
    #[serde(default)]
    pub backtest: BacktestDefaults,
    #[serde(default)]
    pub cache: CacheSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MarketDataSettings {
    /// Base URL of the chart API, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BacktestDefaults {
    #[serde(with = "rust_decimal::serde::float")]
    pub initial_capital: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub commission: Decimal,
    pub short_period: u32,
    pub long_period: u32,
}

impl Default for BacktestDefaults {
    fn default() -> Self {
        Self {
            initial_capital: dec!(100_000),
            commission: dec!(0.001),
            short_period: 50,
            long_period: 200,
        }
    }
}

impl BacktestDefaults {
    pub fn simulation(&self) -> SimulationSettings {
        SimulationSettings {
            initial_capital: self.initial_capital,
            commission: self.commission,
        }
    }

    pub fn crossover(&self) -> MACrossoverSettings {
        MACrossoverSettings {
            short_period: self.short_period,
            long_period: self.long_period,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Maximum number of backtest responses kept in memory.
    pub capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { capacity: 32 }
    }
}
