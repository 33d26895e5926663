// In crates/core-types/src/types.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A ticker symbol, always stored upper-cased (e.g., "AAPL").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One daily closing price. A missing close is `None`, never a sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub close: Option<Decimal>,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, close: Option<Decimal>) -> Self {
        Self { timestamp, close }
    }
}

/// The discrete trading signal derived from moving-average crosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
}

/// The side of an executed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("BUY"),
            Side::Sell => f.write_str("SELL"),
        }
    }
}

/// The position implied by the signal sequence alone, regardless of fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    #[default]
    Flat,
    Long,
}

/// Per-timestamp output of the moving-average signal generator.
///
/// `golden_cross` and `death_cross` are never both set. `signal` is `Buy`
/// exactly when `golden_cross` is set and `Sell` exactly when `death_cross` is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
    pub golden_cross: bool,
    pub death_cross: bool,
    pub signal: Signal,
    pub position: Position,
}

impl SignalRecord {
    /// True when the price and both averages are defined at this step.
    pub fn is_tradable(&self) -> bool {
        self.price.is_some() && self.short_ma.is_some() && self.long_ma.is_some()
    }
}
