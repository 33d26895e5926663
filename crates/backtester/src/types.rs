// In crates/backtester/src/types.rs

use core_types::{Error, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Largest starting cash a run accepts (one quadrillion).
pub const MAX_INITIAL_CAPITAL: Decimal = dec!(1_000_000_000_000_000);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Starting cash for the run.
    #[serde(with = "rust_decimal::serde::float")]
    pub initial_capital: Decimal,

    /// Proportional commission charged on both buy cost and sell proceeds
    /// (e.g., 0.001 for 0.1%).
    #[serde(with = "rust_decimal::serde::float")]
    pub commission: Decimal,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            initial_capital: dec!(100_000),
            commission: dec!(0.001),
        }
    }
}

impl SimulationSettings {
    /// Zero capital and zero commission are valid; negative capital, capital
    /// above [`MAX_INITIAL_CAPITAL`] and a commission of 100% or more are not.
    pub fn validate(&self) -> Result<()> {
        if self.initial_capital < Decimal::ZERO {
            return Err(Error::InvalidParameter(format!(
                "Initial capital ({}) must not be negative",
                self.initial_capital
            )));
        }
        if self.initial_capital > MAX_INITIAL_CAPITAL {
            return Err(Error::InvalidParameter(format!(
                "Initial capital ({}) must not exceed {MAX_INITIAL_CAPITAL}",
                self.initial_capital
            )));
        }
        if self.commission < Decimal::ZERO || self.commission >= Decimal::ONE {
            return Err(Error::InvalidParameter(format!(
                "Commission ({}) must be in [0, 1)",
                self.commission
            )));
        }
        Ok(())
    }
}
