// In crates/strategies/src/lib.rs

use core_types::{PricePoint, Result, SignalRecord};
pub mod indicators;
pub mod ma_crossover;
pub mod summary;
pub mod types;

pub use indicators::{detect_death_cross, detect_golden_cross, simple_moving_average};
pub use ma_crossover::{MACrossover, generate_signals};
pub use summary::{CrossSummary, cross_summary, trade_signals};

/// The universal interface for a signal-generating strategy.
///
/// A strategy turns a full, time-ordered price series into one `SignalRecord`
/// per input point. It holds no state between calls, so the same input always
/// yields the same output.
pub trait Strategy {
    /// The name of the strategy.
    fn name(&self) -> &'static str;

    fn generate(&self, prices: &[PricePoint]) -> Result<Vec<SignalRecord>>;
}
