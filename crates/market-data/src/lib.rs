// In crates/market-data/src/lib.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{PricePoint, Symbol};

pub mod chart;
pub mod error;
pub mod memory;
pub mod types;

// Re-export public types
pub use chart::{ChartClient, parse_chart};
pub use error::{Error, Result};
pub use memory::StaticPriceSource;

/// The universal interface for a source of historical daily closes.
///
/// Implementations return points in ascending time order, one per trading
/// day in `[start, end)`. A missing close is reported as `None` rather than
/// dropped, so downstream averages can see the gap.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// The name of the source (e.g., "ChartClient", "StaticPriceSource").
    fn name(&self) -> &'static str;

    async fn fetch_daily_closes(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>>;
}
