// In crates/market-data/src/memory.rs

use std::collections::HashMap;

use crate::{Error, PriceSource, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{PricePoint, Symbol};

/// A price source backed by series held in memory. Used for offline runs
/// and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    series: HashMap<Symbol, Vec<PricePoint>>,
}

impl StaticPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the series for `symbol`. Points are sorted by time.
    pub fn with_series(mut self, symbol: Symbol, points: Vec<PricePoint>) -> Self {
        self.insert(symbol, points);
        self
    }

    pub fn insert(&mut self, symbol: Symbol, mut points: Vec<PricePoint>) {
        points.sort_by_key(|p| p.timestamp);
        self.series.insert(symbol, points);
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    fn name(&self) -> &'static str {
        "StaticPriceSource"
    }

    async fn fetch_daily_closes(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>> {
        let points: Vec<PricePoint> = self
            .series
            .get(symbol)
            .map(|series| {
                series
                    .iter()
                    .filter(|p| {
                        let date = p.timestamp.date_naive();
                        date >= start && date < end
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if points.is_empty() {
            return Err(Error::NoData {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }
        Ok(points)
    }
}
