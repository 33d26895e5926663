// In crates/strategies/src/summary.rs

use chrono::{DateTime, Utc};
use core_types::{Signal, SignalRecord};
use serde::Serialize;

/// Aggregate counts over a signal table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct CrossSummary {
    pub total_golden_crosses: usize,
    pub total_death_crosses: usize,
    pub total_signals: usize,
    pub first_signal_at: Option<DateTime<Utc>>,
    pub last_signal_at: Option<DateTime<Utc>>,
}

/// Returns only the records that carry a `Buy` or `Sell` signal, in order.
pub fn trade_signals(records: &[SignalRecord]) -> Vec<&SignalRecord> {
    records
        .iter()
        .filter(|r| r.signal != Signal::Hold)
        .collect()
}

pub fn cross_summary(records: &[SignalRecord]) -> CrossSummary {
    let trades = trade_signals(records);
    let total_golden_crosses = trades.iter().filter(|r| r.signal == Signal::Buy).count();
    let total_death_crosses = trades.iter().filter(|r| r.signal == Signal::Sell).count();

    CrossSummary {
        total_golden_crosses,
        total_death_crosses,
        total_signals: trades.len(),
        first_signal_at: trades.first().map(|r| r.timestamp),
        last_signal_at: trades.last().map(|r| r.timestamp),
    }
}
