// In crates/backtester/src/logger.rs

use analytics::types::{PortfolioSnapshot, Trade};
use tracing::debug;

/// Collects the trade log and the per-step snapshots produced by a run.
#[derive(Debug, Default)]
pub struct TradeLogger {
    trades: Vec<Trade>,
    snapshots: Vec<PortfolioSnapshot>,
}

impl TradeLogger {
    /// Creates a logger sized for `steps` snapshots.
    pub fn with_capacity(steps: usize) -> Self {
        Self {
            trades: Vec::new(),
            snapshots: Vec::with_capacity(steps),
        }
    }

    pub fn record_trade(&mut self, trade: Trade) {
        debug!(
            time = %trade.timestamp,
            side = %trade.side,
            price = %trade.price,
            shares = trade.shares,
            value = %trade.gross_value,
            "Trade executed."
        );
        self.trades.push(trade);
    }

    pub fn record_snapshot(&mut self, snapshot: PortfolioSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn into_parts(self) -> (Vec<Trade>, Vec<PortfolioSnapshot>) {
        (self.trades, self.snapshots)
    }
}
