// In crates/backtester/src/simulator.rs

use crate::logger::TradeLogger;
use crate::types::SimulationSettings;
use analytics::types::{PortfolioSnapshot, Trade};
use core_types::{Error, Result, Side, Signal, SignalRecord};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

/// The running account between two steps: cash plus a whole number of shares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountState {
    pub cash: Decimal,
    pub shares: u64,
}

impl AccountState {
    pub fn new(cash: Decimal) -> Self {
        Self { cash, shares: 0 }
    }

    fn value_at(&self, price: Decimal) -> Result<Decimal> {
        Decimal::from(self.shares)
            .checked_mul(price)
            .and_then(|held| self.cash.checked_add(held))
            .ok_or_else(|| overflow("portfolio value", price))
    }
}

fn overflow(what: &str, price: Decimal) -> Error {
    Error::Overflow(format!("{what} at price {price} exceeds the representable range"))
}

/// The outcome of applying one signal record to an account state.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: AccountState,
    pub trade: Option<Trade>,
    pub snapshot: PortfolioSnapshot,
}

/// Single-position, full-allocation, long-only execution simulator.
///
/// Orders fill at the step's close. A BUY spends as much cash as buys whole
/// shares including commission; a SELL liquidates the full position.
#[derive(Debug, Clone)]
pub struct PositionSimulator {
    settings: SimulationSettings,
}

impl PositionSimulator {
    pub fn new(settings: SimulationSettings) -> Self {
        Self { settings }
    }

    /// Folds the signal table left to right, producing the trade log and one
    /// snapshot per record.
    pub fn run(&self, records: &[SignalRecord]) -> Result<(Vec<Trade>, Vec<PortfolioSnapshot>)> {
        let mut logger = TradeLogger::with_capacity(records.len());

        let final_state = records
            .iter()
            .try_fold(AccountState::new(self.settings.initial_capital), |state, record| {
                let step = self.step(state, record)?;
                if let Some(trade) = step.trade {
                    logger.record_trade(trade);
                }
                logger.record_snapshot(step.snapshot);
                Ok::<_, Error>(step.state)
            })?;

        tracing::debug!(
            cash = %final_state.cash,
            shares = final_state.shares,
            "Simulation finished."
        );
        Ok(logger.into_parts())
    }

    /// Applies one record to `state`. Pure: the same inputs always give the
    /// same step.
    pub fn step(&self, state: AccountState, record: &SignalRecord) -> Result<Step> {
        // Without a price and both averages there is nothing to trade on and
        // nothing to mark the position against.
        let price = match record.price {
            Some(price) if record.is_tradable() && price > Decimal::ZERO => price,
            _ => {
                return Ok(Step {
                    state,
                    trade: None,
                    snapshot: PortfolioSnapshot {
                        timestamp: record.timestamp,
                        cash: state.cash,
                        shares_held: state.shares,
                        mark_price: record.price,
                        portfolio_value: state.cash,
                        signal: Signal::Hold,
                    },
                });
            }
        };

        let (next, trade) = match record.signal {
            Signal::Buy if state.shares == 0 => self.buy(state, record, price)?,
            Signal::Sell if state.shares > 0 => self.sell(state, record, price)?,
            _ => (state, None),
        };

        Ok(Step {
            state: next,
            trade,
            snapshot: PortfolioSnapshot {
                timestamp: record.timestamp,
                cash: next.cash,
                shares_held: next.shares,
                mark_price: Some(price),
                portfolio_value: next.value_at(price)?,
                signal: record.signal,
            },
        })
    }

    fn buy(&self, state: AccountState, record: &SignalRecord, price: Decimal) -> Result<(AccountState, Option<Trade>)> {
        let unit_cost = price
            .checked_mul(Decimal::ONE + self.settings.commission)
            .ok_or_else(|| overflow("unit cost", price))?;
        let mut shares = state
            .cash
            .checked_div(unit_cost)
            .and_then(|affordable| affordable.floor().to_u64())
            .ok_or_else(|| overflow("share count", price))?;
        let mut cost = Decimal::from(shares)
            .checked_mul(unit_cost)
            .ok_or_else(|| overflow("buy cost", price))?;
        // Decimal division rounds at 28 digits; never spend more than we hold.
        if shares > 0 && cost > state.cash {
            shares -= 1;
            cost = Decimal::from(shares) * unit_cost;
        }
        if shares == 0 {
            return Ok((state, None));
        }

        let next = AccountState {
            cash: state.cash - cost,
            shares,
        };
        let trade = Trade {
            timestamp: record.timestamp,
            side: Side::Buy,
            price,
            shares,
            gross_value: cost,
            cash_after: next.cash,
            portfolio_value_after: next.value_at(price)?,
        };
        Ok((next, Some(trade)))
    }

    fn sell(&self, state: AccountState, record: &SignalRecord, price: Decimal) -> Result<(AccountState, Option<Trade>)> {
        let proceeds = Decimal::from(state.shares)
            .checked_mul(price)
            .and_then(|gross| gross.checked_mul(Decimal::ONE - self.settings.commission))
            .ok_or_else(|| overflow("sell proceeds", price))?;
        let cash = state
            .cash
            .checked_add(proceeds)
            .ok_or_else(|| overflow("cash after sell", price))?;
        let next = AccountState { cash, shares: 0 };
        let trade = Trade {
            timestamp: record.timestamp,
            side: Side::Sell,
            price,
            shares: state.shares,
            gross_value: proceeds,
            cash_after: next.cash,
            portfolio_value_after: next.cash,
        };
        Ok((next, Some(trade)))
    }
}
