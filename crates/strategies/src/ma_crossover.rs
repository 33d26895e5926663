// In crates/strategies/src/ma_crossover.rs

use crate::indicators::{detect_death_cross, detect_golden_cross, simple_moving_average};
use crate::types::MACrossoverSettings;
use crate::Strategy;
use core_types::{Error, Position, PricePoint, Result, Signal, SignalRecord};
use num_traits::cast::ToPrimitive;

/// The golden-cross / death-cross strategy over two simple moving averages.
#[derive(Debug, Clone)]
pub struct MACrossover {
    /// The configuration for this strategy instance.
    settings: MACrossoverSettings,
}

impl MACrossover {
    /// Creates a new `MACrossover` strategy instance from its settings.
    pub fn new(settings: MACrossoverSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MACrossoverSettings {
        &self.settings
    }
}

impl Strategy for MACrossover {
    fn name(&self) -> &'static str {
        "MACrossover"
    }

    fn generate(&self, prices: &[PricePoint]) -> Result<Vec<SignalRecord>> {
        generate_signals(
            prices,
            self.settings.short_period as usize,
            self.settings.long_period as usize,
        )
    }
}

/// Builds the full signal table for a price series.
///
/// Fails with `InvalidParameter` when `short_period >= long_period` or either
/// period is zero, with `NoData` on an empty series and with
/// `InsufficientData` when the series is shorter than a period.
pub fn generate_signals(
    prices: &[PricePoint],
    short_period: usize,
    long_period: usize,
) -> Result<Vec<SignalRecord>> {
    if short_period >= long_period {
        return Err(Error::InvalidParameter(format!(
            "Short period ({short_period}) must be less than long period ({long_period})"
        )));
    }
    if prices.is_empty() {
        return Err(Error::NoData("price series is empty".to_string()));
    }

    // The averages are computed on f64; the decimal close stays on the record.
    let closes: Vec<Option<f64>> = prices
        .iter()
        .map(|p| p.close.and_then(|c| c.to_f64()))
        .collect();

    let short_ma = simple_moving_average(&closes, short_period)?;
    let long_ma = simple_moving_average(&closes, long_period)?;
    let golden_cross = detect_golden_cross(&short_ma, &long_ma);
    let death_cross = detect_death_cross(&short_ma, &long_ma);

    let signals: Vec<Signal> = golden_cross
        .iter()
        .zip(&death_cross)
        .map(|(golden, death)| match (golden, death) {
            (true, _) => Signal::Buy,
            (_, true) => Signal::Sell,
            _ => Signal::Hold,
        })
        .collect();
    let positions = positions_from_signals(&signals);

    let records = prices
        .iter()
        .enumerate()
        .map(|(i, point)| SignalRecord {
            timestamp: point.timestamp,
            price: point.close,
            short_ma: short_ma[i],
            long_ma: long_ma[i],
            golden_cross: golden_cross[i],
            death_cross: death_cross[i],
            signal: signals[i],
            position: positions[i],
        })
        .collect();

    Ok(records)
}

/// Left-to-right scan: a `Buy` goes long, a `Sell` goes flat, anything else
/// keeps the previous state. Starts flat.
pub fn positions_from_signals(signals: &[Signal]) -> Vec<Position> {
    signals
        .iter()
        .scan(Position::Flat, |state, signal| {
            match signal {
                Signal::Buy => *state = Position::Long,
                Signal::Sell => *state = Position::Flat,
                Signal::Hold => {}
            }
            Some(*state)
        })
        .collect()
}
