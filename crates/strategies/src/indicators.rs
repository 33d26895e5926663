// In crates/strategies/src/indicators.rs

use core_types::{Error, Result};
use ta::indicators::SimpleMovingAverage as Sma;
use ta::{Next, Reset};

/// Computes a simple moving average over a series that may contain gaps.
///
/// The output has the same length as `values`. Index `i` holds the mean of
/// `values[i + 1 - period..=i]` when every value in that window is defined and
/// `None` otherwise, so a missing input blanks the next `period` outputs.
pub fn simple_moving_average(values: &[Option<f64>], period: usize) -> Result<Vec<Option<f64>>> {
    if period == 0 {
        return Err(Error::InvalidParameter(
            "Period must be a positive integer".to_string(),
        ));
    }
    if values.len() < period {
        return Err(Error::InsufficientData {
            len: values.len(),
            period,
        });
    }

    let mut sma = Sma::new(period).map_err(|e| Error::InvalidParameter(format!("{e:?}")))?;
    // Number of consecutive defined inputs fed since the last gap.
    let mut defined_run = 0usize;

    let averages = values
        .iter()
        .map(|value| match value {
            Some(v) => {
                defined_run += 1;
                let avg = sma.next(*v);
                (defined_run >= period).then_some(avg)
            }
            None => {
                sma.reset();
                defined_run = 0;
                None
            }
        })
        .collect();

    Ok(averages)
}

/// Flags the indices where the short average moves from at-or-below the long
/// average to strictly above it.
///
/// Index 0 is always `false`. Any undefined operand at `i - 1` or `i` yields
/// `false`. Inputs are expected to be the same length; extra trailing values
/// on the longer side are ignored.
pub fn detect_golden_cross(short_ma: &[Option<f64>], long_ma: &[Option<f64>]) -> Vec<bool> {
    detect_transition(short_ma, long_ma, |prev_short, prev_long, short, long| {
        prev_short <= prev_long && short > long
    })
}

/// Flags the indices where the short average moves from at-or-above the long
/// average to strictly below it. Mirrors [`detect_golden_cross`].
pub fn detect_death_cross(short_ma: &[Option<f64>], long_ma: &[Option<f64>]) -> Vec<bool> {
    detect_transition(short_ma, long_ma, |prev_short, prev_long, short, long| {
        prev_short >= prev_long && short < long
    })
}

fn detect_transition<F>(short_ma: &[Option<f64>], long_ma: &[Option<f64>], crossed: F) -> Vec<bool>
where
    F: Fn(f64, f64, f64, f64) -> bool,
{
    let pairs: Vec<Option<(f64, f64)>> = short_ma
        .iter()
        .zip(long_ma)
        .map(|(short, long)| short.zip(*long))
        .collect();

    std::iter::once(false)
        .chain(pairs.windows(2).map(|w| match (w[0], w[1]) {
            (Some((prev_short, prev_long)), Some((short, long))) => {
                crossed(prev_short, prev_long, short, long)
            }
            _ => false,
        }))
        .take(pairs.len())
        .collect()
}
