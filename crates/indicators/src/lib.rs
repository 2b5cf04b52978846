pub mod accum_dist;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod volatility;
pub mod volume;
pub mod vwap;

pub use accum_dist::{accumulation_distribution, AccumDist};
pub use atr::{atr, Atr};
pub use bollinger::{bollinger_bands, BollingerBands, BollingerOutput, BollingerSeries};
pub use ema::{ema, Ema};
pub use macd::{macd, Macd, MacdOutput, MacdSeries};
pub use obv::{obv, Obv};
pub use rsi::{rsi, Rsi};
pub use sma::{sma, Sma};
pub use volatility::{historical_volatility, log_returns, HistoricalVolatility};
pub use volume::{volume_stats, VolumeStats, VolumeTrend};
pub use vwap::{vwap, Vwap};

use serde::Serialize;

/// Trait for streaming (incremental) indicators.
/// Feed one value at a time; the indicator maintains internal state.
pub trait Indicator: Send + Sync {
    /// Process the next value and return the indicator output (if ready).
    fn next(&mut self, value: f64) -> Option<f64>;

    /// Reset the indicator to its initial state.
    fn reset(&mut self);

    /// The minimum number of data points needed before the indicator produces output.
    fn period(&self) -> usize;

    /// Whether the indicator has enough data to produce output.
    fn is_ready(&self) -> bool;
}

/// Errors raised by the batch indicator functions.
///
/// Insufficient history is never an error; those positions are `None`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndicatorError {
    #[error("indicator input is empty")]
    EmptyInput,
    #[error("invalid period for {indicator}: {reason}")]
    InvalidPeriod {
        indicator: &'static str,
        reason: String,
    },
    #[error("input columns differ in length ({expected} vs {actual})")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("non-positive price {value} at index {index}")]
    NonPositivePrice { index: usize, value: f64 },
}

/// Indicator values aligned 1:1 with the input bars.
///
/// `None` marks a position that is still inside the warm-up window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorSeries(Vec<Option<f64>>);

impl IndicatorSeries {
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value at `index`, `None` when undefined or out of range.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied().flatten()
    }

    /// The current reading: the final element, if it is defined.
    pub fn last(&self) -> Option<f64> {
        self.0.last().copied().flatten()
    }

    /// Index of the first defined value.
    pub fn first_defined(&self) -> Option<usize> {
        self.0.iter().position(Option::is_some)
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.0.iter().copied()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.0
    }
}

impl FromIterator<Option<f64>> for IndicatorSeries {
    fn from_iter<T: IntoIterator<Item = Option<f64>>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Feed every value through a streaming indicator, collecting each output.
pub fn run<I: Indicator>(indicator: &mut I, values: &[f64]) -> IndicatorSeries {
    values.iter().map(|v| indicator.next(*v)).collect()
}

pub(crate) fn ensure_non_empty(values: &[f64]) -> Result<(), IndicatorError> {
    if values.is_empty() {
        Err(IndicatorError::EmptyInput)
    } else {
        Ok(())
    }
}

pub(crate) fn ensure_period(indicator: &'static str, period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        Err(IndicatorError::InvalidPeriod {
            indicator,
            reason: "period must be > 0".to_string(),
        })
    } else {
        Ok(())
    }
}

pub(crate) fn ensure_same_len(columns: &[&[f64]]) -> Result<usize, IndicatorError> {
    let expected = columns.first().map(|c| c.len()).unwrap_or(0);
    if expected == 0 {
        return Err(IndicatorError::EmptyInput);
    }
    for column in columns {
        if column.len() != expected {
            return Err(IndicatorError::LengthMismatch {
                expected,
                actual: column.len(),
            });
        }
    }
    Ok(expected)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_last_and_first_defined() {
        let s = IndicatorSeries::new(vec![None, None, Some(1.0), Some(2.0)]);
        assert_eq!(s.len(), 4);
        assert_eq!(s.first_defined(), Some(2));
        assert_eq!(s.last(), Some(2.0));
        assert_eq!(s.get(0), None);
        assert_eq!(s.get(10), None);
    }

    #[test]
    fn test_series_last_undefined() {
        let s = IndicatorSeries::new(vec![None, None]);
        assert_eq!(s.last(), None);
        assert_eq!(s.first_defined(), None);
    }

    #[test]
    fn test_same_len_checks() {
        let a: &[f64] = &[1.0, 2.0];
        let b: &[f64] = &[1.0];
        let empty: &[f64] = &[];
        assert_eq!(
            ensure_same_len(&[a, b]),
            Err(IndicatorError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(ensure_same_len(&[empty, empty]), Err(IndicatorError::EmptyInput));
        assert_eq!(ensure_same_len(&[a, a]), Ok(2));
    }
}
