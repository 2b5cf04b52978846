use crate::{ensure_same_len, IndicatorError, IndicatorSeries};

/// Accumulation/Distribution line.
///
/// Running sum of `money flow multiplier * volume`, where the multiplier is
/// `((close - low) - (high - close)) / (high - low)`, taken as 0 on a bar
/// with no range.
#[derive(Debug, Clone, Default)]
pub struct AccumDist {
    total: f64,
    fed: bool,
}

impl AccumDist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn money_flow_multiplier(high: f64, low: f64, close: f64) -> f64 {
        let range = high - low;
        if range == 0.0 {
            0.0
        } else {
            ((close - low) - (high - close)) / range
        }
    }

    pub fn next_hlcv(&mut self, high: f64, low: f64, close: f64, volume: f64) -> f64 {
        self.total += Self::money_flow_multiplier(high, low, close) * volume;
        self.fed = true;
        self.total
    }

    pub fn value(&self) -> Option<f64> {
        self.fed.then_some(self.total)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A/D line over full columns. Defined at every index.
pub fn accumulation_distribution(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    volumes: &[f64],
) -> Result<IndicatorSeries, IndicatorError> {
    ensure_same_len(&[highs, lows, closes, volumes])?;
    let mut state = AccumDist::new();
    Ok(highs
        .iter()
        .zip(lows)
        .zip(closes)
        .zip(volumes)
        .map(|(((h, l), c), v)| Some(state.next_hlcv(*h, *l, *c, *v)))
        .collect())
}
