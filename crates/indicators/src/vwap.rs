use crate::{ensure_same_len, IndicatorError, IndicatorSeries};

/// Volume Weighted Average Price (VWAP).
///
/// Accumulates over everything fed since construction or the last `reset()`;
/// there is no session reset, so the anchor is the first bar of the window.
#[derive(Debug, Clone, Default)]
pub struct Vwap {
    cumulative_tp_vol: f64,
    cumulative_vol: f64,
    current: Option<f64>,
}

impl Vwap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed high, low, close, volume and compute VWAP.
    ///
    /// Undefined while no volume has traded.
    pub fn next_hlcv(&mut self, high: f64, low: f64, close: f64, volume: f64) -> Option<f64> {
        let typical_price = (high + low + close) / 3.0;
        self.cumulative_tp_vol += typical_price * volume;
        self.cumulative_vol += volume;

        if self.cumulative_vol > 0.0 {
            self.current = Some(self.cumulative_tp_vol / self.cumulative_vol);
        }
        self.current
    }

    pub fn value(&self) -> Option<f64> {
        self.current
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// VWAP anchored at the first bar of the supplied columns.
pub fn vwap(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    volumes: &[f64],
) -> Result<IndicatorSeries, IndicatorError> {
    ensure_same_len(&[highs, lows, closes, volumes])?;
    let mut state = Vwap::new();
    Ok(highs
        .iter()
        .zip(lows)
        .zip(closes)
        .zip(volumes)
        .map(|(((h, l), c), v)| state.next_hlcv(*h, *l, *c, *v))
        .collect())
}
