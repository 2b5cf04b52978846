use crate::{ensure_period, ensure_same_len, IndicatorError, IndicatorSeries};

/// Average True Range (ATR).
///
/// Requires high, low, close data, fed via `next_hlc()`. The first bar has no
/// previous close, so its true range is `high - low`. The first ATR value is
/// the mean of the first `period` true ranges; after that Wilder's smoothing
/// applies.
#[derive(Debug, Clone)]
pub struct Atr {
    len: usize,
    prev_close: Option<f64>,
    tr_sum: f64,
    current_atr: Option<f64>,
    count: usize,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "ATR period must be > 0");
        Self {
            len: period,
            prev_close: None,
            tr_sum: 0.0,
            current_atr: None,
            count: 0,
        }
    }

    /// True range of a bar given the previous close, if there is one.
    pub fn true_range(high: f64, low: f64, prev_close: Option<f64>) -> f64 {
        let hl = high - low;
        match prev_close {
            Some(prev_c) => hl.max((high - prev_c).abs()).max((low - prev_c).abs()),
            None => hl,
        }
    }

    /// Feed high, low, close and compute ATR.
    pub fn next_hlc(&mut self, high: f64, low: f64, close: f64) -> Option<f64> {
        let tr = Self::true_range(high, low, self.prev_close);
        self.prev_close = Some(close);
        self.count += 1;

        match self.current_atr {
            None => {
                self.tr_sum += tr;
                if self.count >= self.len {
                    self.current_atr = Some(self.tr_sum / self.len as f64);
                }
            }
            Some(prev_atr) => {
                // Wilder's smoothing
                let n = self.len as f64;
                self.current_atr = Some((prev_atr * (n - 1.0) + tr) / n);
            }
        }

        self.current_atr
    }

    pub fn value(&self) -> Option<f64> {
        self.current_atr
    }

    pub fn period(&self) -> usize {
        self.len
    }

    pub fn reset(&mut self) {
        self.prev_close = None;
        self.tr_sum = 0.0;
        self.current_atr = None;
        self.count = 0;
    }
}

/// ATR over full high/low/close columns. Defined from index `period - 1` onward.
pub fn atr(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> Result<IndicatorSeries, IndicatorError> {
    ensure_same_len(&[highs, lows, closes])?;
    ensure_period("ATR", period)?;

    let mut state = Atr::new(period);
    Ok(highs
        .iter()
        .zip(lows)
        .zip(closes)
        .map(|((h, l), c)| state.next_hlc(*h, *l, *c))
        .collect())
}
