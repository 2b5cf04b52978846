use crate::{ensure_non_empty, ensure_period, run, Indicator, IndicatorError, IndicatorSeries};
use std::collections::VecDeque;

/// Simple Moving Average (SMA).
#[derive(Debug, Clone)]
pub struct Sma {
    len: usize,
    buffer: VecDeque<f64>,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "SMA period must be > 0");
        Self {
            len: period,
            buffer: VecDeque::with_capacity(period + 1),
        }
    }

    /// Get the current SMA value without feeding new data.
    ///
    /// The window is summed afresh rather than kept as a running total so
    /// long inputs do not accumulate cancellation error.
    pub fn value(&self) -> Option<f64> {
        if self.buffer.len() == self.len {
            Some(self.buffer.iter().sum::<f64>() / self.len as f64)
        } else {
            None
        }
    }

    /// The values currently inside the window, oldest first.
    pub fn window(&self) -> &VecDeque<f64> {
        &self.buffer
    }
}

impl Indicator for Sma {
    fn next(&mut self, value: f64) -> Option<f64> {
        self.buffer.push_back(value);
        if self.buffer.len() > self.len {
            self.buffer.pop_front();
        }
        self.value()
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn period(&self) -> usize {
        self.len
    }

    fn is_ready(&self) -> bool {
        self.buffer.len() == self.len
    }
}

/// SMA over a full column. Defined from index `period - 1` onward.
pub fn sma(values: &[f64], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    ensure_non_empty(values)?;
    ensure_period("SMA", period)?;
    Ok(run(&mut Sma::new(period), values))
}
