use crate::ema::Ema;
use crate::{ensure_non_empty, Indicator, IndicatorError, IndicatorSeries};

/// MACD (Moving Average Convergence Divergence).
///
/// Composed of three EMAs:
/// - Fast EMA (default 12)
/// - Slow EMA (default 26)
/// - Signal EMA (default 9), fed with the MACD line
///
/// All three components are reported together once the signal EMA has
/// seeded, i.e. from index `slow + signal - 2`.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_ema: Ema,
    slow_ema: Ema,
    signal_ema: Ema,
    macd_line: Option<f64>,
    signal_line: Option<f64>,
}

/// MACD output with all three components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdOutput {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Batch MACD, one aligned series per component.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        assert!(fast_period < slow_period, "Fast period must be less than slow period");
        Self {
            fast_ema: Ema::new(fast_period),
            slow_ema: Ema::new(slow_period),
            signal_ema: Ema::new(signal_period),
            macd_line: None,
            signal_line: None,
        }
    }

    /// Standard MACD (12, 26, 9).
    pub fn default_periods() -> Self {
        Self::new(12, 26, 9)
    }

    /// Returns the full MACD output (macd, signal, histogram) if ready.
    pub fn output(&self) -> Option<MacdOutput> {
        match (self.macd_line, self.signal_line) {
            (Some(macd), Some(signal)) => Some(MacdOutput {
                macd,
                signal,
                histogram: macd - signal,
            }),
            _ => None,
        }
    }

    /// Process next value and return full output if ready.
    pub fn next_output(&mut self, value: f64) -> Option<MacdOutput> {
        let fast = self.fast_ema.next(value);
        let slow = self.slow_ema.next(value);

        if let (Some(f), Some(s)) = (fast, slow) {
            let macd = f - s;
            self.macd_line = Some(macd);
            self.signal_line = self.signal_ema.next(macd);
        }

        self.output()
    }
}

impl Indicator for Macd {
    fn next(&mut self, value: f64) -> Option<f64> {
        self.next_output(value).map(|o| o.macd)
    }

    fn reset(&mut self) {
        self.fast_ema.reset();
        self.slow_ema.reset();
        self.signal_ema.reset();
        self.macd_line = None;
        self.signal_line = None;
    }

    fn period(&self) -> usize {
        self.slow_ema.period() + self.signal_ema.period() - 1
    }

    fn is_ready(&self) -> bool {
        self.signal_line.is_some()
    }
}

/// MACD over a full column.
pub fn macd(
    values: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Result<MacdSeries, IndicatorError> {
    ensure_non_empty(values)?;
    if fast_period == 0 || signal_period == 0 || fast_period >= slow_period {
        return Err(IndicatorError::InvalidPeriod {
            indicator: "MACD",
            reason: format!(
                "need 0 < fast < slow and signal > 0 (got {fast_period}/{slow_period}/{signal_period})"
            ),
        });
    }

    let mut state = Macd::new(fast_period, slow_period, signal_period);
    let outputs: Vec<Option<MacdOutput>> = values.iter().map(|v| state.next_output(*v)).collect();

    Ok(MacdSeries {
        macd: outputs.iter().map(|o| o.map(|o| o.macd)).collect(),
        signal: outputs.iter().map(|o| o.map(|o| o.signal)).collect(),
        histogram: outputs.iter().map(|o| o.map(|o| o.histogram)).collect(),
    })
}
