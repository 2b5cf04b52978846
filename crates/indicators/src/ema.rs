use crate::{ensure_non_empty, ensure_period, run, Indicator, IndicatorError, IndicatorSeries};

/// Exponential Moving Average (EMA).
///
/// Seeded with the SMA of the first `period` values, then
/// `ema = alpha * value + (1 - alpha) * prev` with `alpha = 2 / (period + 1)`.
#[derive(Debug, Clone)]
pub struct Ema {
    len: usize,
    multiplier: f64,
    current: Option<f64>,
    count: usize,
    /// Accumulates values for the initial SMA seed.
    seed_sum: f64,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "EMA period must be > 0");
        Self {
            len: period,
            multiplier: 2.0 / (period as f64 + 1.0),
            current: None,
            count: 0,
            seed_sum: 0.0,
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.current
    }
}

impl Indicator for Ema {
    fn next(&mut self, value: f64) -> Option<f64> {
        self.count += 1;

        match self.current {
            None => {
                // Accumulate for SMA seed
                self.seed_sum += value;
                if self.count >= self.len {
                    self.current = Some(self.seed_sum / self.len as f64);
                }
            }
            Some(prev) => {
                self.current = Some((value - prev) * self.multiplier + prev);
            }
        }

        self.current
    }

    fn reset(&mut self) {
        self.current = None;
        self.count = 0;
        self.seed_sum = 0.0;
    }

    fn period(&self) -> usize {
        self.len
    }

    fn is_ready(&self) -> bool {
        self.current.is_some()
    }
}

/// EMA over a full column. Defined from index `period - 1` onward.
pub fn ema(values: &[f64], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    ensure_non_empty(values)?;
    ensure_period("EMA", period)?;
    Ok(run(&mut Ema::new(period), values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::assert_close;

    #[test]
    fn test_ema_seed() {
        let mut ema = Ema::new(3);
        assert_eq!(ema.next(2.0), None);
        assert_eq!(ema.next(4.0), None);
        // Third value → SMA seed = (2+4+6)/3 = 4
        assert_eq!(ema.next(6.0), Some(4.0));
    }

    #[test]
    fn test_ema_after_seed() {
        let mut ema = Ema::new(3);
        ema.next(2.0);
        ema.next(4.0);
        ema.next(6.0); // seed = 4
        // EMA = (8 - 4) * 0.5 + 4 = 6
        assert_eq!(ema.next(8.0), Some(6.0));
    }

    #[test]
    fn test_ema_series_matches_recurrence() {
        let closes = [10.0, 11.0, 12.5, 11.5, 13.0, 14.0, 13.5];
        let out = ema(&closes, 3).unwrap();
        assert_eq!(out.first_defined(), Some(2));

        let alpha = 0.5;
        let mut expected = (10.0 + 11.0 + 12.5) / 3.0;
        for close in &closes[3..] {
            expected = alpha * close + (1.0 - alpha) * expected;
        }
        assert_close(out.last().unwrap(), expected);
    }

    #[test]
    fn test_ema_follows_monotonic_input() {
        let rising: Vec<f64> = (1..=40).map(f64::from).collect();
        let out = ema(&rising, 10).unwrap();
        let defined: Vec<f64> = out.iter().flatten().collect();
        assert!(defined.windows(2).all(|w| w[1] > w[0]));

        let falling: Vec<f64> = rising.iter().rev().copied().collect();
        let out = ema(&falling, 10).unwrap();
        let defined: Vec<f64> = out.iter().flatten().collect();
        assert!(defined.windows(2).all(|w| w[1] < w[0]));
    }
}
