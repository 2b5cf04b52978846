use crate::{ensure_non_empty, ensure_period, run, Indicator, IndicatorError, IndicatorSeries};

/// Relative Strength Index (RSI).
/// Uses Wilder's smoothing for average gain/loss.
///
/// An average loss of zero yields 100, flat windows included.
#[derive(Debug, Clone)]
pub struct Rsi {
    len: usize,
    prev_value: Option<f64>,
    gain_sum: f64,
    loss_sum: f64,
    avg_gain: Option<f64>,
    avg_loss: Option<f64>,
    count: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "RSI period must be > 0");
        Self {
            len: period,
            prev_value: None,
            gain_sum: 0.0,
            loss_sum: 0.0,
            avg_gain: None,
            avg_loss: None,
            count: 0,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match (self.avg_gain, self.avg_loss) {
            (Some(ag), Some(al)) => {
                if al == 0.0 {
                    Some(100.0)
                } else {
                    let rs = ag / al;
                    Some(100.0 - 100.0 / (1.0 + rs))
                }
            }
            _ => None,
        }
    }
}

impl Indicator for Rsi {
    fn next(&mut self, value: f64) -> Option<f64> {
        if let Some(prev) = self.prev_value {
            let change = value - prev;
            let gain = change.max(0.0);
            let loss = (-change).max(0.0);

            self.count += 1;

            match (self.avg_gain, self.avg_loss) {
                (Some(prev_ag), Some(prev_al)) => {
                    // Wilder's smoothing
                    let n = self.len as f64;
                    self.avg_gain = Some((prev_ag * (n - 1.0) + gain) / n);
                    self.avg_loss = Some((prev_al * (n - 1.0) + loss) / n);
                }
                _ => {
                    // Accumulate initial period
                    self.gain_sum += gain;
                    self.loss_sum += loss;
                    if self.count >= self.len {
                        let n = self.len as f64;
                        self.avg_gain = Some(self.gain_sum / n);
                        self.avg_loss = Some(self.loss_sum / n);
                    }
                }
            }
        }

        self.prev_value = Some(value);
        self.value()
    }

    fn reset(&mut self) {
        self.prev_value = None;
        self.gain_sum = 0.0;
        self.loss_sum = 0.0;
        self.avg_gain = None;
        self.avg_loss = None;
        self.count = 0;
    }

    fn period(&self) -> usize {
        self.len + 1 // need one extra data point for the first change
    }

    fn is_ready(&self) -> bool {
        self.avg_gain.is_some()
    }
}

/// RSI over a full column. Undefined for the first `period` bars.
pub fn rsi(values: &[f64], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    ensure_non_empty(values)?;
    ensure_period("RSI", period)?;
    Ok(run(&mut Rsi::new(period), values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::assert_close;

    const WILDER: [f64; 15] = [
        44.0, 44.34, 44.09, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
        45.61, 46.28, 46.28,
    ];

    #[test]
    fn test_rsi_basic() {
        let mut rsi = Rsi::new(14);
        let mut result = None;
        for v in &WILDER {
            result = rsi.next(*v);
        }
        let rsi_val = result.unwrap();
        assert!(rsi_val > 0.0 && rsi_val < 100.0);
    }

    #[test]
    fn test_rsi_seed_matches_hand_computation() {
        let out = rsi(&WILDER, 14).unwrap();
        assert_eq!(out.first_defined(), Some(14));

        let (mut gains, mut losses) = (0.0, 0.0);
        for w in WILDER.windows(2) {
            let change = w[1] - w[0];
            if change > 0.0 {
                gains += change;
            } else {
                losses -= change;
            }
        }
        let rs = (gains / 14.0) / (losses / 14.0);
        assert_close(out.last().unwrap(), 100.0 - 100.0 / (1.0 + rs));
    }

    #[test]
    fn test_rsi_no_losses_is_100() {
        let rising = [1.0, 2.0, 2.0, 3.0, 5.0, 5.0, 6.0];
        let out = rsi(&rising, 3).unwrap();
        assert!(out.iter().flatten().all(|v| v == 100.0));
    }

    #[test]
    fn test_rsi_flat_is_100() {
        let out = rsi(&[7.0; 20], 14).unwrap();
        assert_eq!(out.last(), Some(100.0));
    }

    #[test]
    fn test_rsi_bounded() {
        let closes: Vec<f64> = (0..200)
            .map(|i| 50.0 + (i as f64 * 0.37).sin() * 10.0 + (i as f64 * 1.3).cos() * 3.0)
            .collect();
        let out = rsi(&closes, 14).unwrap();
        assert!(out.iter().flatten().all(|v| (0.0..=100.0).contains(&v)));

        let falling: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        let out = rsi(&falling, 14).unwrap();
        assert_eq!(out.last(), Some(0.0));
    }
}
