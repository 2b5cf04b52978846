use crate::{ensure_same_len, IndicatorError, IndicatorSeries};

/// On-Balance Volume (OBV).
///
/// Starts at zero on the first bar; each later bar adds its volume on an up
/// close, subtracts it on a down close and leaves the total alone otherwise.
#[derive(Debug, Clone, Default)]
pub struct Obv {
    prev_close: Option<f64>,
    total: f64,
}

impl Obv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed close and volume; always defined.
    pub fn next_cv(&mut self, close: f64, volume: f64) -> f64 {
        if let Some(prev) = self.prev_close {
            if close > prev {
                self.total += volume;
            } else if close < prev {
                self.total -= volume;
            }
        }
        self.prev_close = Some(close);
        self.total
    }

    pub fn value(&self) -> Option<f64> {
        self.prev_close.map(|_| self.total)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// OBV over full close/volume columns. Defined at every index.
pub fn obv(closes: &[f64], volumes: &[f64]) -> Result<IndicatorSeries, IndicatorError> {
    ensure_same_len(&[closes, volumes])?;
    let mut state = Obv::new();
    Ok(closes
        .iter()
        .zip(volumes)
        .map(|(c, v)| Some(state.next_cv(*c, *v)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obv_direction() {
        let closes = [10.0, 11.0, 10.5, 10.5, 12.0];
        let volumes = [100.0, 200.0, 50.0, 70.0, 30.0];
        let out = obv(&closes, &volumes).unwrap();
        let values: Vec<f64> = out.iter().flatten().collect();
        assert_eq!(values, vec![0.0, 200.0, 150.0, 150.0, 180.0]);
    }

    #[test]
    fn test_obv_non_decreasing_with_rising_closes() {
        let closes: Vec<f64> = (0..50).map(|i| 10.0 + (i / 3) as f64).collect();
        let volumes: Vec<f64> = (0..50).map(|i| 1000.0 + i as f64 * 10.0).collect();
        let out = obv(&closes, &volumes).unwrap();
        let values: Vec<f64> = out.iter().flatten().collect();
        assert_eq!(values.len(), 50);
        assert!(values.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_obv_flat_is_zero() {
        let out = obv(&[5.0; 10], &[1000.0; 10]).unwrap();
        assert_eq!(out.last(), Some(0.0));
    }
}
