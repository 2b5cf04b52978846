use crate::{ensure_non_empty, ensure_period, run, Indicator, IndicatorError, IndicatorSeries};
use std::collections::VecDeque;

/// Trading days per year used to annualise daily volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annualised historical volatility.
///
/// Population standard deviation of the last `window` log returns
/// `ln(close[i] / close[i-1])`, scaled by `sqrt(annualization)`.
/// Callers must feed strictly positive closes.
#[derive(Debug, Clone)]
pub struct HistoricalVolatility {
    window: usize,
    scale: f64,
    prev_close: Option<f64>,
    returns: VecDeque<f64>,
}

impl HistoricalVolatility {
    pub fn new(window: usize, annualization: f64) -> Self {
        assert!(window > 0, "volatility window must be > 0");
        Self {
            window,
            scale: annualization.sqrt(),
            prev_close: None,
            returns: VecDeque::with_capacity(window + 1),
        }
    }

    /// 30-bar window annualised over 252 trading days.
    pub fn default_periods() -> Self {
        Self::new(30, TRADING_DAYS_PER_YEAR)
    }

    pub fn value(&self) -> Option<f64> {
        if self.returns.len() < self.window {
            return None;
        }
        let n = self.returns.len() as f64;
        let mean = self.returns.iter().sum::<f64>() / n;
        let variance = self
            .returns
            .iter()
            .map(|r| {
                let diff = r - mean;
                diff * diff
            })
            .sum::<f64>()
            / n;
        Some(variance.sqrt() * self.scale)
    }
}

impl Indicator for HistoricalVolatility {
    fn next(&mut self, close: f64) -> Option<f64> {
        if let Some(prev) = self.prev_close {
            self.returns.push_back((close / prev).ln());
            if self.returns.len() > self.window {
                self.returns.pop_front();
            }
        }
        self.prev_close = Some(close);
        self.value()
    }

    fn reset(&mut self) {
        self.prev_close = None;
        self.returns.clear();
    }

    fn period(&self) -> usize {
        self.window + 1
    }

    fn is_ready(&self) -> bool {
        self.returns.len() == self.window
    }
}

fn ensure_positive(closes: &[f64]) -> Result<(), IndicatorError> {
    match closes.iter().position(|c| !(*c > 0.0)) {
        Some(index) => Err(IndicatorError::NonPositivePrice {
            index,
            value: closes[index],
        }),
        None => Ok(()),
    }
}

/// Log returns between consecutive closes; one shorter than the input.
pub fn log_returns(closes: &[f64]) -> Result<Vec<f64>, IndicatorError> {
    ensure_non_empty(closes)?;
    ensure_positive(closes)?;
    Ok(closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect())
}

/// Historical volatility over a full close column. Defined from index `window` onward.
pub fn historical_volatility(
    closes: &[f64],
    window: usize,
    annualization: f64,
) -> Result<IndicatorSeries, IndicatorError> {
    ensure_non_empty(closes)?;
    ensure_period("historical volatility", window)?;
    ensure_positive(closes)?;
    Ok(run(&mut HistoricalVolatility::new(window, annualization), closes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::assert_close;

    #[test]
    fn test_constant_prices_have_zero_volatility() {
        let out = historical_volatility(&[100.0; 40], 30, TRADING_DAYS_PER_YEAR).unwrap();
        assert_eq!(out.first_defined(), Some(30));
        assert_eq!(out.last(), Some(0.0));
    }

    #[test]
    fn test_matches_population_std_of_last_window() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 50.0 * (1.0 + 0.01 * (i as f64 * 0.9).sin()))
            .collect();
        let out = historical_volatility(&closes, 30, 252.0).unwrap();

        let returns = log_returns(&closes).unwrap();
        let tail = &returns[returns.len() - 30..];
        let mean = tail.iter().sum::<f64>() / 30.0;
        let var = tail.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 30.0;
        assert_close(out.last().unwrap(), var.sqrt() * 252f64.sqrt());
    }

    #[test]
    fn test_alternating_returns() {
        // Returns alternate between +ln(1.1) and -ln(1.1): std = ln(1.1).
        let closes: Vec<f64> = (0..11).map(|i| if i % 2 == 0 { 100.0 } else { 110.0 }).collect();
        let out = historical_volatility(&closes, 10, 1.0).unwrap();
        assert_close(out.last().unwrap(), 1.1f64.ln());
    }

    #[test]
    fn test_rejects_non_positive_close() {
        assert_eq!(
            historical_volatility(&[10.0, 0.0, 11.0], 1, 252.0),
            Err(IndicatorError::NonPositivePrice {
                index: 1,
                value: 0.0
            })
        );
        assert!(log_returns(&[10.0, -1.0]).is_err());
    }

    #[test]
    fn test_short_series_is_undefined() {
        let out = historical_volatility(&[10.0, 11.0, 12.0], 30, 252.0).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out.first_defined(), None);
    }
}
