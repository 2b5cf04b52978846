use crate::sma::Sma;
use crate::{ensure_non_empty, ensure_period, Indicator, IndicatorError, IndicatorSeries};

/// Bollinger Bands.
///
/// Middle band is the SMA of the window; the bands sit `num_std` population
/// standard deviations of the same window above and below it.
/// Returns the middle band from `next()`. Use `output()` for the bands.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    num_std: f64,
    sma: Sma,
    current: Option<BollingerOutput>,
}

/// Bollinger Bands output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerOutput {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerOutput {
    /// Band width normalised by the middle band, `(upper - lower) / middle`.
    ///
    /// `None` when the middle band is zero.
    pub fn width(&self) -> Option<f64> {
        if self.middle == 0.0 {
            None
        } else {
            Some((self.upper - self.lower) / self.middle)
        }
    }
}

/// Batch Bollinger Bands, one aligned series per band.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub upper: IndicatorSeries,
    pub middle: IndicatorSeries,
    pub lower: IndicatorSeries,
}

impl BollingerSeries {
    /// `(upper - lower) / middle` at every defined index.
    pub fn width(&self) -> IndicatorSeries {
        self.upper
            .iter()
            .zip(self.middle.iter())
            .zip(self.lower.iter())
            .map(|((u, m), l)| match (u, m, l) {
                (Some(upper), Some(middle), Some(lower)) => BollingerOutput {
                    upper,
                    middle,
                    lower,
                }
                .width(),
                _ => None,
            })
            .collect()
    }
}

impl BollingerBands {
    pub fn new(period: usize, num_std_dev: f64) -> Self {
        assert!(num_std_dev >= 0.0, "Bollinger multiplier must be >= 0");
        Self {
            num_std: num_std_dev,
            sma: Sma::new(period),
            current: None,
        }
    }

    /// Standard Bollinger Bands (20, 2).
    pub fn default_periods() -> Self {
        Self::new(20, 2.0)
    }

    /// Population standard deviation of the SMA window around `mean`.
    fn std_dev(&self, mean: f64) -> f64 {
        let window = self.sma.window();
        let variance = window
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / window.len() as f64;
        variance.sqrt()
    }

    pub fn output(&self) -> Option<BollingerOutput> {
        self.current
    }

    pub fn next_output(&mut self, value: f64) -> Option<BollingerOutput> {
        if let Some(mid) = self.sma.next(value) {
            let sd = self.std_dev(mid);
            self.current = Some(BollingerOutput {
                upper: mid + self.num_std * sd,
                middle: mid,
                lower: mid - self.num_std * sd,
            });
        }
        self.current
    }
}

impl Indicator for BollingerBands {
    fn next(&mut self, value: f64) -> Option<f64> {
        self.next_output(value).map(|o| o.middle)
    }

    fn reset(&mut self) {
        self.sma.reset();
        self.current = None;
    }

    fn period(&self) -> usize {
        self.sma.period()
    }

    fn is_ready(&self) -> bool {
        self.current.is_some()
    }
}

/// Bollinger Bands over a full column. Defined from index `period - 1` onward.
pub fn bollinger_bands(
    values: &[f64],
    period: usize,
    num_std_dev: f64,
) -> Result<BollingerSeries, IndicatorError> {
    ensure_non_empty(values)?;
    ensure_period("Bollinger", period)?;
    if !(num_std_dev >= 0.0) {
        return Err(IndicatorError::InvalidPeriod {
            indicator: "Bollinger",
            reason: format!("multiplier must be >= 0 (got {num_std_dev})"),
        });
    }

    let mut bands = BollingerBands::new(period, num_std_dev);
    let outputs: Vec<Option<BollingerOutput>> =
        values.iter().map(|v| bands.next_output(*v)).collect();

    Ok(BollingerSeries {
        upper: outputs.iter().map(|o| o.map(|o| o.upper)).collect(),
        middle: outputs.iter().map(|o| o.map(|o| o.middle)).collect(),
        lower: outputs.iter().map(|o| o.map(|o| o.lower)).collect(),
    })
}
