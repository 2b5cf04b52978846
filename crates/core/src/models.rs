use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::traits::DataError;

// ---------------------------------------------------------------------------
// Market Data
// ---------------------------------------------------------------------------

/// A single OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A bar that breaks the OHLCV invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid bar at index {index}: {reason}")]
pub struct BarViolation {
    pub index: usize,
    pub reason: String,
}

impl Bar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Typical price, (high + low + close) / 3.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Check the price/volume invariants of a single bar.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(format!("{} is not finite ({})", name, value));
        }
        if self.volume < 0.0 {
            return Err(format!("negative volume ({})", self.volume));
        }
        if self.high < self.low {
            return Err(format!("high {} below low {}", self.high, self.low));
        }
        if self.high < self.open.max(self.close) {
            return Err(format!(
                "high {} below open/close ({}/{})",
                self.high, self.open, self.close
            ));
        }
        if self.low > self.open.min(self.close) {
            return Err(format!(
                "low {} above open/close ({}/{})",
                self.low, self.open, self.close
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// An immutable, non-empty run of bars for one symbol, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    symbol: String,
    bars: Vec<Bar>,
}

impl Series {
    /// Build a series, ordering bars by timestamp.
    ///
    /// An empty set of bars is reported as [`DataError::NoData`], so a
    /// `Series` value always holds at least one bar.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Result<Self, DataError> {
        if bars.is_empty() {
            return Err(DataError::NoData);
        }
        bars.sort_by_key(|b| b.timestamp);
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The newest bar.
    pub fn latest(&self) -> &Bar {
        // `new` rejects empty input.
        &self.bars[self.bars.len() - 1]
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Check every bar against the OHLCV invariants, reporting the first violation.
    pub fn validate(&self) -> Result<(), BarViolation> {
        for (index, bar) in self.bars.iter().enumerate() {
            bar.validate()
                .map_err(|reason| BarViolation { index, reason })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(day: u32, close: f64) -> Bar {
        let ts = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
        Bar::new(ts, close, close + 1.0, close - 1.0, close, 1000.0)
    }

    #[test]
    fn test_empty_series_is_no_data() {
        let err = Series::new("AAPL", Vec::new()).unwrap_err();
        assert!(matches!(err, DataError::NoData));
        assert_eq!(err.to_string(), "No data found");
    }

    #[test]
    fn test_series_sorted_oldest_first() {
        let series = Series::new("AAPL", vec![bar(3, 12.0), bar(1, 10.0), bar(2, 11.0)]).unwrap();
        assert_eq!(series.closes(), vec![10.0, 11.0, 12.0]);
        assert_eq!(series.latest().close, 12.0);
        assert_eq!(series.symbol(), "AAPL");
    }

    #[test]
    fn test_validate_reports_index() {
        let mut bad = bar(2, 11.0);
        bad.high = 5.0;
        let series = Series::new("X", vec![bar(1, 10.0), bad]).unwrap();
        let violation = series.validate().unwrap_err();
        assert_eq!(violation.index, 1);
    }

    #[test]
    fn test_validate_rejects_negative_volume_and_nan() {
        let mut b = bar(1, 10.0);
        b.volume = -1.0;
        assert!(b.validate().is_err());

        let mut b = bar(1, 10.0);
        b.close = f64::NAN;
        assert!(b.validate().unwrap_err().contains("close"));
    }

    #[test]
    fn test_typical_price() {
        let b = bar(1, 10.0);
        assert!((b.typical_price() - 10.0).abs() < 1e-12);
    }
}
