use crate::envelope::{AnalysisError, ComputationError};
use crate::rounding::{round_opt, PRICE_DP, RATIO_DP};
use quantlens_core::{DataProvider, Series};
use quantlens_indicators::{self as ind, volatility::TRADING_DAYS_PER_YEAR};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

pub const DEFAULT_PERIOD: &str = "1y";

const ATR_PERIOD: usize = 14;
const BOLLINGER_PERIOD: usize = 20;
const BOLLINGER_STD_DEV: f64 = 2.0;
const HV_WINDOW: usize = 30;

/// Range and dispersion readings for the latest bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilityMetrics {
    #[serde(rename = "ATR_14")]
    pub atr_14: Option<Decimal>,
    /// (Upper - Lower) / Middle of the 20-bar bands.
    #[serde(rename = "Bollinger_Width")]
    pub bollinger_width: Option<Decimal>,
    /// Annualised standard deviation of the last 30 daily log returns.
    #[serde(rename = "30D_Volatility")]
    pub volatility_30d: Option<Decimal>,
}

pub fn compute(series: &Series) -> Result<VolatilityMetrics, ComputationError> {
    series.validate()?;
    let highs = series.highs();
    let lows = series.lows();
    let closes = series.closes();

    let atr = ind::atr(&highs, &lows, &closes, ATR_PERIOD)?.last();
    let width = ind::bollinger_bands(&closes, BOLLINGER_PERIOD, BOLLINGER_STD_DEV)?
        .width()
        .last();
    let hv = ind::historical_volatility(&closes, HV_WINDOW, TRADING_DAYS_PER_YEAR)?.last();

    Ok(VolatilityMetrics {
        atr_14: round_opt("ATR_14", atr, PRICE_DP)?,
        bollinger_width: round_opt("Bollinger_Width", width, RATIO_DP)?,
        volatility_30d: round_opt("30D_Volatility", hv, RATIO_DP)?,
    })
}

/// Fetch `symbol` over `period` (default `1y`) and measure its volatility.
pub async fn volatility_metrics(
    provider: &dyn DataProvider,
    symbol: &str,
    period: Option<&str>,
) -> Result<VolatilityMetrics, AnalysisError> {
    let series = crate::fetch_series(provider, symbol, period, DEFAULT_PERIOD).await?;
    let metrics = compute(&series)?;
    info!(symbol, bars = series.len(), "Computed volatility metrics");
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{constant_bars, trending_bars};
    use quantlens_data::MemoryDataProvider;
    use rust_decimal_macros::dec;

    #[test]
    fn test_constant_series_is_still() {
        let series = Series::new("FLAT", constant_bars(250, 100.0, 1000.0)).unwrap();
        let out = compute(&series).unwrap();
        assert_eq!(out.atr_14, Some(dec!(0)));
        assert_eq!(out.bollinger_width, Some(dec!(0)));
        assert_eq!(out.volatility_30d, Some(dec!(0)));
    }

    #[test]
    fn test_thirty_bars_leave_volatility_undefined() {
        let series = Series::new("NEW", trending_bars(30, 20.0, 0.1)).unwrap();
        let out = compute(&series).unwrap();
        assert!(out.atr_14.is_some());
        assert!(out.bollinger_width.is_some());
        assert_eq!(out.volatility_30d, None);

        let series = Series::new("NEW", trending_bars(31, 20.0, 0.1)).unwrap();
        assert!(compute(&series).unwrap().volatility_30d.is_some());
    }

    #[test]
    fn test_zero_close_fails_whole_snapshot() {
        let series = Series::new("ZERO", constant_bars(40, 0.0, 10.0)).unwrap();
        let err = compute(&series).unwrap_err();
        assert!(matches!(err, ComputationError::Indicator(_)));
        assert_eq!(err.to_string(), "non-positive price 0 at index 0");
    }

    #[tokio::test]
    async fn test_provider_error_is_reported() {
        let provider = MemoryDataProvider::new().with_failure("ERR", "HTTP 429: rate limited");
        let err = volatility_metrics(&provider, "ERR", Some("6mo")).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 429: rate limited");
    }

    #[tokio::test]
    async fn test_bad_period_is_data_error() {
        let provider = MemoryDataProvider::new().with_bars("FLAT", constant_bars(10, 1.0, 1.0));
        let err = volatility_metrics(&provider, "FLAT", Some("ten days")).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Data(_)));
        assert_eq!(provider.fetch_count(), 0);
    }
}
