//! Volume analysis: participation, flow and short-term volume momentum.

use crate::envelope::{AnalysisError, ComputationError};
use crate::rounding::{round, round_opt, whole, PRICE_DP};
use quantlens_core::{DataProvider, Series};
use quantlens_indicators::{self as ind, VolumeTrend};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

pub const DEFAULT_PERIOD: &str = "3mo";

const VOLUME_SMA_PERIOD: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeMetrics {
    pub latest: u64,
    /// Mean volume over the whole retrieved window.
    #[serde(rename = "20d_avg")]
    pub average: u64,
    pub obv: Decimal,
    pub vwap: Option<Decimal>,
    pub sma_20: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumePatterns {
    pub spike: bool,
    pub trend: Option<VolumeTrend>,
    pub recent_ratio: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeOscillators {
    /// Percent change against the bar four positions before the latest.
    pub volume_roc: Option<Decimal>,
    /// Accumulation/Distribution line.
    pub volume_ad: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeAnalysis {
    pub volume_metrics: VolumeMetrics,
    pub volume_patterns: VolumePatterns,
    pub volume_oscillators: VolumeOscillators,
}

pub fn compute(series: &Series) -> Result<VolumeAnalysis, ComputationError> {
    series.validate()?;
    let highs = series.highs();
    let lows = series.lows();
    let closes = series.closes();
    let volumes = series.volumes();

    let stats = ind::volume_stats(&volumes)?;
    let obv = ind::obv(&closes, &volumes)?.last().unwrap_or_default();
    let ad = ind::accumulation_distribution(&highs, &lows, &closes, &volumes)?
        .last()
        .unwrap_or_default();
    let vwap = ind::vwap(&highs, &lows, &closes, &volumes)?.last();
    let sma_20 = ind::sma(&volumes, VOLUME_SMA_PERIOD)?
        .last()
        .map(|v| whole("sma_20", v))
        .transpose()?;

    Ok(VolumeAnalysis {
        volume_metrics: VolumeMetrics {
            latest: whole("latest", stats.latest)?,
            average: whole("20d_avg", stats.average)?,
            obv: round("obv", obv, PRICE_DP)?,
            vwap: round_opt("vwap", vwap, PRICE_DP)?,
            sma_20,
        },
        volume_patterns: VolumePatterns {
            spike: stats.spike,
            trend: stats.trend,
            recent_ratio: round_opt("recent_ratio", stats.recent_ratio, PRICE_DP)?,
        },
        volume_oscillators: VolumeOscillators {
            volume_roc: round_opt("volume_roc", stats.rate_of_change, PRICE_DP)?,
            volume_ad: round("volume_ad", ad, PRICE_DP)?,
        },
    })
}

/// Fetch `symbol` over `period` (default `3mo`) and analyse its volume.
pub async fn volume_analysis(
    provider: &dyn DataProvider,
    symbol: &str,
    period: Option<&str>,
) -> Result<VolumeAnalysis, AnalysisError> {
    let series = crate::fetch_series(provider, symbol, period, DEFAULT_PERIOD).await?;
    let analysis = compute(&series)?;
    info!(
        symbol,
        bars = series.len(),
        spike = analysis.volume_patterns.spike,
        "Computed volume analysis"
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bars_with_volumes, constant_bars};
    use quantlens_data::MemoryDataProvider;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_constant_series() {
        let series = Series::new("FLAT", constant_bars(63, 100.0, 1000.0)).unwrap();
        let out = compute(&series).unwrap();
        assert_eq!(out.volume_metrics.latest, 1000);
        assert_eq!(out.volume_metrics.average, 1000);
        assert_eq!(out.volume_metrics.obv, dec!(0));
        assert_eq!(out.volume_metrics.vwap, Some(dec!(100)));
        assert_eq!(out.volume_metrics.sma_20, Some(1000));
        assert!(!out.volume_patterns.spike);
        assert_eq!(out.volume_patterns.trend, Some(VolumeTrend::Down));
        assert_eq!(out.volume_patterns.recent_ratio, Some(dec!(1)));
        assert_eq!(out.volume_oscillators.volume_roc, Some(dec!(0)));
        assert_eq!(out.volume_oscillators.volume_ad, dec!(0));
    }

    #[test]
    fn test_five_bars_compare_last_with_first() {
        let volumes = [100.0, 900.0, 900.0, 900.0, 150.0];
        let series = Series::new("FIVE", bars_with_volumes(&volumes)).unwrap();
        let out = compute(&series).unwrap();
        assert_eq!(out.volume_patterns.trend, Some(VolumeTrend::Up));
        assert_eq!(out.volume_oscillators.volume_roc, Some(dec!(50)));
        assert_eq!(out.volume_metrics.average, 590);
        assert_eq!(out.volume_metrics.sma_20, None);
    }

    #[test]
    fn test_short_window_leaves_lookback_undefined() {
        let series = Series::new("FOUR", bars_with_volumes(&[100.0, 200.0, 300.0, 400.0])).unwrap();
        let out = compute(&series).unwrap();
        assert_eq!(out.volume_patterns.trend, None);
        assert_eq!(out.volume_oscillators.volume_roc, None);

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["volume_patterns"]["trend"], json!(null));
        assert_eq!(json["volume_metrics"]["latest"], json!(400));
        assert_eq!(json["volume_metrics"]["20d_avg"], json!(250));
    }

    #[test]
    fn test_spike_and_zero_volume() {
        let mut volumes = vec![100.0; 9];
        volumes.push(1000.0);
        let series = Series::new("SPIKE", bars_with_volumes(&volumes)).unwrap();
        let out = compute(&series).unwrap();
        assert!(out.volume_patterns.spike);
        assert_eq!(out.volume_patterns.trend, Some(VolumeTrend::Up));
        // 1000 against a mean of 190.
        assert_eq!(out.volume_patterns.recent_ratio, Some(dec!(5.26)));

        let series = Series::new("DEAD", bars_with_volumes(&[0.0; 6])).unwrap();
        let out = compute(&series).unwrap();
        assert!(!out.volume_patterns.spike);
        assert_eq!(out.volume_patterns.recent_ratio, None);
        assert_eq!(out.volume_oscillators.volume_roc, None);
        assert_eq!(out.volume_metrics.vwap, None);
    }

    #[tokio::test]
    async fn test_unknown_symbol_short_circuits() {
        let provider = MemoryDataProvider::new();
        let err = volume_analysis(&provider, "NOPE", None).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Data(_)));
        assert_eq!(err.to_string(), "No data found");
    }
}
