//! Technical snapshot: trend and momentum readings for the latest bar.

use crate::envelope::{AnalysisError, ComputationError};
use crate::rounding::{round, round_opt, PRICE_DP, RATIO_DP};
use quantlens_core::{DataProvider, Series};
use quantlens_indicators as ind;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

pub const DEFAULT_PERIOD: &str = "200d";

const RSI_PERIOD: usize = 14;
const EMA_PERIOD: usize = 20;
const MACD_PERIODS: (usize, usize, usize) = (12, 26, 9);
const BOLLINGER_PERIOD: usize = 20;
const BOLLINGER_STD_DEV: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmaValues {
    #[serde(rename = "SMA_14")]
    pub sma_14: Option<Decimal>,
    #[serde(rename = "SMA_50")]
    pub sma_50: Option<Decimal>,
    #[serde(rename = "SMA_200")]
    pub sma_200: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmaValues {
    #[serde(rename = "EMA_20")]
    pub ema_20: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MacdValues {
    #[serde(rename = "MACD")]
    pub macd: Option<Decimal>,
    pub signal: Option<Decimal>,
    pub histogram: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BollingerValues {
    pub upper: Option<Decimal>,
    pub middle: Option<Decimal>,
    pub lower: Option<Decimal>,
}

/// Latest trend and momentum readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalSnapshot {
    /// Latest close.
    pub price: Decimal,
    #[serde(rename = "SMA")]
    pub sma: SmaValues,
    #[serde(rename = "EMA")]
    pub ema: EmaValues,
    #[serde(rename = "RSI")]
    pub rsi: Option<Decimal>,
    #[serde(rename = "MACD")]
    pub macd: MacdValues,
    #[serde(rename = "Bollinger")]
    pub bollinger: BollingerValues,
}

/// Build the snapshot from an already retrieved series.
pub fn compute(series: &Series) -> Result<TechnicalSnapshot, ComputationError> {
    series.validate()?;
    let closes = series.closes();

    let sma_last = |period: usize| -> Result<Option<f64>, ComputationError> {
        Ok(ind::sma(&closes, period)?.last())
    };

    let (fast, slow, signal) = MACD_PERIODS;
    let macd = ind::macd(&closes, fast, slow, signal)?;
    let bands = ind::bollinger_bands(&closes, BOLLINGER_PERIOD, BOLLINGER_STD_DEV)?;

    Ok(TechnicalSnapshot {
        price: round("price", series.latest().close, PRICE_DP)?,
        sma: SmaValues {
            sma_14: round_opt("SMA_14", sma_last(14)?, PRICE_DP)?,
            sma_50: round_opt("SMA_50", sma_last(50)?, PRICE_DP)?,
            sma_200: round_opt("SMA_200", sma_last(200)?, PRICE_DP)?,
        },
        ema: EmaValues {
            ema_20: round_opt("EMA_20", ind::ema(&closes, EMA_PERIOD)?.last(), PRICE_DP)?,
        },
        rsi: round_opt("RSI", ind::rsi(&closes, RSI_PERIOD)?.last(), PRICE_DP)?,
        macd: MacdValues {
            macd: round_opt("MACD", macd.macd.last(), RATIO_DP)?,
            signal: round_opt("Signal", macd.signal.last(), RATIO_DP)?,
            histogram: round_opt("Histogram", macd.histogram.last(), RATIO_DP)?,
        },
        bollinger: BollingerValues {
            upper: round_opt("Upper", bands.upper.last(), RATIO_DP)?,
            middle: round_opt("Middle", bands.middle.last(), RATIO_DP)?,
            lower: round_opt("Lower", bands.lower.last(), RATIO_DP)?,
        },
    })
}

/// Fetch `symbol` over `period` (default `200d`) and build the snapshot.
pub async fn technical_snapshot(
    provider: &dyn DataProvider,
    symbol: &str,
    period: Option<&str>,
) -> Result<TechnicalSnapshot, AnalysisError> {
    let series = crate::fetch_series(provider, symbol, period, DEFAULT_PERIOD).await?;
    let snapshot = compute(&series)?;
    info!(symbol, bars = series.len(), "Computed technical snapshot");
    Ok(snapshot)
}
