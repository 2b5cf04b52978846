use crate::envelope::{AnalysisError, Envelope};
use crate::technical::{self, TechnicalSnapshot};
use crate::volatility::{self, VolatilityMetrics};
use crate::volume::{self, VolumeAnalysis};
use quantlens_core::DataProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// The analyses a decision layer can request for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    TechnicalAnalysis,
    VolumeAnalysis,
    VolatilityMetrics,
}

impl Capability {
    pub const ALL: [Capability; 3] = [
        Capability::TechnicalAnalysis,
        Capability::VolumeAnalysis,
        Capability::VolatilityMetrics,
    ];

    /// Display name used in prompts and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Capability::TechnicalAnalysis => "Technical Analysis",
            Capability::VolumeAnalysis => "Volume Analysis",
            Capability::VolatilityMetrics => "Volatility Metrics",
        }
    }

    /// URL and command-line form.
    pub fn slug(&self) -> &'static str {
        match self {
            Capability::TechnicalAnalysis => "technical",
            Capability::VolumeAnalysis => "volume",
            Capability::VolatilityMetrics => "volatility",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Capability::TechnicalAnalysis => {
                "Technical indicators including SMA, EMA, RSI, MACD and Bollinger Bands"
            }
            Capability::VolumeAnalysis => {
                "Volume metrics including OBV, VWAP, volume spikes and trend analysis"
            }
            Capability::VolatilityMetrics => {
                "Volatility metrics including ATR, Bollinger width and historical volatility"
            }
        }
    }

    pub fn default_period(&self) -> &'static str {
        match self {
            Capability::TechnicalAnalysis => technical::DEFAULT_PERIOD,
            Capability::VolumeAnalysis => volume::DEFAULT_PERIOD,
            Capability::VolatilityMetrics => volatility::DEFAULT_PERIOD,
        }
    }

    /// Fetch `symbol` and run this analysis over `period`, or the default period.
    pub async fn run(
        &self,
        provider: &dyn DataProvider,
        symbol: &str,
        period: Option<&str>,
    ) -> Result<Snapshot, AnalysisError> {
        Ok(match self {
            Capability::TechnicalAnalysis => {
                Snapshot::Technical(technical::technical_snapshot(provider, symbol, period).await?)
            }
            Capability::VolumeAnalysis => {
                Snapshot::Volume(volume::volume_analysis(provider, symbol, period).await?)
            }
            Capability::VolatilityMetrics => {
                Snapshot::Volatility(volatility::volatility_metrics(provider, symbol, period).await?)
            }
        })
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown capability '{0}'")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    /// Accepts the slug, the snake_case variant name or the display name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Capability::ALL
            .into_iter()
            .find(|c| {
                wanted == c.slug() || wanted == c.name().to_ascii_lowercase().replace(' ', "_")
            })
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

/// Result of any single capability.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Snapshot {
    Technical(TechnicalSnapshot),
    Volume(VolumeAnalysis),
    Volatility(VolatilityMetrics),
}

/// All three analyses for one symbol, each succeeding or failing on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketReport {
    pub symbol: String,
    pub technical: Envelope<TechnicalSnapshot>,
    pub volume: Envelope<VolumeAnalysis>,
    pub volatility: Envelope<VolatilityMetrics>,
}

impl MarketReport {
    pub fn error_count(&self) -> usize {
        [
            self.technical.is_error(),
            self.volume.is_error(),
            self.volatility.is_error(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}

/// Run every capability for `symbol` concurrently with default periods.
pub async fn analyze_all(provider: &dyn DataProvider, symbol: &str) -> MarketReport {
    let (technical, volume, volatility) = tokio::join!(
        technical::technical_snapshot(provider, symbol, None),
        volume::volume_analysis(provider, symbol, None),
        volatility::volatility_metrics(provider, symbol, None),
    );

    let report = MarketReport {
        symbol: symbol.to_string(),
        technical: technical.into(),
        volume: volume.into(),
        volatility: volatility.into(),
    };
    info!(symbol, errors = report.error_count(), "Built market report");
    report
}
