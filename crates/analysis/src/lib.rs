//! Snapshot assemblers: fetch one window of bars, run the indicators over it
//! and report the latest readings as a rounded, serialisable snapshot.

pub mod capability;
pub mod envelope;
pub mod rounding;
pub mod technical;
pub mod volatility;
pub mod volume;

pub use capability::{analyze_all, Capability, MarketReport, Snapshot, UnknownCapability};
pub use envelope::{AnalysisError, ComputationError, Envelope};
pub use technical::{technical_snapshot, TechnicalSnapshot};
pub use volatility::{volatility_metrics, VolatilityMetrics};
pub use volume::{volume_analysis, VolumeAnalysis};

use quantlens_core::{DataProvider, Period, Series};
use tracing::debug;

/// Resolve the requested period (or the assembler's default) and fetch the series.
pub(crate) async fn fetch_series(
    provider: &dyn DataProvider,
    symbol: &str,
    period: Option<&str>,
    default_period: &str,
) -> Result<Series, AnalysisError> {
    let period: Period = period.unwrap_or(default_period).parse()?;
    debug!(symbol, %period, provider = provider.name(), "Fetching series");
    Ok(provider.fetch(symbol, &period).await?)
}
