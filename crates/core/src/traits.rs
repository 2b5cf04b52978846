use crate::models::Series;
use crate::period::Period;
use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Data Provider Trait
// ---------------------------------------------------------------------------

/// Errors that can occur while retrieving a series.
///
/// Provider failures carry the upstream message unchanged so callers see
/// exactly what the data source reported.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("No data found")]
    NoData,
    #[error("{0}")]
    Provider(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid period '{0}': expected <integer><d|mo|y>")]
    InvalidPeriod(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of historical bars for a symbol over a lookback period.
///
/// Implementations do not retry or cache; a caller that needs either wraps
/// the provider.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Retrieve the bars for `symbol` inside `period`, oldest first.
    ///
    /// An empty result is reported as [`DataError::NoData`].
    async fn fetch(&self, symbol: &str, period: &Period) -> Result<Series, DataError>;
}
