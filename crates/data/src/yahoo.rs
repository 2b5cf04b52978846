//! Yahoo Finance chart API provider.
//!
//! Fetches daily OHLCV bars from the v8 chart endpoint. There is no retry,
//! backoff or caching here; transport and format failures are reported
//! verbatim through [`DataError::Provider`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quantlens_core::{Bar, DataError, DataProvider, Period, Series};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Connection settings for an HTTP market data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://query2.finance.yahoo.com".to_string(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl YahooProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, DataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("quantlens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::Provider(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Build the chart API URL for a symbol and time range.
    ///
    /// The symbol is percent-encoded as a single path segment.
    fn chart_url(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Url, DataError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| DataError::Provider(format!("invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| DataError::Provider("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("period1", &start.timestamp().to_string())
            .append_pair("period2", &end.timestamp().to_string())
            .append_pair("interval", "1d");
        Ok(url)
    }
}

/// Parse the chart API response body into bars.
///
/// Rows whose OHLCV fields are all null (holidays, halted sessions) are
/// dropped; a row with only some fields missing is a provider error.
fn parse_chart(body: &str) -> Result<Vec<Bar>, DataError> {
    let resp: ChartResponse =
        serde_json::from_str(body).map_err(|e| DataError::Provider(e.to_string()))?;

    let data = match (resp.chart.result, resp.chart.error) {
        (_, Some(err)) if err.code == "Not Found" => return Err(DataError::NoData),
        (_, Some(err)) => {
            return Err(DataError::Provider(format!("{}: {}", err.code, err.description)))
        }
        (Some(results), None) => match results.into_iter().next() {
            Some(data) => data,
            None => return Err(DataError::NoData),
        },
        (None, None) => return Err(DataError::NoData),
    };

    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let at = |column: &[Option<f64>]| column.get(i).copied().flatten();
        let fields = [
            at(&quote.open[..]),
            at(&quote.high[..]),
            at(&quote.low[..]),
            at(&quote.close[..]),
            at(&quote.volume[..]),
        ];

        if fields.iter().all(Option::is_none) {
            continue;
        }

        let [Some(open), Some(high), Some(low), Some(close), volume] = fields else {
            return Err(DataError::Provider(format!(
                "incomplete bar at timestamp {}",
                ts
            )));
        };

        let timestamp = DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| DataError::Provider(format!("invalid timestamp: {}", ts)))?;

        bars.push(Bar::new(timestamp, open, high, low, close, volume.unwrap_or(0.0)));
    }

    Ok(bars)
}

#[async_trait]
impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch(&self, symbol: &str, period: &Period) -> Result<Series, DataError> {
        let end = Utc::now();
        // The chart API has no bars before the epoch.
        let start = period.start_before(end).max(DateTime::<Utc>::UNIX_EPOCH);
        let url = self.chart_url(symbol, start, end)?;
        debug!(%url, "Requesting chart");

        let mut request = self.client.get(url);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DataError::Provider(e.to_string()))?;

        // The chart API reports unknown symbols with a 404 and a JSON error body.
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DataError::Provider(e.to_string()))?;

        let bars = match parse_chart(&body) {
            Ok(bars) => bars,
            Err(e) if !status.is_success() && matches!(e, DataError::Provider(_)) => {
                return Err(DataError::Provider(format!("HTTP {}: {}", status, e)))
            }
            Err(e) => return Err(e),
        };

        info!(symbol, %period, bars = bars.len(), "Fetched chart");
        Series::new(symbol, bars)
    }
}
