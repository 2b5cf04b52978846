use async_trait::async_trait;
use quantlens_core::{Bar, DataError, DataProvider, Period, Series};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An in-memory provider holding a fixed set of bars per symbol.
///
/// The period is applied relative to the newest stored bar, the same way
/// the CSV provider windows a file. A symbol can also be registered with a
/// canned error message to exercise failure paths.
#[derive(Debug, Default)]
pub struct MemoryDataProvider {
    bars: HashMap<String, Vec<Bar>>,
    failures: HashMap<String, String>,
    fetches: AtomicUsize,
}

impl MemoryDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }

    /// Make every fetch of `symbol` fail with a provider error carrying `message`.
    pub fn with_failure(mut self, symbol: &str, message: &str) -> Self {
        self.failures.insert(symbol.to_string(), message.to_string());
        self
    }

    /// Number of `fetch` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

/// Keep only the bars inside `period`, measured back from the newest bar.
pub(crate) fn window_bars(mut bars: Vec<Bar>, period: &Period) -> Vec<Bar> {
    let Some(newest) = bars.iter().map(|b| b.timestamp).max() else {
        return bars;
    };
    let start = period.start_before(newest);
    bars.retain(|b| b.timestamp > start);
    bars
}

#[async_trait]
impl DataProvider for MemoryDataProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self, symbol: &str, period: &Period) -> Result<Series, DataError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);

        if let Some(message) = self.failures.get(symbol) {
            return Err(DataError::Provider(message.clone()));
        }

        let bars = self.bars.get(symbol).cloned().unwrap_or_default();
        Series::new(symbol, window_bars(bars, period))
    }
}
