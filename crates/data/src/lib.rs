pub mod csv_loader;
pub mod memory;
pub mod yahoo;

pub use memory::MemoryDataProvider;
pub use yahoo::{ProviderConfig, YahooProvider};

use async_trait::async_trait;
use quantlens_core::{DataError, DataProvider, Period, Series};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// A CSV-file-based data provider.
///
/// Each symbol lives in `<directory>/<SYMBOL>.csv`. The requested period is
/// measured back from the newest bar in the file, so results do not depend
/// on the wall clock.
pub struct CsvDataProvider {
    pub directory: PathBuf,
}

impl CsvDataProvider {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// List symbols with a CSV file in the directory.
    pub fn available_symbols(&self) -> Result<Vec<String>, DataError> {
        let mut symbols = Vec::new();
        for entry in std::fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "csv").unwrap_or(false) {
                if let Some(stem) = path.file_stem() {
                    symbols.push(stem.to_string_lossy().to_string());
                }
            }
        }
        symbols.sort();
        Ok(symbols)
    }
}

/// A symbol must name a file directly inside the data directory.
fn is_plain_symbol(symbol: &str) -> bool {
    if symbol.is_empty() || symbol.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(symbol).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[async_trait]
impl DataProvider for CsvDataProvider {
    fn name(&self) -> &str {
        "csv"
    }

    async fn fetch(&self, symbol: &str, period: &Period) -> Result<Series, DataError> {
        if !is_plain_symbol(symbol) {
            debug!(symbol, "Symbol is not a plain file name");
            return Err(DataError::NoData);
        }

        let file_path = self.directory.join(format!("{}.csv", symbol));
        if !file_path.exists() {
            debug!(path = %file_path.display(), "CSV file not found");
            return Err(DataError::NoData);
        }

        let bars = csv_loader::load_bars_from_csv(&file_path)?;
        let bars = memory::window_bars(bars, period);
        info!(symbol, %period, bars = bars.len(), "Loaded CSV bars");
        Series::new(symbol, bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("quantlens-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_csv_provider_windows_by_period() {
        let dir = temp_dir("window");
        let mut csv = String::from("date,open,high,low,close,volume\n");
        for day in 1..=31 {
            csv.push_str(&format!("2024-01-{day:02},10,11,9,10.5,{}\n", day * 100));
        }
        fs::write(dir.join("ABC.csv"), csv).unwrap();

        let provider = CsvDataProvider::new(&dir);
        let series = provider.fetch("ABC", &Period::days(7)).await.unwrap();
        assert_eq!(series.len(), 7);
        assert_eq!(series.latest().volume, 3100.0);
        assert_eq!(provider.available_symbols().unwrap(), vec!["ABC".to_string()]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_no_data() {
        let dir = temp_dir("missing");
        let provider = CsvDataProvider::new(&dir);
        let err = provider.fetch("NOPE", &Period::years(1)).await.unwrap_err();
        assert!(matches!(err, DataError::NoData));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_symbol_cannot_leave_directory() {
        let root = temp_dir("escape");
        let dir = root.join("data");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            root.join("secret.csv"),
            "date,open,high,low,close,volume\n2024-01-02,10,11,9,10.5,100\n",
        )
        .unwrap();

        let provider = CsvDataProvider::new(&dir);
        for symbol in ["../secret", "..", ".", "", "data/../../secret", "..\\secret", "/etc/passwd"] {
            let err = provider.fetch(symbol, &Period::years(1)).await.unwrap_err();
            assert!(matches!(err, DataError::NoData), "{symbol:?} was not rejected");
        }

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_plain_symbols() {
        assert!(is_plain_symbol("AAPL"));
        assert!(is_plain_symbol("BRK.B"));
        assert!(is_plain_symbol("^GSPC"));
        assert!(!is_plain_symbol("a/b"));
        assert!(!is_plain_symbol("../secret"));
    }

    #[tokio::test]
    async fn test_header_only_file_is_no_data() {
        let dir = temp_dir("empty");
        fs::write(dir.join("EMPTY.csv"), "date,open,high,low,close,volume\n").unwrap();
        let provider = CsvDataProvider::new(&dir);
        let err = provider.fetch("EMPTY", &Period::days(30)).await.unwrap_err();
        assert_eq!(err.to_string(), "No data found");
        fs::remove_dir_all(&dir).unwrap();
    }
}
