mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{AppConfig, ProviderKind};
use quantlens_analysis::{analyze_all, Capability, Envelope, Snapshot};
use quantlens_core::DataProvider;
use quantlens_data::{CsvDataProvider, YahooProvider};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "quantlens")]
#[command(about = "Technical, volume and volatility snapshots for a market symbol")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// TOML config file
    #[arg(short, long, env = "QUANTLENS_CONFIG")]
    config: Option<PathBuf>,

    /// Data source, overriding the config file
    #[arg(long, value_enum)]
    provider: Option<ProviderKind>,

    /// Directory of <SYMBOL>.csv files for the csv provider
    #[arg(long, env = "QUANTLENS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// API key sent to the HTTP provider
    #[arg(long, env = "QUANTLENS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the HTTP provider
    #[arg(long, env = "QUANTLENS_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one analysis and print its snapshot as JSON
    Analyze {
        /// technical, volume or volatility
        capability: Capability,

        /// Instrument symbol (e.g. "AAPL", "SPY")
        #[arg(short, long)]
        symbol: String,

        /// Lookback such as 200d, 3mo or 1y (defaults per analysis)
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Run all analyses for a symbol
    Report {
        #[arg(short, long)]
        symbol: String,
    },

    /// List available analyses
    Capabilities,

    /// Start the API server
    Serve {
        /// Bind address (defaults to the config file value)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

impl Cli {
    /// Config file values with command-line overrides applied.
    fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        if let Some(provider) = self.provider {
            config.provider = provider;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(key) = &self.api_key {
            config.yahoo.api_key = Some(key.clone());
        }
        if let Some(url) = &self.base_url {
            config.yahoo.base_url = url.clone();
        }
        Ok(config)
    }
}

fn build_provider(config: &AppConfig) -> Result<Box<dyn DataProvider>> {
    Ok(match config.provider {
        ProviderKind::Yahoo => Box::new(YahooProvider::new(config.yahoo.clone())?),
        ProviderKind::Csv => Box::new(CsvDataProvider::new(&config.data_dir)),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = cli.resolve_config()?;

    match cli.command {
        Commands::Analyze {
            capability,
            symbol,
            period,
        } => {
            let provider = build_provider(&config)?;
            tracing::info!(%capability, %symbol, provider = provider.name(), "Running analysis");
            let envelope = Envelope::<Snapshot>::from(
                capability
                    .run(provider.as_ref(), &symbol, period.as_deref())
                    .await,
            );
            print_json(&envelope)?;
            if envelope.is_error() {
                std::process::exit(1);
            }
        }
        Commands::Report { symbol } => {
            let provider = build_provider(&config)?;
            let report = analyze_all(provider.as_ref(), &symbol).await;
            print_json(&report)?;
            if report.error_count() == Capability::ALL.len() {
                std::process::exit(1);
            }
        }
        Commands::Capabilities => {
            println!("Available analyses:");
            for capability in Capability::ALL {
                println!(
                    "  {:<11} {:<19} (default {:>4})  {}",
                    capability.slug(),
                    capability.name(),
                    capability.default_period(),
                    capability.description()
                );
            }
        }
        Commands::Serve { bind } => {
            let provider = build_provider(&config)?;
            let bind = bind.unwrap_or(config.bind);
            quantlens_api::start_server(provider, &bind).await?;
        }
    }

    Ok(())
}
