//! LotSizeCalculator - Main Entry Point
//!
//! Computes a forex lot size from account balance, risk and stop distance,
//! valued in the configured local currency.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use lot_size_calculator::common::channels::{create_warning_channel, drain_warnings};
use lot_size_calculator::config::load_config;
use lot_size_calculator::{
    ExchangeRateRestClient, JsonFileRateStore, LotSizeService, MemoryRateStore, PairCatalog,
    RateCache, RateResolver, RateStore, SizingReport, TradeForm,
};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Print the known currency pairs and exit
    #[arg(long)]
    list_pairs: bool,

    /// Currency pair symbol, e.g. EURUSD
    #[arg(long)]
    pair: Option<String>,

    /// Account balance in local currency
    #[arg(long)]
    balance: Option<String>,

    /// Risk amount (percent of balance or absolute, see --risk-type)
    #[arg(long)]
    risk: Option<String>,

    /// "percentage" or "absolute"
    #[arg(long, default_value = "percentage")]
    risk_type: String,

    /// Entry price
    #[arg(long)]
    entry: Option<String>,

    /// Stop loss price
    #[arg(long)]
    stop: Option<String>,

    /// Take profit price (optional)
    #[arg(long)]
    take_profit: Option<String>,

    /// Exchange rate API key
    #[arg(long, env = "EXCHANGE_RATE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

/// Level directive from `--log-level`, else the configured level; unknown values mean info
fn level_directive(cli_level: Option<&str>, configured: &str) -> String {
    let level = cli_level.unwrap_or(configured).trim().to_lowercase();
    if matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
        level
    } else {
        "info".to_string()
    }
}

/// `RUST_LOG` wins over the directive when set
fn log_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let mut config = load_config(Some(&args.config)).context("loading configuration")?;
    if args.api_key.is_some() {
        config.exchange.api_key = args.api_key.clone();
    }

    // Initialize logging
    let directive = level_directive(args.log_level.as_deref(), &config.settings.log_level);
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(&directive))
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting LotSizeCalculator");
    info!("Configuration file: {}", args.config);

    let pairs = PairCatalog::with_pairs(config.pairs.clone());
    if args.list_pairs {
        for pair in pairs.iter() {
            println!("{:<8} {:<8} pip 1e-{}", pair.symbol, pair.label, pair.pip_location);
        }
        return Ok(());
    }

    let client = ExchangeRateRestClient::from_config(&config.exchange)?;
    if !client.has_api_key() {
        warn!("No exchange rate API key configured; fallback rates will be used");
    }

    let store: Arc<dyn RateStore> = match &config.cache.path {
        Some(path) => Arc::new(
            JsonFileRateStore::open(path).with_context(|| format!("opening rate cache {}", path))?,
        ),
        None => Arc::new(MemoryRateStore::new()),
    };

    let (warning_tx, mut warning_rx) = create_warning_channel();
    let resolver = RateResolver::new(Arc::new(client), RateCache::new(store), config.rates.clone())
        .with_warning_channel(warning_tx);
    let local_currency = resolver.local_currency().to_string();
    let service = LotSizeService::new(Arc::new(resolver), pairs);

    let form = TradeForm {
        pair: args.pair,
        balance: args.balance,
        risk_amount: args.risk,
        risk_type: Some(args.risk_type),
        entry_price: args.entry,
        stop_loss: args.stop,
        take_profit: args.take_profit,
    };

    let request = match form.validate(service.pairs()) {
        Ok(request) => request,
        Err(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("{}: {}", field, message);
            }
            std::process::exit(2);
        }
    };

    match service.calculate(&request).await {
        Ok(outcome) => {
            for warning in drain_warnings(&mut warning_rx) {
                eprintln!("Warning: {}", warning);
            }
            println!("{}", SizingReport::new(&outcome.result, &local_currency));
            Ok(())
        }
        Err(e) => {
            match e.field() {
                Some(field) => eprintln!("{}: {}", field, e.field_message()),
                None => eprintln!("{}", e),
            }
            std::process::exit(1);
        }
    }
}
