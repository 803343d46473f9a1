//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{CalcError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with LOTSIZE__)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("LOTSIZE")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| CalcError::Configuration(e.to_string()))?;

    let mut app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| CalcError::Configuration(e.to_string()))?;

    // The provider's own env var wins over an unset key in the file
    if app_config.exchange.api_key.is_none() {
        app_config.exchange.api_key = std::env::var("EXCHANGE_RATE_API_KEY").ok();
    }

    validate(&app_config)?;
    Ok(app_config)
}

/// Load configuration from environment variables only
pub fn load_from_env() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let mut app_config = AppConfig::default();
    app_config.exchange.api_key = std::env::var("EXCHANGE_RATE_API_KEY").ok();
    if let Ok(url) = std::env::var("EXCHANGE_RATE_BASE_URL") {
        app_config.exchange.base_url = url;
    }
    if let Ok(currency) = std::env::var("LOCAL_CURRENCY") {
        app_config.rates.local_currency = currency.trim().to_uppercase();
    }
    app_config.cache.path = std::env::var("RATE_CACHE_PATH").ok();

    validate(&app_config)?;
    Ok(app_config)
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.rates.freshness_ms <= 0 {
        return Err(CalcError::Configuration(
            "rates.freshness_ms must be positive".to_string(),
        ));
    }
    if config.rates.local_currency.trim().len() != 3 {
        return Err(CalcError::Configuration(format!(
            "rates.local_currency must be a 3-letter code, got '{}'",
            config.rates.local_currency
        )));
    }
    if let Some(pair) = config.pairs.iter().find(|p| p.base.is_empty() || p.quote.is_empty()) {
        return Err(CalcError::Configuration(format!(
            "pair '{}' needs both base and quote currencies",
            pair.symbol
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "lot_size_config_{}_{}.toml",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        std::fs::write(
            &path,
            r#"
[rates]
local_currency = "GHS"
fallback_local_rate = 15.5

[cache]
path = "/tmp/rates.json"

[[pairs]]
symbol = "USDZAR"
base = "USD"
quote = "ZAR"
pip_location = 4
"#,
        )
        .unwrap();

        let config = load_config(path.to_str()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.rates.local_currency, "GHS");
        assert_eq!(config.rates.fallback_local_rate, dec!(15.5));
        assert_eq!(config.cache.path.as_deref(), Some("/tmp/rates.json"));
        assert_eq!(config.pairs.len(), 1);
        assert_eq!(config.pairs[0].quote, "ZAR");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_config(Some("/nonexistent/lot_size.toml")).unwrap();
        assert_eq!(config.rates.freshness_ms, 3_600_000);
    }

    #[test]
    fn test_rejects_non_positive_freshness() {
        let mut config = AppConfig::default();
        config.rates.freshness_ms = 0;
        assert!(matches!(validate(&config), Err(CalcError::Configuration(_))));
    }
}
