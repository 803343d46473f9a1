//! Configuration types

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::common::types::CurrencyPair;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Exchange rate API configuration
    #[serde(default)]
    pub exchange: ExchangeRateConfig,
    /// Rate resolution policy
    #[serde(default)]
    pub rates: RatePolicyConfig,
    /// Rate cache storage
    #[serde(default)]
    pub cache: CacheConfig,
    /// Pairs added to (or overriding) the standard catalog
    #[serde(default)]
    pub pairs: Vec<CurrencyPair>,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// exchangerate-api.com v6 configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRateConfig {
    /// API key, embedded in the request path
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL of the v6 API
    #[serde(default = "default_exchange_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ExchangeRateConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_exchange_base_url(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_exchange_base_url() -> String {
    "https://v6.exchangerate-api.com/v6".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// How rates are resolved, cached and substituted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatePolicyConfig {
    /// Currency balances and risk are expressed in
    #[serde(default = "default_local_currency")]
    pub local_currency: String,
    /// How long a cached rate stays valid, in milliseconds
    #[serde(default = "default_freshness_ms")]
    pub freshness_ms: i64,
    /// Local units per anchor unit used when the provider fails
    #[serde(default = "default_fallback_local_rate")]
    pub fallback_local_rate: Decimal,
    /// Anchor units per quote unit used when the provider fails
    #[serde(default = "default_fallback_usd_rate")]
    pub fallback_usd_rate: Decimal,
}

impl Default for RatePolicyConfig {
    fn default() -> Self {
        Self {
            local_currency: default_local_currency(),
            freshness_ms: default_freshness_ms(),
            fallback_local_rate: default_fallback_local_rate(),
            fallback_usd_rate: default_fallback_usd_rate(),
        }
    }
}

fn default_local_currency() -> String {
    "NGN".to_string()
}

fn default_freshness_ms() -> i64 {
    3_600_000
}

fn default_fallback_local_rate() -> Decimal {
    dec!(1650)
}

fn default_fallback_usd_rate() -> Decimal {
    dec!(1)
}

/// Rate cache storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// JSON file to persist rates in; in-memory when absent
    #[serde(default)]
    pub path: Option<String>,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
