//! REST API client for exchangerate-api.com v6

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use super::messages::{LatestRatesResponse, PairConversionResponse};
use crate::common::errors::{CalcError, Result};
use crate::common::traits::RateProvider;
use crate::config::types::ExchangeRateConfig;

/// REST API client for exchangerate-api.com
#[derive(Debug, Clone)]
pub struct ExchangeRateRestClient {
    /// HTTP client
    client: Client,
    /// Base URL of the v6 API
    base_url: Url,
    /// API key, sent as the first path segment
    api_key: Option<String>,
}

impl ExchangeRateRestClient {
    /// Create a new REST client
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        Self::with_timeout(base_url, api_key, Duration::from_secs(30))
    }

    /// Create a new REST client with custom timeout
    pub fn with_timeout(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CalcError::Internal(e.to_string()))?;

        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| CalcError::Configuration(format!("Invalid exchange base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CalcError::Configuration(format!(
                "Exchange base URL cannot carry a path: {}",
                base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Create a client from configuration
    pub fn from_config(config: &ExchangeRateConfig) -> Result<Self> {
        Self::with_timeout(
            &config.base_url,
            config.api_key.clone(),
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    /// Returns true if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build `{base}/{key}/{segments...}`
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            CalcError::Configuration("exchange.api_key is not set".to_string())
        })?;

        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| CalcError::Internal("exchange base URL has no path".to_string()))?;
            path.pop_if_empty().push(api_key);
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Issue a GET and decode the JSON body.
    ///
    /// Non-2xx responses are still decoded when possible so the
    /// provider's `error-type` reaches the caller.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<(reqwest::StatusCode, T)> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<T>(&body) {
            Ok(parsed) => Ok((status, parsed)),
            Err(_) if !status.is_success() => Err(CalcError::InvalidResponse(format!(
                "Server returned status {}: {}",
                status, body
            ))),
            Err(e) => Err(CalcError::JsonParse(e)),
        }
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    /// Get the latest conversion table for `base`
    #[instrument(skip(self))]
    pub async fn get_latest(&self, base: &str) -> Result<LatestRatesResponse> {
        let url = self.endpoint(&["latest", &base.to_uppercase()])?;
        debug!("Fetching latest rates for {}", base);

        let (status, latest): (_, LatestRatesResponse) = self.get_json(url).await?;
        if !latest.is_success() || !status.is_success() {
            return Err(provider_error(latest.error_type, status));
        }
        Ok(latest)
    }

    /// Get the conversion rate for a single pair
    #[instrument(skip(self))]
    pub async fn get_pair(&self, from: &str, to: &str) -> Result<PairConversionResponse> {
        let url = self.endpoint(&["pair", &from.to_uppercase(), &to.to_uppercase()])?;
        debug!("Fetching pair conversion {}/{}", from, to);

        let (status, pair): (_, PairConversionResponse) = self.get_json(url).await?;
        if !pair.is_success() || !status.is_success() {
            return Err(provider_error(pair.error_type, status));
        }
        Ok(pair)
    }
}

fn provider_error(error_type: Option<String>, status: reqwest::StatusCode) -> CalcError {
    match error_type {
        Some(kind) => CalcError::RateProvider(kind),
        None if !status.is_success() => {
            CalcError::InvalidResponse(format!("Server returned status {}", status))
        }
        None => CalcError::RateProvider("API error".to_string()),
    }
}

#[async_trait]
impl RateProvider for ExchangeRateRestClient {
    async fn latest_rate(&self, base: &str, target: &str) -> Result<Decimal> {
        let latest = self.get_latest(base).await?;
        latest.rate_for(target).ok_or_else(|| {
            CalcError::InvalidResponse(format!("No {} rate in {} conversion table", target, base))
        })
    }

    async fn pair_rate(&self, from: &str, to: &str) -> Result<Decimal> {
        let pair = self.get_pair(from, to).await?;
        pair.conversion_rate.ok_or_else(|| {
            CalcError::InvalidResponse(format!("Missing conversion_rate for {}/{}", from, to))
        })
    }

    fn provider_name(&self) -> &'static str {
        "exchangerate-api"
    }
}
