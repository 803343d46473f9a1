//! exchangerate-api.com v6 response types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Value of the `result` field on a successful response
pub const RESULT_SUCCESS: &str = "success";

/// Response of `GET /{key}/latest/{base}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestRatesResponse {
    /// "success" or "error"
    pub result: String,
    /// Error classification when `result` is "error"
    #[serde(rename = "error-type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub base_code: Option<String>,
    #[serde(default)]
    pub time_last_update_unix: Option<i64>,
    /// Units of each currency per one unit of `base_code`
    #[serde(default)]
    pub conversion_rates: HashMap<String, Decimal>,
}

impl LatestRatesResponse {
    pub fn is_success(&self) -> bool {
        self.result == RESULT_SUCCESS
    }

    /// Rate for `target`, matched case-insensitively
    pub fn rate_for(&self, target: &str) -> Option<Decimal> {
        self.conversion_rates
            .get(target)
            .or_else(|| self.conversion_rates.get(&target.to_uppercase()))
            .copied()
    }
}

/// Response of `GET /{key}/pair/{from}/{to}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairConversionResponse {
    /// "success" or "error"
    pub result: String,
    /// Error classification when `result` is "error"
    #[serde(rename = "error-type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub base_code: Option<String>,
    #[serde(default)]
    pub target_code: Option<String>,
    #[serde(default)]
    pub time_last_update_unix: Option<i64>,
    #[serde(default)]
    pub conversion_rate: Option<Decimal>,
}

impl PairConversionResponse {
    pub fn is_success(&self) -> bool {
        self.result == RESULT_SUCCESS
    }
}
