//! Error types for the application

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{FormField, ValidationErrors};

/// Result type alias using our CalcError
pub type Result<T> = std::result::Result<T, CalcError>;

/// Main error type for rate lookups and position sizing
#[derive(Error, Debug)]
pub enum CalcError {
    /// One or more input fields failed validation
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Computed risk is larger than the account balance
    #[error("Risk amount cannot exceed account balance (risk {risk}, balance {balance})")]
    RiskExceedsBalance { risk: Decimal, balance: Decimal },

    /// Entry and stop loss resolve to the same price
    #[error("Stop loss must differ from entry price to calculate pips")]
    ZeroPipDistance,

    /// Rate provider reported a non-success result
    #[error("Rate provider error: {0}")]
    RateProvider(String),

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Rate cache persistence errors
    #[error("Rate cache error: {0}")]
    Cache(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Inputs too large or too small for decimal arithmetic
    #[error("Calculation overflowed computing {0}")]
    Overflow(&'static str),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CalcError {
    /// Form field a business-rule error should be reported against
    pub fn field(&self) -> Option<FormField> {
        match self {
            CalcError::RiskExceedsBalance { .. } => Some(FormField::RiskAmount),
            CalcError::ZeroPipDistance => Some(FormField::StopLoss),
            CalcError::Validation(errors) => errors.fields().next(),
            _ => None,
        }
    }

    /// User-facing message for the field returned by [`CalcError::field`]
    pub fn field_message(&self) -> String {
        match self {
            CalcError::RiskExceedsBalance { .. } => {
                "Risk amount cannot exceed account balance".to_string()
            }
            CalcError::Validation(errors) => errors
                .iter()
                .next()
                .map(|(_, message)| message.to_string())
                .unwrap_or_default(),
            other => other.to_string(),
        }
    }

    /// Whether a rate provider failure caused this error
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            CalcError::RateProvider(_)
                | CalcError::HttpRequest(_)
                | CalcError::JsonParse(_)
                | CalcError::InvalidResponse(_)
        )
    }
}

impl From<ValidationErrors> for CalcError {
    fn from(errors: ValidationErrors) -> Self {
        CalcError::Validation(errors)
    }
}
