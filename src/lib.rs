//! LotSizeCalculator Library
//!
//! A Rust library for sizing forex positions from a risk budget, converting
//! pip values into the account's local currency with cached live exchange rates.

pub mod common;
pub mod config;
pub mod exchange;
pub mod rates;
pub mod sizing;

// Re-export commonly used types
pub use common::errors::{CalcError, Result};
pub use common::traits::{Clock, ManualClock, RateProvider, RateStore, SystemClock};
pub use common::types::{
    CalculationOutcome, CurrencyPair, FormField, PairCatalog, RateKind, RateQuote, RateSource,
    RateWarning, RiskMode, SizingResult, TradeRequest, ValidationErrors,
};
pub use config::types::AppConfig;
pub use exchange::rest::ExchangeRateRestClient;
pub use rates::{JsonFileRateStore, MemoryRateStore, RateCache, RateResolver};

// Sizing types
pub use sizing::{compute_sizing, LotSizeService, PositionSizer, SizingReport, TradeForm};
