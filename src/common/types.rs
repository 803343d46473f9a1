//! Shared types for pairs, trade requests, rate quotes and sizing results

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Currency all pip values are first normalised into
pub const ANCHOR_CURRENCY: &str = "USD";

/// Units of base currency in one standard lot
pub const STANDARD_LOT_UNITS: Decimal = dec!(100000);

// ============================================================================
// Reference Data
// ============================================================================

/// A tradable forex pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Pair symbol, e.g. "EURUSD"
    pub symbol: String,
    /// Display label, e.g. "EUR/USD"
    #[serde(default)]
    pub label: String,
    /// Base currency code
    pub base: String,
    /// Quote currency code
    pub quote: String,
    /// Decimal place of one pip (4 for most pairs, 2 for JPY pairs)
    pub pip_location: u32,
}

impl CurrencyPair {
    pub fn new(base: &str, quote: &str, pip_location: u32) -> Self {
        Self {
            symbol: format!("{}{}", base, quote),
            label: format!("{}/{}", base, quote),
            base: base.to_string(),
            quote: quote.to_string(),
            pip_location,
        }
    }

    /// Size of one pip in quote currency
    pub fn pip_size(&self) -> Decimal {
        if self.pip_location == 4 {
            dec!(0.0001)
        } else {
            dec!(0.01)
        }
    }

    /// Returns true if the pair is quoted in the anchor currency
    pub fn is_quoted_in_anchor(&self) -> bool {
        self.quote.eq_ignore_ascii_case(ANCHOR_CURRENCY)
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "{}/{}", self.base, self.quote)
        } else {
            write!(f, "{}", self.label)
        }
    }
}

/// Known currency pairs, looked up by symbol
#[derive(Debug, Clone)]
pub struct PairCatalog {
    pairs: Vec<CurrencyPair>,
}

impl PairCatalog {
    /// The ten majors and crosses available out of the box
    pub fn standard() -> Self {
        Self {
            pairs: vec![
                CurrencyPair::new("EUR", "USD", 4),
                CurrencyPair::new("USD", "JPY", 2),
                CurrencyPair::new("GBP", "USD", 4),
                CurrencyPair::new("USD", "CHF", 4),
                CurrencyPair::new("AUD", "USD", 4),
                CurrencyPair::new("USD", "CAD", 4),
                CurrencyPair::new("NZD", "USD", 4),
                CurrencyPair::new("EUR", "GBP", 4),
                CurrencyPair::new("EUR", "JPY", 2),
                CurrencyPair::new("GBP", "JPY", 2),
            ],
        }
    }

    /// Standard catalog extended with extra pairs.
    ///
    /// An extra pair whose symbol is already known replaces the built-in entry.
    pub fn with_pairs(extra: impl IntoIterator<Item = CurrencyPair>) -> Self {
        let mut catalog = Self::standard();
        for mut pair in extra {
            pair.symbol = pair.symbol.to_uppercase();
            if pair.label.is_empty() {
                pair.label = format!("{}/{}", pair.base, pair.quote);
            }
            match catalog.pairs.iter_mut().find(|p| p.symbol == pair.symbol) {
                Some(existing) => *existing = pair,
                None => catalog.pairs.push(pair),
            }
        }
        catalog
    }

    /// Find a pair by symbol (case-insensitive)
    pub fn get(&self, symbol: &str) -> Option<&CurrencyPair> {
        let symbol = symbol.trim();
        self.pairs
            .iter()
            .find(|p| p.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CurrencyPair> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Default for PairCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// Trade Input
// ============================================================================

/// How the risk amount is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskMode {
    /// Fixed amount in local currency
    Absolute,
    /// Percentage of account balance
    Percentage,
}

impl fmt::Display for RiskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskMode::Absolute => write!(f, "absolute"),
            RiskMode::Percentage => write!(f, "percentage"),
        }
    }
}

impl FromStr for RiskMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "absolute" | "amount" | "fixed" => Ok(RiskMode::Absolute),
            "percentage" | "percent" | "%" => Ok(RiskMode::Percentage),
            other => Err(format!("unknown risk type: {}", other)),
        }
    }
}

/// Validated parameters for one sizing calculation
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRequest {
    /// Account balance in local currency
    pub balance: Decimal,
    /// Risk, either absolute or a percentage of balance
    pub risk_amount: Decimal,
    pub risk_mode: RiskMode,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    /// Target price; `None` or zero means no target
    pub take_profit: Option<Decimal>,
    pub pair: CurrencyPair,
}

impl TradeRequest {
    /// Take profit if one was actually set
    pub fn target(&self) -> Option<Decimal> {
        self.take_profit.filter(|tp| *tp > Decimal::ZERO)
    }
}

/// Input fields of the trade form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Pair,
    Balance,
    RiskAmount,
    RiskType,
    EntryPrice,
    StopLoss,
    TakeProfit,
}

impl FormField {
    /// Stable field identifier used by the form
    pub fn id(&self) -> &'static str {
        match self {
            FormField::Pair => "pair",
            FormField::Balance => "balance",
            FormField::RiskAmount => "risk-amount",
            FormField::RiskType => "risk-type",
            FormField::EntryPrice => "entry-price",
            FormField::StopLoss => "stop-loss",
            FormField::TakeProfit => "take-profit",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<FormField, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error for a single field
    pub fn single(field: FormField, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    /// Set the message for a field, replacing any earlier one
    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = FormField> + '_ {
        self.errors.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

// ============================================================================
// Rates
// ============================================================================

/// Which conversion a quote represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKind {
    /// Local currency units per one unit of the currency
    Local,
    /// USD per one unit of the currency
    ToUsd,
}

impl fmt::Display for RateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateKind::Local => write!(f, "local"),
            RateKind::ToUsd => write!(f, "to_usd"),
        }
    }
}

/// Where a quote's value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateSource {
    /// Fetched from the provider for this request
    Live,
    /// Served from a fresh cache entry
    Cached,
    /// Currencies coincide, rate is exactly one
    Identity,
    /// Provider failed, configured constant substituted
    Fallback { reason: String },
}

impl RateSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, RateSource::Fallback { .. })
    }
}

/// A resolved exchange rate
#[derive(Debug, Clone, PartialEq)]
pub struct RateQuote {
    pub currency_code: String,
    pub kind: RateKind,
    /// Value of one unit of `currency_code` in the target currency
    pub rate_value: Decimal,
    pub fetched_at_epoch_millis: i64,
    pub source: RateSource,
}

impl RateQuote {
    pub fn new(
        currency_code: impl Into<String>,
        kind: RateKind,
        rate_value: Decimal,
        fetched_at_epoch_millis: i64,
        source: RateSource,
    ) -> Self {
        Self {
            currency_code: currency_code.into(),
            kind,
            rate_value,
            fetched_at_epoch_millis,
            source,
        }
    }

    /// Whether the quote is younger than `freshness_ms` at `now_millis`
    pub fn is_fresh(&self, now_millis: i64, freshness_ms: i64) -> bool {
        now_millis - self.fetched_at_epoch_millis < freshness_ms
    }
}

/// Advisory emitted when a fallback rate replaced a live one
#[derive(Debug, Clone, PartialEq)]
pub struct RateWarning {
    pub kind: RateKind,
    pub currency_code: String,
    pub target_currency: String,
    pub fallback_value: Decimal,
    pub reason: String,
}

impl RateWarning {
    /// Text shown to the user
    pub fn message(&self) -> String {
        let value = self.fallback_value.normalize();
        match self.kind {
            RateKind::Local => format!(
                "Failed to fetch {}/{} rate. Using fallback rate ({} {}/{}).",
                self.currency_code, self.target_currency, value, self.target_currency, self.currency_code
            ),
            RateKind::ToUsd => format!(
                "Failed to fetch {}/{} rate. Using fallback rate ({}).",
                self.currency_code, self.target_currency, value
            ),
        }
    }
}

impl fmt::Display for RateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

// ============================================================================
// Output
// ============================================================================

/// Position size and derived values, all in local currency unless noted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizingResult {
    /// Position size in standard lots
    pub lot_size: Decimal,
    /// Pip value of the sized position
    pub pip_value_local: Decimal,
    /// Pip value of one standard lot
    pub pip_value_per_lot_local: Decimal,
    /// Pip value of one standard lot in USD
    pub pip_value_per_lot_usd: Decimal,
    /// `None` when no take profit was set
    pub potential_profit_local: Option<Decimal>,
    pub potential_loss_local: Decimal,
    pub risk_amount_local: Decimal,
    pub stop_loss_pips: Decimal,
    pub take_profit_pips: Decimal,
    pub pip_size: Decimal,
}

/// Sizing result together with the rates it was computed from
#[derive(Debug, Clone)]
pub struct CalculationOutcome {
    pub result: SizingResult,
    pub local_rate: RateQuote,
    pub to_usd_rate: RateQuote,
    /// One entry per rate that fell back to a constant
    pub warnings: Vec<RateWarning>,
}

impl CalculationOutcome {
    pub fn used_fallback(&self) -> bool {
        !self.warnings.is_empty()
    }
}
