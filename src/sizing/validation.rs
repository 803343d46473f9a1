//! Trade form validation
//!
//! Turns raw text input into a [`TradeRequest`], reporting every invalid
//! field at once so the form can mark all of them in a single pass.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

use crate::common::types::{FormField, PairCatalog, RiskMode, TradeRequest, ValidationErrors};

/// Field messages shown to the user
pub mod messages {
    pub const PAIR: &str = "Please select a trading pair";
    pub const BALANCE: &str = "Please enter a valid account balance";
    pub const RISK_AMOUNT: &str = "Please enter a valid risk amount";
    pub const RISK_TYPE: &str = "Please select a valid risk type";
    pub const ENTRY_PRICE: &str = "Please enter a valid entry price";
    pub const STOP_LOSS: &str = "Please enter a valid stop loss";
    pub const TAKE_PROFIT: &str = "Please enter a valid take profit";
    pub const RISK_PERCENTAGE: &str = "Risk percentage cannot be 100% or more";
    pub const STOP_EQUALS_ENTRY: &str = "Stop loss cannot be the same as entry price";
}

/// Raw, unvalidated trade form input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeForm {
    pub pair: Option<String>,
    pub balance: Option<String>,
    pub risk_amount: Option<String>,
    /// "percentage" or "absolute"; percentage when absent
    pub risk_type: Option<String>,
    pub entry_price: Option<String>,
    pub stop_loss: Option<String>,
    pub take_profit: Option<String>,
}

impl TradeForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pair(mut self, value: impl Into<String>) -> Self {
        self.pair = Some(value.into());
        self
    }

    pub fn balance(mut self, value: impl Into<String>) -> Self {
        self.balance = Some(value.into());
        self
    }

    pub fn risk_amount(mut self, value: impl Into<String>) -> Self {
        self.risk_amount = Some(value.into());
        self
    }

    pub fn risk_type(mut self, value: impl Into<String>) -> Self {
        self.risk_type = Some(value.into());
        self
    }

    pub fn entry_price(mut self, value: impl Into<String>) -> Self {
        self.entry_price = Some(value.into());
        self
    }

    pub fn stop_loss(mut self, value: impl Into<String>) -> Self {
        self.stop_loss = Some(value.into());
        self
    }

    pub fn take_profit(mut self, value: impl Into<String>) -> Self {
        self.take_profit = Some(value.into());
        self
    }

    /// Validate every field against `catalog`
    ///
    /// # Returns
    /// The trade request, or all field errors found
    pub fn validate(&self, catalog: &PairCatalog) -> Result<TradeRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let pair = non_blank(&self.pair).and_then(|symbol| catalog.get(symbol));
        if pair.is_none() {
            errors.insert(FormField::Pair, messages::PAIR);
        }

        let balance = parse_number(&self.balance);
        let risk_amount = parse_number(&self.risk_amount);
        let entry_price = parse_number(&self.entry_price);
        let stop_loss = parse_number(&self.stop_loss);

        let balance = require_positive(balance, FormField::Balance, messages::BALANCE, &mut errors);
        let risk = require_positive(risk_amount, FormField::RiskAmount, messages::RISK_AMOUNT, &mut errors);
        let entry = require_positive(entry_price, FormField::EntryPrice, messages::ENTRY_PRICE, &mut errors);
        let stop = require_positive(stop_loss, FormField::StopLoss, messages::STOP_LOSS, &mut errors);

        let take_profit = match non_blank(&self.take_profit) {
            None => None,
            Some(raw) => match Decimal::from_str(raw) {
                Ok(tp) if tp > Decimal::ZERO => Some(tp),
                _ => {
                    errors.insert(FormField::TakeProfit, messages::TAKE_PROFIT);
                    None
                }
            },
        };

        let risk_mode = match non_blank(&self.risk_type) {
            None => Some(RiskMode::Percentage),
            Some(raw) => match raw.parse::<RiskMode>() {
                Ok(mode) => Some(mode),
                Err(_) => {
                    errors.insert(FormField::RiskType, messages::RISK_TYPE);
                    None
                }
            },
        };

        // These two replace whatever message the field already has
        if risk_mode == Some(RiskMode::Percentage) && risk_amount.is_some_and(|r| r >= dec!(100)) {
            errors.insert(FormField::RiskAmount, messages::RISK_PERCENTAGE);
        }
        if let (Some(entry), Some(stop)) = (entry_price, stop_loss) {
            if entry == stop {
                errors.insert(FormField::StopLoss, messages::STOP_EQUALS_ENTRY);
            }
        }

        match (pair, balance, risk, risk_mode, entry, stop) {
            (Some(pair), Some(balance), Some(risk_amount), Some(risk_mode), Some(entry_price), Some(stop_loss))
                if errors.is_empty() =>
            {
                Ok(TradeRequest {
                    balance,
                    risk_amount,
                    risk_mode,
                    entry_price,
                    stop_loss,
                    take_profit,
                    pair: pair.clone(),
                })
            }
            _ => Err(errors),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number(value: &Option<String>) -> Option<Decimal> {
    non_blank(value).and_then(|raw| Decimal::from_str(raw).ok())
}

fn require_positive(
    value: Option<Decimal>,
    field: FormField,
    message: &str,
    errors: &mut ValidationErrors,
) -> Option<Decimal> {
    match value {
        Some(v) if v > Decimal::ZERO => Some(v),
        _ => {
            errors.insert(field, message);
            None
        }
    }
}
