//! Text rendering of sizing results

use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

use crate::common::types::SizingResult;

/// Shown in place of profit when no take profit was set
pub const NOT_APPLICABLE: &str = "N/A";

/// Symbol printed before amounts in `currency`
pub fn currency_symbol(currency: &str) -> String {
    match currency.to_uppercase().as_str() {
        "NGN" => "₦".to_string(),
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "JPY" => "¥".to_string(),
        other => format!("{} ", other),
    }
}

/// Round to two places and group thousands, e.g. `1234567.891` -> `1,234,567.89`
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, fraction)
}

/// Amount prefixed with the currency symbol
pub fn format_money(value: Decimal, currency: &str) -> String {
    format!("{}{}", currency_symbol(currency), format_amount(value))
}

/// Display-ready view of a [`SizingResult`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizingReport {
    pub lot_size: String,
    pub pip_value: String,
    pub potential_profit: String,
    pub potential_loss: String,
    pub risk_amount: String,
}

impl SizingReport {
    pub fn new(result: &SizingResult, local_currency: &str) -> Self {
        Self {
            lot_size: format!(
                "{:.2}",
                result
                    .lot_size
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            ),
            pip_value: format_money(result.pip_value_local, local_currency),
            potential_profit: result
                .potential_profit_local
                .map(|profit| format_money(profit, local_currency))
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            potential_loss: format_money(result.potential_loss_local, local_currency),
            risk_amount: format_money(result.risk_amount_local, local_currency),
        }
    }
}

impl fmt::Display for SizingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Lot size:         {}", self.lot_size)?;
        writeln!(f, "Pip value:        {}", self.pip_value)?;
        writeln!(f, "Potential profit: {}", self.potential_profit)?;
        writeln!(f, "Potential loss:   {}", self.potential_loss)?;
        write!(f, "Risk amount:      {}", self.risk_amount)
    }
}
