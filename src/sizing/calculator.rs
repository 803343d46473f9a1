use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use super::validation::messages;
use crate::common::errors::{CalcError, Result};
use crate::common::types::{
    CurrencyPair, FormField, RateQuote, RiskMode, SizingResult, TradeRequest, ValidationErrors,
    STANDARD_LOT_UNITS,
};

/// USD pip value of one standard lot on a USD-quoted pair
pub const USD_QUOTED_PIP_VALUE: Decimal = dec!(10);

/// Position sizing arithmetic
///
/// Every function here is pure: the same request and rates always give
/// the same result, and nothing is cached between calls. All arithmetic is
/// checked, so out-of-range inputs surface as [`CalcError::Overflow`].
pub struct PositionSizer;

impl PositionSizer {
    /// Risk budget in local currency
    ///
    /// # Errors
    /// `RiskExceedsBalance` if the budget is larger than the balance
    pub fn risk_amount_local(
        balance: Decimal,
        risk_amount: Decimal,
        risk_mode: RiskMode,
    ) -> Result<Decimal> {
        let risk = match risk_mode {
            RiskMode::Percentage => checked(
                (risk_amount / dec!(100)).checked_mul(balance),
                "risk amount",
            )?,
            RiskMode::Absolute => risk_amount,
        };

        if risk > balance {
            return Err(CalcError::RiskExceedsBalance { risk, balance });
        }
        Ok(risk)
    }

    /// Distance between two prices in pips (order does not matter)
    pub fn pip_distance(from: Decimal, to: Decimal, pip_size: Decimal) -> Result<Decimal> {
        let diff = checked(from.checked_sub(to), "price difference")?;
        checked(diff.abs().checked_div(pip_size), "pip distance")
    }

    /// Pip value of one standard lot, in the pair's quote currency
    pub fn pip_value_quote(pair: &CurrencyPair) -> Decimal {
        STANDARD_LOT_UNITS * pair.pip_size()
    }

    /// Pip value of one standard lot in USD
    ///
    /// USD-quoted pairs always return exactly 10. Otherwise the quote-currency
    /// pip value is divided by the entry price and converted with
    /// `to_usd_rate`; a zero rate is treated as 1.
    pub fn pip_value_per_lot_usd(
        pair: &CurrencyPair,
        entry_price: Decimal,
        to_usd_rate: Decimal,
    ) -> Result<Decimal> {
        if pair.is_quoted_in_anchor() {
            return Ok(USD_QUOTED_PIP_VALUE);
        }

        let to_usd = if to_usd_rate.is_zero() {
            Decimal::ONE
        } else {
            to_usd_rate
        };

        let per_unit = checked(
            Self::pip_value_quote(pair).checked_div(entry_price),
            "quote pip value",
        )?;
        checked(per_unit.checked_mul(to_usd), "USD pip value")
    }

    /// Rate-independent checks: preconditions, risk budget and stop distance.
    ///
    /// Returns the risk budget and stop distance in pips.
    pub fn check_request(request: &TradeRequest) -> Result<(Decimal, Decimal)> {
        check_preconditions(request)?;

        let risk_amount_local =
            Self::risk_amount_local(request.balance, request.risk_amount, request.risk_mode)?;

        let stop_loss_pips =
            Self::pip_distance(request.entry_price, request.stop_loss, request.pair.pip_size())?;
        if stop_loss_pips.is_zero() {
            return Err(CalcError::ZeroPipDistance);
        }

        Ok((risk_amount_local, stop_loss_pips))
    }

    /// Run the full sizing calculation
    pub fn compute(
        request: &TradeRequest,
        local_rate: &RateQuote,
        to_usd_rate: &RateQuote,
    ) -> Result<SizingResult> {
        let (risk_amount_local, stop_loss_pips) = Self::check_request(request)?;

        let pip_size = request.pair.pip_size();
        let take_profit_pips = match request.target() {
            Some(tp) => Self::pip_distance(tp, request.entry_price, pip_size)?,
            None => Decimal::ZERO,
        };

        let pip_value_per_lot_usd =
            Self::pip_value_per_lot_usd(&request.pair, request.entry_price, to_usd_rate.rate_value)?;
        let pip_value_per_lot_local = checked(
            pip_value_per_lot_usd.checked_mul(local_rate.rate_value),
            "local pip value",
        )?;

        let risk_per_lot = checked(
            stop_loss_pips.checked_mul(pip_value_per_lot_local),
            "risk per lot",
        )?;
        let lot_size = risk_amount_local.checked_div(risk_per_lot).ok_or_else(|| {
            CalcError::Internal(format!(
                "pip value per lot is {} {}, cannot size position",
                pip_value_per_lot_local, local_rate.currency_code
            ))
        })?;

        let pip_value_local = checked(lot_size.checked_mul(pip_value_per_lot_local), "pip value")?;
        let potential_loss_local =
            checked(pip_value_local.checked_mul(stop_loss_pips), "potential loss")?;
        let potential_profit_local = if take_profit_pips > Decimal::ZERO {
            Some(checked(
                pip_value_local.checked_mul(take_profit_pips),
                "potential profit",
            )?)
        } else {
            None
        };

        debug!(
            %stop_loss_pips,
            %take_profit_pips,
            %pip_value_per_lot_usd,
            %pip_value_per_lot_local,
            %lot_size,
            %pip_value_local,
            %potential_loss_local,
            "Calculated position size for {}",
            request.pair.symbol
        );

        Ok(SizingResult {
            lot_size,
            pip_value_local,
            pip_value_per_lot_local,
            pip_value_per_lot_usd,
            potential_profit_local,
            potential_loss_local,
            risk_amount_local,
            stop_loss_pips,
            take_profit_pips,
            pip_size,
        })
    }
}

fn checked(value: Option<Decimal>, what: &'static str) -> Result<Decimal> {
    value.ok_or(CalcError::Overflow(what))
}

/// Size a position from a validated request and its resolved rates
pub fn compute_sizing(
    request: &TradeRequest,
    local_rate: &RateQuote,
    to_usd_rate: &RateQuote,
) -> Result<SizingResult> {
    PositionSizer::compute(request, local_rate, to_usd_rate)
}

/// Inputs the arithmetic cannot work with. Entry equal to stop is left to
/// the pip distance check.
fn check_preconditions(request: &TradeRequest) -> Result<()> {
    let mut errors = ValidationErrors::new();

    if request.balance <= Decimal::ZERO {
        errors.insert(FormField::Balance, messages::BALANCE);
    }
    if request.risk_amount <= Decimal::ZERO {
        errors.insert(FormField::RiskAmount, messages::RISK_AMOUNT);
    } else if request.risk_mode == RiskMode::Percentage && request.risk_amount >= dec!(100) {
        errors.insert(FormField::RiskAmount, messages::RISK_PERCENTAGE);
    }
    if request.entry_price <= Decimal::ZERO {
        errors.insert(FormField::EntryPrice, messages::ENTRY_PRICE);
    }
    if request.stop_loss <= Decimal::ZERO {
        errors.insert(FormField::StopLoss, messages::STOP_LOSS);
    }
    if request.take_profit.is_some_and(|tp| tp < Decimal::ZERO) {
        errors.insert(FormField::TakeProfit, messages::TAKE_PROFIT);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CalcError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{RateKind, RateSource};
    use pretty_assertions::assert_eq;

    fn local(rate: Decimal) -> RateQuote {
        RateQuote::new("USD", RateKind::Local, rate, 0, RateSource::Live)
    }

    fn to_usd(currency: &str, rate: Decimal) -> RateQuote {
        RateQuote::new(currency, RateKind::ToUsd, rate, 0, RateSource::Live)
    }

    // Division rounds at 28 digits, so compare scaled results with a tolerance
    fn assert_close(actual: Decimal, expected: Decimal) {
        assert!(
            (actual - expected).abs() < dec!(0.000000000001),
            "{} != {}",
            actual,
            expected
        );
    }

    fn eurusd_request() -> TradeRequest {
        TradeRequest {
            balance: dec!(1000000),
            risk_amount: dec!(2),
            risk_mode: RiskMode::Percentage,
            entry_price: dec!(1.1000),
            stop_loss: dec!(1.0950),
            take_profit: Some(dec!(1.1100)),
            pair: CurrencyPair::new("EUR", "USD", 4),
        }
    }

    #[test]
    fn test_worked_example_eurusd_in_naira() {
        let result =
            compute_sizing(&eurusd_request(), &local(dec!(1650)), &to_usd("USD", dec!(1))).unwrap();

        assert_eq!(result.risk_amount_local, dec!(20000));
        assert_eq!(result.pip_size, dec!(0.0001));
        assert_eq!(result.stop_loss_pips, dec!(50));
        assert_eq!(result.take_profit_pips, dec!(100));
        assert_eq!(result.pip_value_per_lot_usd, dec!(10));
        assert_eq!(result.pip_value_per_lot_local, dec!(16500));
        assert_eq!(result.lot_size.round_dp(4), dec!(0.0242));
        assert_eq!(result.pip_value_local.round_dp(2), dec!(400.00));
        assert_eq!(result.potential_loss_local.round_dp(2), dec!(20000.00));
        assert_eq!(
            result.potential_profit_local.map(|p| p.round_dp(2)),
            Some(dec!(40000.00))
        );
    }

    #[test]
    fn test_usd_quote_pip_value_ignores_entry_price() {
        let pair = CurrencyPair::new("GBP", "USD", 4);
        for entry in [dec!(0.5), dec!(1.2731), dec!(150.25)] {
            assert_eq!(
                PositionSizer::pip_value_per_lot_usd(&pair, entry, dec!(0.37)).unwrap(),
                dec!(10)
            );
        }
    }

    #[test]
    fn test_non_usd_quote_uses_conversion_chain() {
        // USDJPY at 150.00: 100000 * 0.01 = 1000 JPY per pip, / 150 * 1.0 rate
        let pair = CurrencyPair::new("USD", "JPY", 2);
        let per_lot = PositionSizer::pip_value_per_lot_usd(&pair, dec!(150), dec!(1)).unwrap();
        assert_eq!(per_lot.round_dp(6), dec!(6.666667));

        // EURGBP at 0.8500 with GBP->USD 1.25
        let pair = CurrencyPair::new("EUR", "GBP", 4);
        let per_lot = PositionSizer::pip_value_per_lot_usd(&pair, dec!(0.85), dec!(1.25)).unwrap();
        assert_eq!(per_lot.round_dp(6), dec!(14.705882));
    }

    #[test]
    fn test_zero_to_usd_rate_treated_as_one() {
        let pair = CurrencyPair::new("EUR", "JPY", 2);
        let zero = PositionSizer::pip_value_per_lot_usd(&pair, dec!(160), Decimal::ZERO).unwrap();
        let one = PositionSizer::pip_value_per_lot_usd(&pair, dec!(160), Decimal::ONE).unwrap();
        assert_eq!(zero, one);
    }

    #[test]
    fn test_lot_size_scales_with_risk() {
        let mut request = eurusd_request();
        let base = compute_sizing(&request, &local(dec!(1650)), &to_usd("USD", dec!(1))).unwrap();

        request.risk_amount = dec!(4);
        let doubled = compute_sizing(&request, &local(dec!(1650)), &to_usd("USD", dec!(1))).unwrap();
        assert_close(doubled.lot_size, base.lot_size * dec!(2));

        request.risk_mode = RiskMode::Absolute;
        request.risk_amount = dec!(10000);
        let absolute = compute_sizing(&request, &local(dec!(1650)), &to_usd("USD", dec!(1))).unwrap();
        request.risk_amount = dec!(20000);
        let absolute_doubled =
            compute_sizing(&request, &local(dec!(1650)), &to_usd("USD", dec!(1))).unwrap();
        assert_close(absolute_doubled.lot_size, absolute.lot_size * dec!(2));
    }

    #[test]
    fn test_pip_distance_is_symmetric() {
        let a = PositionSizer::pip_distance(dec!(1.1000), dec!(1.0950), dec!(0.0001)).unwrap();
        let b = PositionSizer::pip_distance(dec!(1.0950), dec!(1.1000), dec!(0.0001)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, dec!(50));
    }

    #[test]
    fn test_entry_equal_to_stop_is_zero_pip_distance() {
        let mut request = eurusd_request();
        request.stop_loss = request.entry_price;

        let result = compute_sizing(&request, &local(dec!(1650)), &to_usd("USD", dec!(1)));
        assert!(matches!(result, Err(CalcError::ZeroPipDistance)));
    }

    #[test]
    fn test_absolute_risk_above_balance_rejected() {
        let mut request = eurusd_request();
        request.risk_mode = RiskMode::Absolute;
        request.risk_amount = dec!(1000001);

        let result = compute_sizing(&request, &local(dec!(1650)), &to_usd("USD", dec!(1)));
        match result {
            Err(CalcError::RiskExceedsBalance { risk, balance }) => {
                assert_eq!(risk, dec!(1000001));
                assert_eq!(balance, dec!(1000000));
            }
            other => panic!("expected RiskExceedsBalance, got {:?}", other),
        }
    }

    #[test]
    fn test_no_target_means_no_profit() {
        let mut request = eurusd_request();
        request.take_profit = None;
        let result = compute_sizing(&request, &local(dec!(1650)), &to_usd("USD", dec!(1))).unwrap();
        assert_eq!(result.take_profit_pips, Decimal::ZERO);
        assert_eq!(result.potential_profit_local, None);

        request.take_profit = Some(Decimal::ZERO);
        let result = compute_sizing(&request, &local(dec!(1650)), &to_usd("USD", dec!(1))).unwrap();
        assert_eq!(result.potential_profit_local, None);
    }

    #[test]
    fn test_preconditions_rechecked() {
        let mut request = eurusd_request();
        request.risk_amount = dec!(100);
        request.balance = Decimal::ZERO;

        let result = compute_sizing(&request, &local(dec!(1650)), &to_usd("USD", dec!(1)));
        match result {
            Err(CalcError::Validation(errors)) => {
                assert_eq!(errors.get(FormField::Balance), Some(messages::BALANCE));
                assert_eq!(errors.get(FormField::RiskAmount), Some(messages::RISK_PERCENTAGE));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_local_rate_does_not_panic() {
        let result = compute_sizing(&eurusd_request(), &local(Decimal::ZERO), &to_usd("USD", dec!(1)));
        assert!(matches!(result, Err(CalcError::Internal(_))));
    }

    #[test]
    fn test_huge_entry_price_overflows_into_error() {
        let request = crate::sizing::TradeForm::new()
            .pair("EURUSD")
            .balance("1000000")
            .risk_amount("2")
            .entry_price("10000000000000000000000000")
            .stop_loss("1")
            .validate(&crate::common::types::PairCatalog::standard())
            .unwrap();

        let result = compute_sizing(&request, &local(dec!(1650)), &to_usd("USD", dec!(1)));
        assert!(matches!(result, Err(CalcError::Overflow("pip distance"))), "{:?}", result);
    }

    #[test]
    fn test_huge_local_rate_overflows_into_error() {
        let mut request = eurusd_request();
        request.balance = Decimal::MAX;
        request.risk_mode = RiskMode::Absolute;
        request.risk_amount = dec!(1);

        let result = compute_sizing(&request, &local(Decimal::MAX), &to_usd("USD", dec!(1)));
        assert!(matches!(result, Err(CalcError::Overflow(_))), "{:?}", result);
    }
}
