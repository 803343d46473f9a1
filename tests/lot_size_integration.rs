//! End-to-end tests: form → rate resolution over HTTP → sizing → report
//!
//! The exchange API is served by wiremock; call-count expectations are
//! verified when each MockServer is dropped.

mod common;

use common::api_responses;
use common::{eurusd_form, mount_latest, mount_pair, resolver_for, service_for};
use lot_size_calculator::common::channels::{create_warning_channel, drain_warnings};
use lot_size_calculator::sizing::{messages, NOT_APPLICABLE};
use lot_size_calculator::{
    CalcError, FormField, ManualClock, PairCatalog, RateKind, RateSource, SizingReport,
};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use std::sync::Arc;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOUR_MS: i64 = 3_600_000;

// ============================================================================
// Worked Example
// ============================================================================

#[tokio::test]
async fn test_eurusd_reference_example() {
    let server = MockServer::start().await;
    mount_latest(&server, "USD", api_responses::LATEST_USD, 1).await;
    let service = service_for(&server, Arc::new(ManualClock::new(0)));

    let request = eurusd_form().validate(service.pairs()).unwrap();
    let outcome = service.calculate(&request).await.unwrap();
    let result = &outcome.result;

    assert_eq!(outcome.local_rate.source, RateSource::Live);
    assert_eq!(outcome.to_usd_rate.source, RateSource::Identity);
    assert!(outcome.warnings.is_empty());

    assert_eq!(result.risk_amount_local, dec!(20000));
    assert_eq!(result.stop_loss_pips, dec!(50));
    assert_eq!(result.pip_value_per_lot_usd, dec!(10));
    assert_eq!(result.pip_value_per_lot_local, dec!(16500));
    assert_eq!(result.lot_size.round_dp(4), dec!(0.0242));

    let report = SizingReport::new(result, "NGN");
    assert_eq!(report.lot_size, "0.02");
    assert_eq!(report.potential_loss, "₦20,000.00");
    assert_eq!(report.potential_profit, "₦40,000.00");
    assert_eq!(report.risk_amount, "₦20,000.00");
}

#[tokio::test]
async fn test_jpy_quoted_pair_uses_both_rates() {
    let server = MockServer::start().await;
    mount_latest(&server, "USD", api_responses::LATEST_USD, 1).await;
    mount_pair(&server, "JPY", "USD", api_responses::PAIR_JPY_USD, 1).await;
    let service = service_for(&server, Arc::new(ManualClock::new(0)));

    let request = eurusd_form()
        .pair("USDJPY")
        .entry_price("150.00")
        .stop_loss("149.50")
        .take_profit("")
        .validate(service.pairs())
        .unwrap();
    let outcome = service.calculate(&request).await.unwrap();

    // 100000 * 0.01 / 150 * 0.0067 USD per pip per lot
    assert_eq!(outcome.to_usd_rate.rate_value, dec!(0.0067));
    assert_eq!(outcome.result.pip_value_per_lot_usd.round_dp(6), dec!(0.044667));
    assert_eq!(outcome.result.stop_loss_pips, dec!(50));
    assert_eq!(outcome.result.potential_profit_local, None);
    assert_eq!(
        SizingReport::new(&outcome.result, "NGN").potential_profit,
        NOT_APPLICABLE
    );
}

// ============================================================================
// Cache Policy
// ============================================================================

#[tokio::test]
async fn test_second_calculation_within_hour_is_served_from_cache() {
    let server = MockServer::start().await;
    mount_latest(&server, "USD", api_responses::LATEST_USD, 1).await;
    mount_pair(&server, "GBP", "USD", api_responses::PAIR_GBP_USD, 1).await;
    let clock = Arc::new(ManualClock::new(1_000));
    let service = service_for(&server, clock.clone());

    let request = eurusd_form()
        .pair("EURGBP")
        .entry_price("0.8500")
        .stop_loss("0.8450")
        .validate(service.pairs())
        .unwrap();

    let first = service.calculate(&request).await.unwrap();
    clock.advance(HOUR_MS - 1);
    let second = service.calculate(&request).await.unwrap();

    assert_eq!(first.local_rate.source, RateSource::Live);
    assert_eq!(second.local_rate.source, RateSource::Cached);
    assert_eq!(second.to_usd_rate.source, RateSource::Cached);
    assert_eq!(first.result, second.result);
}

#[tokio::test]
async fn test_refetch_after_freshness_window() {
    let server = MockServer::start().await;
    mount_latest(&server, "USD", api_responses::LATEST_USD, 2).await;
    let clock = Arc::new(ManualClock::new(0));
    let resolver = resolver_for(&server, clock.clone());

    let first = resolver.resolve_local_rate("USD").await;
    clock.set(HOUR_MS + 1);
    let second = resolver.resolve_local_rate("USD").await;

    assert_eq!(first.source, RateSource::Live);
    assert_eq!(second.source, RateSource::Live);
    assert_eq!(second.fetched_at_epoch_millis, HOUR_MS + 1);
    assert_eq!(
        resolver.cache().timestamp(RateKind::Local, "USD"),
        Some(HOUR_MS + 1)
    );
}

// ============================================================================
// Fallback Policy
// ============================================================================

#[tokio::test]
async fn test_provider_outage_degrades_to_fallback_rates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(2)
        .mount(&server)
        .await;
    let (tx, mut rx) = create_warning_channel();
    let resolver = resolver_for(&server, Arc::new(ManualClock::new(0))).with_warning_channel(tx);
    let service = lot_size_calculator::LotSizeService::new(Arc::new(resolver), PairCatalog::standard());

    let request = eurusd_form()
        .pair("GBPJPY")
        .entry_price("190.00")
        .stop_loss("189.00")
        .validate(service.pairs())
        .unwrap();
    let outcome = service.calculate(&request).await.expect("fallback keeps sizing alive");

    assert_eq!(outcome.local_rate.rate_value, dec!(1650));
    assert_eq!(outcome.to_usd_rate.rate_value, dec!(1));
    assert!(outcome.local_rate.source.is_fallback());
    assert!(outcome.to_usd_rate.source.is_fallback());
    assert_eq!(outcome.warnings.len(), 2);

    let published = drain_warnings(&mut rx);
    assert_eq!(published.len(), 2);
    let messages: Vec<String> = published.iter().map(|w| w.message()).collect();
    assert!(messages.contains(
        &"Failed to fetch USD/NGN rate. Using fallback rate (1650 NGN/USD).".to_string()
    ));
    assert!(messages.contains(&"Failed to fetch JPY/USD rate. Using fallback rate (1).".to_string()));

    // Nothing from a failed fetch is cached
    assert!(service.resolver().cache().get(RateKind::Local, "USD").is_none());
    assert!(service.resolver().cache().get(RateKind::ToUsd, "JPY").is_none());
}

// ============================================================================
// Business Rules
// ============================================================================

#[tokio::test]
async fn test_percentage_of_100_never_reaches_sizer() {
    let errors = eurusd_form()
        .risk_amount("100")
        .validate(&PairCatalog::standard())
        .unwrap_err();
    assert_eq!(errors.get(FormField::RiskAmount), Some(messages::RISK_PERCENTAGE));
}

#[tokio::test]
async fn test_absolute_risk_above_balance_makes_no_rate_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let service = service_for(&server, Arc::new(ManualClock::new(0)));

    let request = eurusd_form()
        .risk_type("absolute")
        .risk_amount("2000000")
        .validate(service.pairs())
        .unwrap();

    let err = service.calculate(&request).await.unwrap_err();
    assert!(matches!(err, CalcError::RiskExceedsBalance { .. }));
    assert_eq!(err.field(), Some(FormField::RiskAmount));
    assert_eq!(err.field_message(), "Risk amount cannot exceed account balance");
}
