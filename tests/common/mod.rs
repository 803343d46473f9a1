//! Common test utilities and fixtures

#![allow(dead_code)]

use lot_size_calculator::config::types::RatePolicyConfig;
use lot_size_calculator::{
    ExchangeRateRestClient, LotSizeService, ManualClock, PairCatalog, RateCache, RateResolver,
    TradeForm,
};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// API key used in mocked request paths
pub const TEST_API_KEY: &str = "test-key";

/// Create a REST client pointed at a mock server
pub fn client_for(server: &MockServer) -> ExchangeRateRestClient {
    ExchangeRateRestClient::new(&server.uri(), Some(TEST_API_KEY.to_string()))
        .expect("Failed to create REST client")
}

/// Resolver over an in-memory cache and a manual clock
pub fn resolver_for(server: &MockServer, clock: Arc<ManualClock>) -> RateResolver {
    RateResolver::new(
        Arc::new(client_for(server)),
        RateCache::in_memory(),
        RatePolicyConfig::default(),
    )
    .with_clock(clock)
}

/// Service wired to a mock server
pub fn service_for(server: &MockServer, clock: Arc<ManualClock>) -> LotSizeService {
    LotSizeService::new(Arc::new(resolver_for(server, clock)), PairCatalog::standard())
}

/// Form for the reference EURUSD example: 2% of 1,000,000, 50 pip stop, 100 pip target
pub fn eurusd_form() -> TradeForm {
    TradeForm::new()
        .pair("EURUSD")
        .balance("1000000")
        .risk_amount("2")
        .risk_type("percentage")
        .entry_price("1.1000")
        .stop_loss("1.0950")
        .take_profit("1.1100")
}

/// Mount a `latest/{base}` response
pub async fn mount_latest(server: &MockServer, base: &str, body: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/latest/{}", TEST_API_KEY, base)))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json"))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mount a `pair/{from}/{to}` response
pub async fn mount_pair(server: &MockServer, from: &str, to: &str, body: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/pair/{}/{}", TEST_API_KEY, from, to)))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json"))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Sample API responses for testing
pub mod api_responses {
    /// USD conversion table with NGN at 1650
    pub const LATEST_USD: &str = r#"{
        "result": "success",
        "base_code": "USD",
        "time_last_update_unix": 1704067201,
        "conversion_rates": {"USD": 1, "NGN": 1650, "EUR": 0.9123, "JPY": 150.12}
    }"#;

    /// JPY to USD pair conversion
    pub const PAIR_JPY_USD: &str = r#"{
        "result": "success",
        "base_code": "JPY",
        "target_code": "USD",
        "conversion_rate": 0.0067
    }"#;

    /// GBP to USD pair conversion
    pub const PAIR_GBP_USD: &str = r#"{
        "result": "success",
        "base_code": "GBP",
        "target_code": "USD",
        "conversion_rate": 1.25
    }"#;

    /// Error body for a bad key
    pub const INVALID_KEY: &str = r#"{"result": "error", "error-type": "invalid-key"}"#;

    /// Conversion table missing the local currency
    pub const LATEST_WITHOUT_NGN: &str = r#"{
        "result": "success",
        "base_code": "USD",
        "conversion_rates": {"USD": 1, "EUR": 0.9123}
    }"#;
}
