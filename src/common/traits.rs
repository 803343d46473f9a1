//! Trait definitions for the rate resolver's collaborators

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::errors::Result;

/// Trait for exchange rate sources (HTTP APIs, fixtures, etc.)
///
/// Implementations report failures as errors. Substituting fallback
/// values is the resolver's job, not the provider's.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Value of one unit of `base` expressed in `target`, taken from the
    /// provider's latest rate table for `base`
    async fn latest_rate(&self, base: &str, target: &str) -> Result<Decimal>;

    /// Conversion rate for the `from`/`to` pair
    async fn pair_rate(&self, from: &str, to: &str) -> Result<Decimal>;

    /// Name of the provider, for logs
    fn provider_name(&self) -> &'static str;
}

/// String key/value storage backing the rate cache
///
/// Mirrors a browser-style local storage: values are stringified numbers
/// and there is no schema versioning.
pub trait RateStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, overwriting any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove every stored entry
    fn clear(&self) -> Result<()>;
}

/// Source of the current time in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall clock backed by chrono
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: std::sync::atomic::AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: std::sync::atomic::AtomicI64::new(start_millis),
        }
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(std::sync::atomic::Ordering::SeqCst)
    }
}
