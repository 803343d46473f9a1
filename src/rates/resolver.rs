//! Rate resolver: cache-first lookups with fallback substitution

use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

use super::cache::RateCache;
use crate::common::traits::{Clock, RateProvider, SystemClock};
use crate::common::types::{RateKind, RateQuote, RateSource, RateWarning, ANCHOR_CURRENCY};
use crate::config::types::RatePolicyConfig;

/// Resolves local-currency and to-USD rates for the position sizer.
///
/// Lookups never fail: a fresh cache entry is served without I/O, a miss
/// goes to the provider, and a provider failure is replaced by the
/// configured fallback constant plus a [`RateWarning`].
pub struct RateResolver {
    provider: Arc<dyn RateProvider>,
    cache: RateCache,
    clock: Arc<dyn Clock>,
    policy: RatePolicyConfig,
    warnings: Option<mpsc::Sender<RateWarning>>,
}

impl RateResolver {
    /// Create a resolver using the system clock
    pub fn new(provider: Arc<dyn RateProvider>, cache: RateCache, policy: RatePolicyConfig) -> Self {
        let policy = RatePolicyConfig {
            local_currency: policy.local_currency.trim().to_uppercase(),
            ..policy
        };

        Self {
            provider,
            cache,
            clock: Arc::new(SystemClock),
            policy,
            warnings: None,
        }
    }

    /// Replace the clock used for freshness checks and timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Publish fallback advisories on `sender`
    pub fn with_warning_channel(mut self, sender: mpsc::Sender<RateWarning>) -> Self {
        self.warnings = Some(sender);
        self
    }

    pub fn local_currency(&self) -> &str {
        &self.policy.local_currency
    }

    /// Currency pip values are normalised into before local conversion
    pub fn anchor_currency(&self) -> &'static str {
        ANCHOR_CURRENCY
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }

    pub fn policy(&self) -> &RatePolicyConfig {
        &self.policy
    }

    /// Local currency units per one unit of `currency`
    #[instrument(skip(self))]
    pub async fn resolve_local_rate(&self, currency: &str) -> RateQuote {
        self.resolve(RateKind::Local, currency).await
    }

    /// USD per one unit of `currency`
    #[instrument(skip(self))]
    pub async fn resolve_to_usd(&self, currency: &str) -> RateQuote {
        self.resolve(RateKind::ToUsd, currency).await
    }

    async fn resolve(&self, kind: RateKind, currency: &str) -> RateQuote {
        let currency = currency.trim().to_uppercase();
        let target = self.target_currency(kind).to_string();
        let now = self.clock.now_millis();

        if currency == target {
            return RateQuote::new(currency, kind, Decimal::ONE, now, RateSource::Identity);
        }

        if let Some(cached) = self
            .cache
            .get_fresh(kind, &currency, now, self.policy.freshness_ms)
        {
            debug!(
                "Cache hit for {}/{} ({}): {}",
                currency, target, kind, cached.rate_value
            );
            return cached;
        }

        let fetched = match kind {
            RateKind::Local => self.provider.latest_rate(&currency, &target).await,
            RateKind::ToUsd => self.provider.pair_rate(&currency, &target).await,
        };

        match fetched {
            Ok(rate) if rate > Decimal::ZERO => {
                debug!(
                    "Fetched {}/{} rate from {}: {}",
                    currency,
                    target,
                    self.provider.provider_name(),
                    rate
                );
                let quote = RateQuote::new(currency, kind, rate, now, RateSource::Live);
                if let Err(e) = self.cache.set(&quote) {
                    warn!("Failed to cache {}/{} rate: {}", quote.currency_code, target, e);
                }
                quote
            }
            Ok(rate) => self.fallback(kind, currency, now, format!("non-positive rate {}", rate)),
            Err(e) => self.fallback(kind, currency, now, e.to_string()),
        }
    }

    fn target_currency(&self, kind: RateKind) -> &str {
        match kind {
            RateKind::Local => self.policy.local_currency.as_str(),
            RateKind::ToUsd => ANCHOR_CURRENCY,
        }
    }

    fn fallback_value(&self, kind: RateKind) -> Decimal {
        match kind {
            RateKind::Local => self.policy.fallback_local_rate,
            RateKind::ToUsd => self.policy.fallback_usd_rate,
        }
    }

    fn fallback(&self, kind: RateKind, currency: String, now: i64, reason: String) -> RateQuote {
        let quote = RateQuote::new(
            currency,
            kind,
            self.fallback_value(kind),
            now,
            RateSource::Fallback { reason },
        );

        if let Some(warning) = self.warning_for(&quote) {
            warn!("{} Cause: {}", warning.message(), warning.reason);
            if let Some(sender) = &self.warnings {
                if let Err(e) = sender.try_send(warning) {
                    debug!("Dropped rate warning: {}", e);
                }
            }
        }

        quote
    }

    /// Advisory for a quote that fell back to a constant, `None` otherwise
    pub fn warning_for(&self, quote: &RateQuote) -> Option<RateWarning> {
        match &quote.source {
            RateSource::Fallback { reason } => Some(RateWarning {
                kind: quote.kind,
                currency_code: quote.currency_code.clone(),
                target_currency: self.target_currency(quote.kind).to_string(),
                fallback_value: quote.rate_value,
                reason: reason.clone(),
            }),
            _ => None,
        }
    }
}

impl std::fmt::Debug for RateResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateResolver")
            .field("provider", &self.provider.provider_name())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
