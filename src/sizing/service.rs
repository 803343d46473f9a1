//! Lot size service: resolves rates concurrently, then sizes the position

use std::sync::Arc;
use tracing::{info, instrument};

use super::calculator::{compute_sizing, PositionSizer};
use crate::common::errors::Result;
use crate::common::types::{CalculationOutcome, PairCatalog, RateWarning, TradeRequest};
use crate::rates::RateResolver;

/// Entry point for a single sizing calculation
#[derive(Debug, Clone)]
pub struct LotSizeService {
    resolver: Arc<RateResolver>,
    pairs: Arc<PairCatalog>,
}

impl LotSizeService {
    pub fn new(resolver: Arc<RateResolver>, pairs: PairCatalog) -> Self {
        Self {
            resolver,
            pairs: Arc::new(pairs),
        }
    }

    pub fn resolver(&self) -> &RateResolver {
        &self.resolver
    }

    pub fn pairs(&self) -> &PairCatalog {
        &self.pairs
    }

    /// Resolve both rates, then size the position.
    ///
    /// Rate failures never abort the calculation; they show up as
    /// fallback quotes and entries in `warnings`. Business-rule errors
    /// are returned before any rate is resolved.
    #[instrument(skip(self, request), fields(pair = %request.pair.symbol))]
    pub async fn calculate(&self, request: &TradeRequest) -> Result<CalculationOutcome> {
        PositionSizer::check_request(request)?;

        let anchor = self.resolver.anchor_currency();
        let (local_rate, to_usd_rate) = tokio::join!(
            self.resolver.resolve_local_rate(anchor),
            self.resolver.resolve_to_usd(&request.pair.quote)
        );

        let warnings: Vec<RateWarning> = [&local_rate, &to_usd_rate]
            .into_iter()
            .filter_map(|quote| self.resolver.warning_for(quote))
            .collect();

        let result = compute_sizing(request, &local_rate, &to_usd_rate)?;
        info!(
            "Lot size {} for {} ({} fallback rate(s))",
            result.lot_size.round_dp(4),
            request.pair.symbol,
            warnings.len()
        );

        Ok(CalculationOutcome {
            result,
            local_rate,
            to_usd_rate,
            warnings,
        })
    }
}
