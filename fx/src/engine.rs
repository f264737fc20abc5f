//! Main FX engine implementation.

use std::sync::Arc;

use currex_common::{CurrencyCode, CurrencyPair};
use tracing::{debug, info, instrument};

use crate::conversion::{exact_product, Conversion, ResolvedRate};
use crate::error::{FxError, FxResult};
use crate::store::{CurrencyStore, ExchangeRateStore};
use crate::validation::{ExchangeQuery, ExchangeRequest};

/// Configuration for the FX engine.
#[derive(Debug, Clone)]
pub struct FxEngineConfig {
    /// Reference currency used to compose rates for unquoted pairs.
    pub pivot_currency: CurrencyCode,
    /// Fractional digits kept on inverted and composed rates.
    pub derived_rate_scale: u32,
}

impl Default for FxEngineConfig {
    fn default() -> Self {
        Self {
            pivot_currency: CurrencyCode::usd(),
            derived_rate_scale: 6,
        }
    }
}

/// The main FX engine.
///
/// Owns no mutable state of its own; every operation reads or writes through
/// the stores, so one engine can serve concurrent requests.
pub struct FxEngine {
    pub(crate) currencies: Arc<dyn CurrencyStore>,
    pub(crate) rates: Arc<dyn ExchangeRateStore>,
    config: FxEngineConfig,
}

impl FxEngine {
    /// Create a new FX engine over the given stores.
    pub fn new(
        currencies: Arc<dyn CurrencyStore>,
        rates: Arc<dyn ExchangeRateStore>,
        config: FxEngineConfig,
    ) -> Self {
        Self {
            currencies,
            rates,
            config,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &FxEngineConfig {
        &self.config
    }

    /// Validate a conversion request and convert its amount.
    #[instrument(skip(self, request), fields(base = ?request.base, target = ?request.target))]
    pub async fn resolve(&self, request: ExchangeRequest<'_>) -> FxResult<Conversion> {
        let query = request.validate()?;
        self.convert(&query).await
    }

    /// Convert a validated amount.
    pub async fn convert(&self, query: &ExchangeQuery) -> FxResult<Conversion> {
        let rate = self.resolve_rate(&query.pair).await?;

        let converted_amount = exact_product(rate.rate, query.amount)
            .ok_or_else(|| FxError::AmountOverflow(query.pair.clone()))?;

        let conversion = Conversion {
            rate,
            amount: query.amount,
            converted_amount,
        };

        info!(
            pair = %query.pair,
            source = ?conversion.rate.source,
            effective_rate = %conversion.effective_rate(),
            "Conversion completed"
        );

        Ok(conversion)
    }

    /// Find the rate for `pair`: direct quote, then inverse quote, then
    /// composition through the pivot currency. The first match wins.
    #[instrument(skip(self), fields(pair = %pair))]
    pub async fn resolve_rate(&self, pair: &CurrencyPair) -> FxResult<ResolvedRate> {
        let scale = self.config.derived_rate_scale;

        if let Some(quote) = self.rates.find_rate(pair).await? {
            debug!("Using direct quote");
            return Ok(ResolvedRate::direct(&quote));
        }

        if let Some(quote) = self.rates.find_rate(&pair.inverse()).await? {
            if let Some(derived) = ResolvedRate::inverse(&quote, scale) {
                debug!(quoted = %quote.rate, "Using inverted quote");
                return Ok(derived);
            }
        }

        let pivot = &self.config.pivot_currency;
        let base_leg = CurrencyPair::new(pivot.clone(), pair.base.clone());
        if let Some(base_quote) = self.rates.find_rate(&base_leg).await? {
            let target_leg = CurrencyPair::new(pivot.clone(), pair.target.clone());
            if let Some(target_quote) = self.rates.find_rate(&target_leg).await? {
                if let Some(derived) = ResolvedRate::pivot(&base_quote, &target_quote, scale) {
                    debug!(via = %pivot, "Using pivot composition");
                    return Ok(derived);
                }
            }
        }

        debug!("No conversion path");
        Err(FxError::RateNotFound(pair.clone()))
    }
}
