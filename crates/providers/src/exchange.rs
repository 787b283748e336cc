//! Currency conversion collaborator.
//!
//! Rates are fetched as a USD-based table and cross-converted locally,
//! so one fetch serves every currency pair. The table is cached for a
//! short TTL; the primary source (open.er-api.com) falls back to
//! exchangerate.host when it fails.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::ProviderError;

/// How long a fetched rate table stays fresh.
pub const RATES_TTL: Duration = Duration::from_secs(5 * 60);

/// Map of ISO 4217 code to its rate against USD.
pub type RateTable = HashMap<String, f64>;

/// Source of a USD-based rate table.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn usd_rates(&self) -> Result<RateTable, ProviderError>;
}

/// Cross-convert `amount` from one currency to another through USD.
///
/// Deterministic given a fixed table; the result is rounded to whole
/// units of the target currency. Unknown codes are rejected.
pub fn cross_convert(
    amount: f64,
    from: &str,
    to: &str,
    rates: &RateTable,
) -> Result<i64, ProviderError> {
    let from_rate = rates
        .get(from)
        .copied()
        .filter(|r| *r > 0.0)
        .ok_or_else(|| ProviderError::Rejected(format!("no exchange rate for {from}")))?;
    let to_rate = rates
        .get(to)
        .copied()
        .filter(|r| *r > 0.0)
        .ok_or_else(|| ProviderError::Rejected(format!("no exchange rate for {to}")))?;

    let in_usd = amount / from_rate;
    Ok((in_usd * to_rate).round() as i64)
}

/// The pair rate `from -> to` derived from a USD table.
pub fn pair_rate(from: &str, to: &str, rates: &RateTable) -> Result<f64, ProviderError> {
    let from_rate = rates
        .get(from)
        .copied()
        .filter(|r| *r > 0.0)
        .ok_or_else(|| ProviderError::Rejected(format!("no exchange rate for {from}")))?;
    let to_rate = rates
        .get(to)
        .copied()
        .filter(|r| *r > 0.0)
        .ok_or_else(|| ProviderError::Rejected(format!("no exchange rate for {to}")))?;
    Ok(to_rate / from_rate)
}

/// Result of one conversion.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Conversion {
    pub from_currency: String,
    pub to_currency: String,
    pub from_amount: f64,
    pub to_amount: i64,
    pub exchange_rate: f64,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

/// Conversion collaborator seam used by the pipeline.
#[async_trait]
pub trait CurrencyConverter: Send + Sync {
    async fn convert(&self, amount: f64, from: &str, to: &str)
        -> Result<Conversion, ProviderError>;
    async fn rate(&self, from: &str, to: &str) -> Result<f64, ProviderError>;
}

// ---------------------------------------------------------------------------
// Live rate source
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ErApiResponse {
    result: String,
    rates: Option<RateTable>,
}

#[derive(Debug, Deserialize)]
struct ExchangerateHostResponse {
    rates: Option<RateTable>,
}

/// Free-tier rate source: open.er-api.com first, exchangerate.host as
/// fallback.
pub struct PublicRateSource {
    client: reqwest::Client,
    primary_url: String,
    fallback_url: String,
}

impl PublicRateSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            primary_url: "https://open.er-api.com/v6/latest/USD".into(),
            fallback_url: "https://api.exchangerate.host/latest?base=USD".into(),
        }
    }

    /// Override endpoints, for tests against a local server.
    pub fn with_urls(client: reqwest::Client, primary_url: String, fallback_url: String) -> Self {
        Self { client, primary_url, fallback_url }
    }

    async fn fetch_primary(&self) -> Result<RateTable, ProviderError> {
        let resp: ErApiResponse = self
            .client
            .get(&self.primary_url)
            .send()
            .await?
            .json()
            .await?;

        if resp.result == "success" {
            resp.rates.ok_or(ProviderError::Malformed {
                provider: "open.er-api",
                detail: "missing rates table".into(),
            })
        } else {
            Err(ProviderError::Malformed {
                provider: "open.er-api",
                detail: format!("result = {}", resp.result),
            })
        }
    }

    async fn fetch_fallback(&self) -> Result<RateTable, ProviderError> {
        let resp: ExchangerateHostResponse = self
            .client
            .get(&self.fallback_url)
            .send()
            .await?
            .json()
            .await?;

        resp.rates.ok_or(ProviderError::Malformed {
            provider: "exchangerate.host",
            detail: "missing rates table".into(),
        })
    }
}

#[async_trait]
impl RateSource for PublicRateSource {
    async fn usd_rates(&self) -> Result<RateTable, ProviderError> {
        match self.fetch_primary().await {
            Ok(rates) => Ok(rates),
            Err(primary_err) => {
                tracing::warn!(error = %primary_err, "primary FX source failed, trying fallback");
                self.fetch_fallback().await
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Caching converter
// ---------------------------------------------------------------------------

struct CachedRates {
    rates: RateTable,
    fetched_at: Instant,
}

/// [`CurrencyConverter`] over any [`RateSource`] with a TTL cache.
pub struct ExchangeService<S> {
    source: S,
    cache: RwLock<Option<CachedRates>>,
    ttl: Duration,
}

impl<S: RateSource> ExchangeService<S> {
    pub fn new(source: S) -> Self {
        Self { source, cache: RwLock::new(None), ttl: RATES_TTL }
    }

    #[cfg(test)]
    fn with_ttl(source: S, ttl: Duration) -> Self {
        Self { source, cache: RwLock::new(None), ttl }
    }

    async fn rates(&self) -> Result<RateTable, ProviderError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < self.ttl {
                    return Ok(cached.rates.clone());
                }
            }
        }

        let rates = self.source.usd_rates().await?;
        let mut cache = self.cache.write().await;
        *cache = Some(CachedRates { rates: rates.clone(), fetched_at: Instant::now() });
        Ok(rates)
    }
}

#[async_trait]
impl<S: RateSource> CurrencyConverter for ExchangeService<S> {
    async fn convert(
        &self,
        amount: f64,
        from: &str,
        to: &str,
    ) -> Result<Conversion, ProviderError> {
        let rates = self.rates().await?;
        let to_amount = cross_convert(amount, from, to, &rates)?;
        let exchange_rate = pair_rate(from, to, &rates)?;

        Ok(Conversion {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            from_amount: amount,
            to_amount,
            exchange_rate,
            last_updated: chrono::Utc::now(),
        })
    }

    async fn rate(&self, from: &str, to: &str) -> Result<f64, ProviderError> {
        let rates = self.rates().await?;
        pair_rate(from, to, &rates)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn table() -> RateTable {
        // 1 USD = 1350 KRW = 36 THB = 150 JPY.
        HashMap::from([
            ("USD".to_string(), 1.0),
            ("KRW".to_string(), 1_350.0),
            ("THB".to_string(), 36.0),
            ("JPY".to_string(), 150.0),
        ])
    }

    #[test]
    fn cross_convert_goes_through_usd() {
        // 1200 THB -> USD -> KRW = 1200 / 36 * 1350 = 45000.
        assert_eq!(cross_convert(1_200.0, "THB", "KRW", &table()).unwrap(), 45_000);
    }

    #[test]
    fn conversion_is_deterministic_for_a_fixed_table() {
        let t = table();
        let a = cross_convert(1_200.0, "THB", "KRW", &t).unwrap();
        let b = cross_convert(1_200.0, "THB", "KRW", &t).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_matches!(
            cross_convert(10.0, "XYZ", "KRW", &table()),
            Err(ProviderError::Rejected(_))
        );
    }

    #[test]
    fn pair_rate_matches_cross_conversion() {
        let rate = pair_rate("THB", "KRW", &table()).unwrap();
        assert!((rate - 37.5).abs() < 1e-9);
    }

    struct CountingSource(AtomicUsize);

    #[async_trait]
    impl RateSource for CountingSource {
        async fn usd_rates(&self) -> Result<RateTable, ProviderError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(table())
        }
    }

    #[tokio::test]
    async fn rates_are_cached_within_ttl() {
        let service =
            ExchangeService::with_ttl(CountingSource(AtomicUsize::new(0)), Duration::from_secs(60));

        let first = service.convert(1_200.0, "THB", "KRW").await.unwrap();
        let second = service.convert(1_200.0, "THB", "KRW").await.unwrap();
        assert_eq!(first.to_amount, 45_000);
        assert_eq!(second.to_amount, 45_000);
        assert_eq!(service.source.0.load(Ordering::SeqCst), 1);
    }
}
