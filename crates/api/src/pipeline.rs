//! The price-comparison pipeline.
//!
//! Strict sequence: convert the photographed price to KRW, search the
//! domestic market, pick the best relevant listing, classify the
//! savings. Each step degrades locally -- a failed conversion skips
//! the search entirely, a failed or empty search still yields a
//! terminal record with the matching degradation label. The pipeline
//! itself never returns an error and never panics; timeouts and
//! retries live inside the providers.

use serde::Deserialize;

use tabi_core::comparison::{build_outcome, ComparisonOutcome, DomesticResult};
use tabi_core::currency::HOME_CURRENCY;
use tabi_core::relevance::select_best_match;
use tabi_providers::exchange::CurrencyConverter;
use tabi_providers::shopping::ShoppingSearch;

/// How many listings to consider per search.
const SEARCH_RESULTS: usize = 10;

/// Input to one comparison run, as recognized from the photo.
#[derive(Debug, Clone, Deserialize)]
pub struct ComparisonRequest {
    pub product_name: String,
    /// Korean name used as the domestic search query; falls back to
    /// `product_name` when recognition produced none.
    pub product_name_korean: Option<String>,
    /// Price as photographed, in `local_currency` units.
    pub local_price: f64,
    pub local_currency: String,
    pub product_image_url: Option<String>,
    pub ocr_raw_text: Option<String>,
}

impl ComparisonRequest {
    pub fn search_query(&self) -> &str {
        self.product_name_korean
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.product_name)
    }
}

/// Run one comparison end to end.
///
/// Always yields a terminal outcome; degradations are encoded in the
/// record, not surfaced as errors.
pub async fn run_comparison(
    converter: &dyn CurrencyConverter,
    shopping: &dyn ShoppingSearch,
    request: &ComparisonRequest,
) -> ComparisonOutcome {
    let query = request.search_query().to_string();

    let converted = match converter
        .convert(request.local_price, &request.local_currency, HOME_CURRENCY)
        .await
    {
        Ok(conversion) => conversion.to_amount,
        Err(e) => {
            tracing::warn!(
                collaborator = "exchange",
                currency = %request.local_currency,
                error = %e,
                "conversion failed, recording degraded comparison"
            );
            return build_outcome(
                request.product_name.clone(),
                request.local_price,
                request.local_currency.clone(),
                None,
                DomesticResult::ConversionFailed,
                request.product_image_url.clone(),
            );
        }
    };

    let domestic = match shopping.search(&query, SEARCH_RESULTS).await {
        Ok(items) => match select_best_match(&query, &items) {
            Some(item) => DomesticResult::Found {
                price: item.price,
                source: item.mall_name.clone(),
                link: item.affiliate_link.clone().or_else(|| Some(item.link.clone())),
            },
            None => {
                tracing::debug!(query = %query, "no relevant domestic listing");
                DomesticResult::NotFound
            }
        },
        Err(e) => {
            tracing::warn!(
                collaborator = "shopping",
                query = %query,
                error = %e,
                "domestic search failed, recording degraded comparison"
            );
            DomesticResult::SearchFailed
        }
    };

    build_outcome(
        request.product_name.clone(),
        request.local_price,
        request.local_currency.clone(),
        Some(converted),
        domestic,
        request.product_image_url.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    use tabi_core::comparison::{ComparisonStatus, SOURCE_SEARCH_FAILED};
    use tabi_core::savings::SavingsTier;
    use tabi_providers::error::ProviderError;
    use tabi_providers::exchange::{cross_convert, pair_rate, Conversion, RateTable};
    use tabi_providers::shopping::SearchItem;

    struct FixedRates(RateTable);

    #[async_trait]
    impl CurrencyConverter for FixedRates {
        async fn convert(
            &self,
            amount: f64,
            from: &str,
            to: &str,
        ) -> Result<Conversion, ProviderError> {
            Ok(Conversion {
                from_currency: from.to_string(),
                to_currency: to.to_string(),
                from_amount: amount,
                to_amount: cross_convert(amount, from, to, &self.0)?,
                exchange_rate: pair_rate(from, to, &self.0)?,
                last_updated: chrono::Utc::now(),
            })
        }

        async fn rate(&self, from: &str, to: &str) -> Result<f64, ProviderError> {
            pair_rate(from, to, &self.0)
        }
    }

    struct FixedSearch(Result<Vec<SearchItem>, &'static str>);

    #[async_trait]
    impl ShoppingSearch for FixedSearch {
        async fn search(
            &self,
            _product_name: &str,
            _max_results: usize,
        ) -> Result<Vec<SearchItem>, ProviderError> {
            match &self.0 {
                Ok(items) => Ok(items.clone()),
                Err(msg) => Err(ProviderError::Malformed { provider: "stub", detail: msg.to_string() }),
            }
        }
    }

    fn rates() -> FixedRates {
        FixedRates(HashMap::from([
            ("USD".to_string(), 1.0),
            ("KRW".to_string(), 1_350.0),
            ("THB".to_string(), 36.0),
        ]))
    }

    fn item(name: &str, price: i64) -> SearchItem {
        SearchItem {
            product_name: name.to_string(),
            price,
            link: "https://search.shopping.naver.com/catalog/1".to_string(),
            affiliate_link: None,
            image: String::new(),
            mall_name: "네이버쇼핑".to_string(),
            brand: Some("농심".to_string()),
            source: "naver",
        }
    }

    fn request() -> ComparisonRequest {
        ComparisonRequest {
            product_name: "Shin Ramyun".to_string(),
            product_name_korean: Some("농심 신라면".to_string()),
            local_price: 1_200.0,
            local_currency: "THB".to_string(),
            product_image_url: None,
            ocr_raw_text: None,
        }
    }

    #[test]
    fn request_tolerates_extra_recognition_fields() {
        // Clients post the whole recognition payload; fields the
        // pipeline does not read (brand, confidence) must not break
        // deserialization.
        let req: ComparisonRequest = serde_json::from_value(serde_json::json!({
            "product_name": "Shin Ramyun",
            "product_name_korean": "농심 신라면",
            "brand": "농심",
            "confidence": 0.92,
            "local_price": 1200.0,
            "local_currency": "THB"
        }))
        .unwrap();
        assert_eq!(req.search_query(), "농심 신라면");
    }

    #[tokio::test]
    async fn full_run_classifies_an_excellent_deal() {
        // 1200 THB converts to 45000 KRW; domestic 52000 means buying
        // abroad saves 7000 (>= 15%).
        let shopping = FixedSearch(Ok(vec![item("농심 신라면 멀티팩", 52_000)]));
        let outcome = run_comparison(&rates(), &shopping, &request()).await;

        assert_eq!(outcome.converted_local_price, 45_000);
        assert_eq!(outcome.domestic_price, 52_000);
        assert_eq!(outcome.savings_amount, 7_000);
        assert_eq!(outcome.savings_tier, SavingsTier::ExcellentDeal);
        assert_eq!(outcome.status, ComparisonStatus::Completed);
        assert_eq!(outcome.comparison_source, "네이버쇼핑");
    }

    #[tokio::test]
    async fn search_failure_degrades_but_completes() {
        let shopping = FixedSearch(Err("connection refused"));
        let outcome = run_comparison(&rates(), &shopping, &request()).await;

        assert_eq!(outcome.converted_local_price, 45_000);
        assert_eq!(outcome.domestic_price, 0);
        assert_eq!(outcome.savings_tier, SavingsTier::NoData);
        assert_eq!(outcome.comparison_source, SOURCE_SEARCH_FAILED);
        assert_eq!(outcome.status, ComparisonStatus::Completed);
    }

    #[tokio::test]
    async fn conversion_failure_skips_the_search() {
        let mut req = request();
        req.local_currency = "XYZ".to_string();
        let shopping = FixedSearch(Ok(vec![item("농심 신라면", 52_000)]));

        let outcome = run_comparison(&rates(), &shopping, &req).await;
        assert_eq!(outcome.status, ComparisonStatus::Failed);
        assert_eq!(outcome.domestic_price, 0);
    }

    #[tokio::test]
    async fn irrelevant_listings_yield_no_data() {
        let shopping = FixedSearch(Ok(vec![item("완전히 다른 상품입니다", 52_000)]));
        let outcome = run_comparison(&rates(), &shopping, &request()).await;

        // Brand substring rescues relevance, so use a brandless item.
        let mut unbranded = item("완전히 다른 상품입니다", 52_000);
        unbranded.brand = None;
        let shopping = FixedSearch(Ok(vec![unbranded]));
        let outcome2 = run_comparison(&rates(), &shopping, &request()).await;

        assert_eq!(outcome.savings_tier, SavingsTier::ExcellentDeal);
        assert_eq!(outcome2.savings_tier, SavingsTier::NoData);
    }
}
