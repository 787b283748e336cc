//! Comparison outcome model.
//!
//! The domestic side of a comparison is a sum type rather than a bag
//! of sentinel zeros, so "no data" stays distinguishable from a
//! genuinely zero-cost outcome inside the codebase. At the wire/storage
//! boundary the unavailable variants still serialize with domestic
//! price 0 and savings 0, because that is the record shape the client
//! renders. The conflation of "price 0" and "no data" at that boundary
//! is a known ambiguity of the stored format and is deliberately left
//! as-is.

use serde::Serialize;

use crate::savings::{self, SavingsTier};
use crate::types::Krw;

/// Source label shown when the search returned nothing relevant.
pub const SOURCE_NO_DOMESTIC_PRICE: &str = "한국 가격 정보 없음";

/// Source label shown when the search call itself failed.
pub const SOURCE_SEARCH_FAILED: &str = "한국 가격 조회 실패";

/// Source label shown when currency conversion failed and the search
/// step was never attempted.
pub const SOURCE_CONVERSION_FAILED: &str = "환율 조회 실패";

/// What the domestic half of a comparison produced.
#[derive(Debug, Clone, PartialEq)]
pub enum DomesticResult {
    /// A relevant listing was found.
    Found {
        price: Krw,
        /// Mall name of the chosen listing.
        source: String,
        /// Affiliate link when available, otherwise the plain listing
        /// link.
        link: Option<String>,
    },
    /// The search succeeded but nothing relevant came back.
    NotFound,
    /// The search collaborator failed.
    SearchFailed,
    /// Conversion failed; no search was attempted.
    ConversionFailed,
}

impl DomesticResult {
    pub fn is_found(&self) -> bool {
        matches!(self, DomesticResult::Found { .. })
    }
}

/// Record lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonStatus {
    Processing,
    Completed,
    Failed,
}

/// The final outcome of one price comparison, ready for display and
/// persistence. Never mutated after construction; a re-comparison
/// produces a new record.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonOutcome {
    pub product_name: String,
    /// Price as photographed, in the foreign currency's units.
    pub local_price: f64,
    pub local_currency: String,
    /// Local price converted to KRW; 0 when conversion failed.
    pub converted_local_price: Krw,
    /// Domestic price; 0 when unavailable (see module docs).
    pub domestic_price: Krw,
    /// `domestic_price - converted_local_price` when a domestic price
    /// is known, otherwise 0.
    pub savings_amount: Krw,
    pub savings_tier: SavingsTier,
    /// User-facing recommendation text for the tier.
    pub message: String,
    /// Mall name or degradation label.
    pub comparison_source: String,
    pub product_link: Option<String>,
    pub product_image_url: Option<String>,
    pub status: ComparisonStatus,
}

/// Assemble the final outcome from the pipeline's pieces.
///
/// `converted_local_price` is `None` when the conversion step failed;
/// the domestic result must then be [`DomesticResult::ConversionFailed`].
pub fn build_outcome(
    product_name: String,
    local_price: f64,
    local_currency: String,
    converted_local_price: Option<Krw>,
    domestic: DomesticResult,
    product_image_url: Option<String>,
) -> ComparisonOutcome {
    let converted = converted_local_price.unwrap_or(0);

    let (domestic_price, savings_amount, source, link) = match &domestic {
        DomesticResult::Found { price, source, link } => {
            (*price, *price - converted, source.clone(), link.clone())
        }
        DomesticResult::NotFound => (0, 0, SOURCE_NO_DOMESTIC_PRICE.to_string(), None),
        DomesticResult::SearchFailed => (0, 0, SOURCE_SEARCH_FAILED.to_string(), None),
        DomesticResult::ConversionFailed => (0, 0, SOURCE_CONVERSION_FAILED.to_string(), None),
    };

    let tier = savings::classify(savings_amount as f64, converted as f64, domestic.is_found());

    let status = if matches!(domestic, DomesticResult::ConversionFailed) {
        ComparisonStatus::Failed
    } else {
        ComparisonStatus::Completed
    };

    ComparisonOutcome {
        product_name,
        local_price,
        local_currency,
        converted_local_price: converted,
        domestic_price,
        savings_amount,
        savings_tier: tier,
        message: savings::message(tier).to_string(),
        comparison_source: source,
        product_link: link,
        product_image_url,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_listing_computes_savings_invariant() {
        let outcome = build_outcome(
            "신라면".into(),
            1_200.0,
            "THB".into(),
            Some(45_000),
            DomesticResult::Found {
                price: 52_000,
                source: "네이버쇼핑".into(),
                link: Some("https://shopping.naver.com/item/1".into()),
            },
            None,
        );
        assert_eq!(outcome.savings_amount, outcome.domestic_price - outcome.converted_local_price);
        assert_eq!(outcome.savings_amount, 7_000);
        assert_eq!(outcome.savings_tier, SavingsTier::ExcellentDeal);
        assert_eq!(outcome.status, ComparisonStatus::Completed);
    }

    #[test]
    fn not_found_zeroes_price_and_savings() {
        let outcome = build_outcome(
            "신라면".into(),
            1_200.0,
            "THB".into(),
            Some(45_000),
            DomesticResult::NotFound,
            None,
        );
        assert_eq!(outcome.domestic_price, 0);
        assert_eq!(outcome.savings_amount, 0);
        assert_eq!(outcome.savings_tier, SavingsTier::NoData);
        assert_eq!(outcome.comparison_source, SOURCE_NO_DOMESTIC_PRICE);
        assert_eq!(outcome.status, ComparisonStatus::Completed);
    }

    #[test]
    fn conversion_failure_marks_record_failed() {
        let outcome = build_outcome(
            "신라면".into(),
            1_200.0,
            "THB".into(),
            None,
            DomesticResult::ConversionFailed,
            None,
        );
        assert_eq!(outcome.converted_local_price, 0);
        assert_eq!(outcome.comparison_source, SOURCE_CONVERSION_FAILED);
        assert_eq!(outcome.status, ComparisonStatus::Failed);
        assert_eq!(outcome.savings_tier, SavingsTier::NoData);
    }

    #[test]
    fn domestic_cheaper_is_negative_savings() {
        let outcome = build_outcome(
            "AirPods".into(),
            200.0,
            "USD".into(),
            Some(280_000),
            DomesticResult::Found { price: 250_000, source: "쿠팡".into(), link: None },
            None,
        );
        assert_eq!(outcome.savings_amount, -30_000);
        assert_eq!(outcome.savings_tier, SavingsTier::BuyAtHome);
    }
}
