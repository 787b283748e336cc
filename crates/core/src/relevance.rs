//! Result-relevance filter for domestic search results.
//!
//! Shopping search is keyword-based, so a query for a photographed
//! product routinely returns accessories, bundles, or unrelated items.
//! This module decides whether a candidate listing plausibly refers to
//! the same physical product as the one searched, and picks the best
//! match out of a price-sorted result list.

use crate::types::Krw;

/// Minimum keyword match ratio for a candidate to count as relevant.
pub const RELEVANCE_THRESHOLD: f64 = 0.5;

/// Keywords shorter than this (in characters) carry no signal and are
/// dropped before matching.
pub const MIN_KEYWORD_CHARS: usize = 2;

/// Listings at or below this price (KRW) are usually accessories or
/// components of the searched product, not the product itself.
pub const MAIN_PRODUCT_PRICE_FLOOR: Krw = 10_000;

/// Decide whether `candidate` plausibly refers to the same product as
/// `searched`.
///
/// A non-empty `brand` that appears (case-insensitively) in either name
/// short-circuits to relevant. Otherwise `searched` is split on
/// whitespace into keywords of at least [`MIN_KEYWORD_CHARS`]
/// characters, and the candidate is relevant when at least
/// [`RELEVANCE_THRESHOLD`] of them occur as substrings of its title.
///
/// A searched name with no qualifying keywords is never relevant via
/// keyword matching; only a brand match can rescue it.
pub fn is_relevant(searched: &str, candidate: &str, brand: Option<&str>) -> bool {
    let searched_lower = searched.to_lowercase();
    let candidate_lower = candidate.to_lowercase();

    if let Some(brand) = brand {
        let brand_lower = brand.to_lowercase();
        if !brand_lower.is_empty()
            && (candidate_lower.contains(&brand_lower) || searched_lower.contains(&brand_lower))
        {
            return true;
        }
    }

    let keywords: Vec<&str> = searched_lower
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_KEYWORD_CHARS)
        .collect();

    if keywords.is_empty() {
        return false;
    }

    let matched = keywords
        .iter()
        .filter(|k| candidate_lower.contains(**k))
        .count();

    matched as f64 / keywords.len() as f64 >= RELEVANCE_THRESHOLD
}

/// A search listing as seen by the relevance filter.
///
/// The provider crate's richer item type converts into this view so the
/// filter stays independent of any wire format.
pub trait Candidate {
    fn title(&self) -> &str;
    fn price(&self) -> Krw;
    fn brand(&self) -> Option<&str>;
}

/// Select the best matching listing for `searched` out of `items`.
///
/// `items` must already be sorted ascending by price (the pipeline
/// re-sorts provider output before calling this). Candidates are first
/// restricted to those priced above [`MAIN_PRODUCT_PRICE_FLOOR`] when
/// any such candidate exists; if none are, the full set is considered
/// so cheap-but-genuine products are not filtered into oblivion. The
/// first relevant candidate -- i.e. the cheapest -- wins.
pub fn select_best_match<'a, C: Candidate>(searched: &str, items: &'a [C]) -> Option<&'a C> {
    let any_above_floor = items.iter().any(|i| i.price() > MAIN_PRODUCT_PRICE_FLOOR);

    items
        .iter()
        .filter(|i| !any_above_floor || i.price() > MAIN_PRODUCT_PRICE_FLOOR)
        .find(|i| is_relevant(searched, i.title(), i.brand()))
}
