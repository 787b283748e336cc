//! Savings-tier classifier.
//!
//! Maps the computed savings percentage of a comparison to one of five
//! user-facing recommendation tiers. The numeric tiers partition the
//! reals (closed below, open above, last unbounded) once a domestic
//! price is known; `NoData` covers the case where no comparison price
//! was found at all.

use serde::Serialize;

/// Percentage below which savings are not worth the luggage space.
pub const MARGINAL_BELOW_PCT: f64 = 5.0;

/// Percentage below which a deal is merely good rather than excellent.
pub const GOOD_DEAL_BELOW_PCT: f64 = 15.0;

/// User-facing recommendation tier for a completed comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SavingsTier {
    /// No domestic comparison price was found.
    NoData,
    /// The home market is cheaper; buying abroad costs more.
    BuyAtHome,
    /// Savings under 5% -- not worth the hassle.
    Marginal,
    /// 5% to 15% savings.
    GoodDeal,
    /// 15% or more savings.
    ExcellentDeal,
}

/// Messages for the `Marginal` tier; one is picked at random so the
/// nudge does not get stale. Tests assert tier membership, not text.
pub const MARGINAL_MESSAGES: &[&str] = &["구지 힘들게 이걸 사?", "수하물 무게는 넉넉하니?"];

/// Classify a comparison outcome into a [`SavingsTier`].
///
/// * `savings` -- signed KRW amount; positive means cheaper abroad.
/// * `local_total` -- the local purchase total converted to KRW.
/// * `domestic_price_known` -- `false` when no domestic price was found,
///   which wins over any numeric input.
///
/// The percentage is defined as 0 when `local_total` is 0, so a free
/// item classifies as `Marginal` rather than dividing by zero.
pub fn classify(savings: f64, local_total: f64, domestic_price_known: bool) -> SavingsTier {
    if !domestic_price_known {
        return SavingsTier::NoData;
    }

    let pct = if local_total == 0.0 {
        0.0
    } else {
        savings / local_total * 100.0
    };

    if pct < 0.0 {
        SavingsTier::BuyAtHome
    } else if pct < MARGINAL_BELOW_PCT {
        SavingsTier::Marginal
    } else if pct < GOOD_DEAL_BELOW_PCT {
        SavingsTier::GoodDeal
    } else {
        SavingsTier::ExcellentDeal
    }
}

/// Display text for a tier, with the marginal pick injectable.
///
/// `choose` receives the pool size and returns an index; out-of-range
/// picks clamp to the last message. Production callers use
/// [`message`], tests supply a fixed chooser.
pub fn message_with(tier: SavingsTier, choose: impl FnOnce(usize) -> usize) -> &'static str {
    match tier {
        SavingsTier::NoData => "한국에서 구할 수 없는걸 수도",
        SavingsTier::BuyAtHome => "한국에서 사세요",
        SavingsTier::Marginal => {
            let idx = choose(MARGINAL_MESSAGES.len()).min(MARGINAL_MESSAGES.len() - 1);
            MARGINAL_MESSAGES[idx]
        }
        SavingsTier::GoodDeal => "여기서 사는게 이득",
        SavingsTier::ExcellentDeal => "다 쓸어 담어",
    }
}

/// Display text for a tier using the thread-local RNG for the marginal
/// pool.
pub fn message(tier: SavingsTier) -> &'static str {
    message_with(tier, |n| rand::random_range(0..n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_savings_is_buy_at_home() {
        assert_eq!(classify(-1_000.0, 10_000.0, true), SavingsTier::BuyAtHome);
    }

    #[test]
    fn zero_denominator_defines_percentage_as_zero() {
        // Not a division error; 0% lands in the marginal band.
        assert_eq!(classify(0.0, 0.0, true), SavingsTier::Marginal);
    }

    #[test]
    fn twenty_percent_is_excellent() {
        assert_eq!(classify(2_000.0, 10_000.0, true), SavingsTier::ExcellentDeal);
    }

    #[test]
    fn ten_percent_is_good_deal() {
        assert_eq!(classify(1_000.0, 10_000.0, true), SavingsTier::GoodDeal);
    }

    #[test]
    fn band_boundaries_are_closed_below() {
        assert_eq!(classify(500.0, 10_000.0, true), SavingsTier::GoodDeal); // exactly 5%
        assert_eq!(classify(1_500.0, 10_000.0, true), SavingsTier::ExcellentDeal); // exactly 15%
        assert_eq!(classify(0.0, 10_000.0, true), SavingsTier::Marginal); // exactly 0%
    }

    #[test]
    fn unknown_domestic_price_wins_over_numbers() {
        assert_eq!(classify(2_000.0, 10_000.0, false), SavingsTier::NoData);
        assert_eq!(classify(-9_999.0, 0.0, false), SavingsTier::NoData);
    }

    #[test]
    fn marginal_message_comes_from_the_pool() {
        let text = message_with(SavingsTier::Marginal, |_| 1);
        assert!(MARGINAL_MESSAGES.contains(&text));
        // Random pick is still a pool member.
        let text = message(SavingsTier::Marginal);
        assert!(MARGINAL_MESSAGES.contains(&text));
    }

    #[test]
    fn out_of_range_chooser_clamps() {
        let text = message_with(SavingsTier::Marginal, |n| n + 10);
        assert_eq!(text, MARGINAL_MESSAGES[MARGINAL_MESSAGES.len() - 1]);
    }
}
