//! Supported currency catalogue.
//!
//! The app serves travellers comparing foreign shelf prices against the
//! Korean market, so the home currency is fixed to KRW and the foreign
//! set covers the destinations the capture flow recognizes.

/// ISO 4217 code of the home market currency.
pub const HOME_CURRENCY: &str = "KRW";

/// Currencies the conversion collaborator must support, with their
/// display symbols.
pub const SUPPORTED_CURRENCIES: &[(&str, &str)] = &[
    ("KRW", "원"),
    ("USD", "$"),
    ("JPY", "¥"),
    ("THB", "฿"),
    ("VND", "₫"),
    ("EUR", "€"),
    ("CNY", "¥"),
    ("GBP", "£"),
    ("SGD", "S$"),
    ("HKD", "HK$"),
];

/// Check whether a currency code (upper-case ISO 4217) is supported.
pub fn is_supported(code: &str) -> bool {
    SUPPORTED_CURRENCIES.iter().any(|(c, _)| *c == code)
}

/// Display symbol for a currency code.
///
/// Unknown codes fall back to the code itself so the UI always has
/// something to render next to the amount.
pub fn symbol_for(code: &str) -> &str {
    SUPPORTED_CURRENCIES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| *s)
        .unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_currency_is_supported() {
        assert!(is_supported(HOME_CURRENCY));
    }

    #[test]
    fn thb_symbol() {
        assert_eq!(symbol_for("THB"), "฿");
    }

    #[test]
    fn unknown_code_falls_back_to_code() {
        assert_eq!(symbol_for("XAU"), "XAU");
        assert!(!is_supported("XAU"));
    }
}
