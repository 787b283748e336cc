//! Affiliate link generation.
//!
//! Pure URL rewriting: Coupang listings become partner deep links,
//! Naver listings get the affiliate query parameters appended. Links
//! from other hosts are left untouched (no affiliate program).

use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

/// Platforms with an affiliate program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Coupang,
    Naver,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Coupang => "coupang",
            Platform::Naver => "naver",
        }
    }
}

/// A generated affiliate link alongside its original.
#[derive(Debug, Clone)]
pub struct AffiliateLink {
    pub original_link: String,
    pub affiliate_link: String,
    pub platform: Platform,
}

/// Detect which affiliate platform (if any) a listing URL belongs to.
pub fn detect_platform(url: &str) -> Option<Platform> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    if host == "coupang.com" || host.ends_with(".coupang.com") {
        Some(Platform::Coupang)
    } else if host == "naver.com" || host.ends_with(".naver.com") {
        Some(Platform::Naver)
    } else {
        None
    }
}

/// Generate an affiliate link for a listing URL, or `None` when the
/// host has no affiliate program.
pub fn generate_affiliate_link(url: &str, product_name: &str) -> Option<AffiliateLink> {
    match detect_platform(url)? {
        Platform::Coupang => Some(coupang_link(url, product_name)),
        Platform::Naver => naver_link(url, product_name),
    }
}

/// Coupang partners deep link:
/// `https://link.coupang.com/a/{partner}?url={encoded}&subid={subid}`.
fn coupang_link(url: &str, product_name: &str) -> AffiliateLink {
    let partner_id =
        std::env::var("COUPANG_PARTNER_ID").unwrap_or_else(|_| "demo_partner".into());
    let sub_id = format!(
        "tabi_{}_{:08x}",
        chrono::Utc::now().timestamp_millis(),
        rand::rng().random::<u32>()
    );

    let mut link = reqwest::Url::parse("https://link.coupang.com").expect("static URL");
    link.set_path(&format!("/a/{partner_id}"));
    link.query_pairs_mut()
        .append_pair("url", url)
        .append_pair("subid", &sub_id)
        .finish();

    tracing::debug!(product = product_name, "generated coupang affiliate link");

    AffiliateLink {
        original_link: url.to_string(),
        affiliate_link: link.to_string(),
        platform: Platform::Coupang,
    }
}

/// Naver affiliate link: the original URL with tracking parameters
/// appended. Returns `None` only when the URL does not parse.
fn naver_link(url: &str, product_name: &str) -> Option<AffiliateLink> {
    let partner_id = std::env::var("NAVER_AFFILIATE_ID").unwrap_or_else(|_| "demo_naver".into());

    let mut link = reqwest::Url::parse(url).ok()?;
    link.query_pairs_mut()
        .append_pair("af_id", &partner_id)
        .append_pair("ref", "tabi")
        .append_pair("utm_source", "tabi_app")
        .append_pair("utm_medium", "affiliate")
        .finish();

    tracing::debug!(product = product_name, "generated naver affiliate link");

    Some(AffiliateLink {
        original_link: url.to_string(),
        affiliate_link: link.to_string(),
        platform: Platform::Naver,
    })
}

/// Extract the numeric product id from a Naver shopping URL, used for
/// click analytics.
pub fn naver_product_id(url: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"/(\d+)(?:\?|$)").expect("static regex"));
    re.captures(url).and_then(|c| c.get(1)).map(|m| m.as_str())
}
