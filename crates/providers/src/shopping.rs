//! Domestic shopping search collaborator.
//!
//! [`NaverShoppingClient`] queries the Naver open search API for the
//! recognized product name, cleans up the HTML-laced titles, drops
//! second-hand and display-item listings, attaches affiliate links,
//! and returns the items sorted ascending by price. Ordering from the
//! API is conventional, not guaranteed, so the client always re-sorts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tabi_core::relevance::Candidate;
use tabi_core::types::Krw;

use crate::affiliate;
use crate::error::ProviderError;
use crate::with_retry;

/// Title keywords that mark a listing as second-hand, refurbished, or
/// otherwise not the product itself.
pub const EXCLUDED_TITLE_KEYWORDS: &[&str] = &["중고", "리퍼", "전시품", "케이스만", "빈박스"];

/// One cleaned search listing.
#[derive(Debug, Clone, Serialize)]
pub struct SearchItem {
    pub product_name: String,
    /// Price in KRW.
    pub price: Krw,
    pub link: String,
    pub affiliate_link: Option<String>,
    pub image: String,
    pub mall_name: String,
    pub brand: Option<String>,
    /// Which platform produced the listing (currently always `naver`).
    pub source: &'static str,
}

impl Candidate for SearchItem {
    fn title(&self) -> &str {
        &self.product_name
    }
    fn price(&self) -> Krw {
        self.price
    }
    fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }
}

/// Search collaborator seam used by the pipeline.
#[async_trait]
pub trait ShoppingSearch: Send + Sync {
    /// Search for `product_name`, returning up to `max_results` items
    /// sorted ascending by price.
    async fn search(
        &self,
        product_name: &str,
        max_results: usize,
    ) -> Result<Vec<SearchItem>, ProviderError>;
}

// ---------------------------------------------------------------------------
// Title cleanup
// ---------------------------------------------------------------------------

/// Strip HTML tags and unescape the entities Naver embeds in titles.
pub fn clean_title(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .trim()
        .to_string()
}

/// Whether a (cleaned) title names an excluded listing type.
pub fn is_excluded_listing(title: &str) -> bool {
    let lower = title.to_lowercase();
    EXCLUDED_TITLE_KEYWORDS.iter().any(|k| lower.contains(k))
}

// ---------------------------------------------------------------------------
// Naver client
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct NaverItem {
    title: String,
    link: String,
    #[serde(default)]
    image: String,
    /// Lowest price, returned as a decimal string.
    lprice: String,
    #[serde(rename = "mallName", default)]
    mall_name: String,
    #[serde(default)]
    brand: String,
}

#[derive(Debug, Deserialize)]
struct NaverResponse {
    #[serde(default)]
    items: Vec<NaverItem>,
}

/// Naver open API credentials.
#[derive(Debug, Clone)]
pub struct NaverCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl NaverCredentials {
    /// Read `NAVER_CLIENT_ID` / `NAVER_CLIENT_SECRET` from the
    /// environment.
    pub fn from_env() -> Result<Self, ProviderError> {
        let client_id = std::env::var("NAVER_CLIENT_ID").map_err(|_| {
            ProviderError::Credentials { provider: "naver", detail: "NAVER_CLIENT_ID not set" }
        })?;
        let client_secret = std::env::var("NAVER_CLIENT_SECRET").map_err(|_| {
            ProviderError::Credentials { provider: "naver", detail: "NAVER_CLIENT_SECRET not set" }
        })?;
        Ok(Self { client_id, client_secret })
    }
}

/// HTTP client for the Naver shopping search API.
pub struct NaverShoppingClient {
    client: reqwest::Client,
    credentials: NaverCredentials,
    base_url: String,
}

impl NaverShoppingClient {
    pub fn new(client: reqwest::Client, credentials: NaverCredentials) -> Self {
        Self {
            client,
            credentials,
            base_url: "https://openapi.naver.com/v1/search/shop.json".into(),
        }
    }

    /// Override the endpoint, for tests against a local server.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn fetch(&self, query: &str, display: usize) -> Result<NaverResponse, ProviderError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("query", query),
                ("display", &display.to_string()),
                ("sort", "asc"),
            ])
            .header("X-Naver-Client-Id", &self.credentials.client_id)
            .header("X-Naver-Client-Secret", &self.credentials.client_secret)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { provider: "naver", status: status.as_u16(), body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ShoppingSearch for NaverShoppingClient {
    async fn search(
        &self,
        product_name: &str,
        max_results: usize,
    ) -> Result<Vec<SearchItem>, ProviderError> {
        // Over-fetch so the exclusion filter does not empty the page.
        let display = (max_results * 3).clamp(1, 30);
        let response = with_retry(|| self.fetch(product_name, display)).await?;

        let mut items: Vec<SearchItem> = response
            .items
            .into_iter()
            .filter_map(|item| {
                let title = clean_title(&item.title);
                if is_excluded_listing(&title) {
                    return None;
                }
                let price: Krw = item.lprice.parse().ok().filter(|p| *p > 0)?;
                let affiliate_link =
                    affiliate::generate_affiliate_link(&item.link, &title).map(|a| a.affiliate_link);
                Some(SearchItem {
                    product_name: title,
                    price,
                    link: item.link,
                    affiliate_link,
                    image: item.image,
                    mall_name: if item.mall_name.is_empty() {
                        "네이버쇼핑".to_string()
                    } else {
                        item.mall_name
                    },
                    brand: (!item.brand.is_empty()).then_some(item.brand),
                    source: "naver",
                })
            })
            .collect();

        items.sort_by_key(|i| i.price);
        items.truncate(max_results);

        tracing::debug!(
            query = product_name,
            results = items.len(),
            "domestic shopping search complete"
        );
        Ok(items)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
