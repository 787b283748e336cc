//! Handlers for affiliate click-through tracking and analytics.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Redirect;
use axum::Json;
use serde::{Deserialize, Serialize};
use tabi_db::models::affiliate_click::{CreateAffiliateClick, PlatformClickStats};
use tabi_db::repositories::AffiliateClickRepo;
use tabi_providers::affiliate::{generate_affiliate_link, naver_product_id, Platform};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::OptionalAuthUser;
use crate::state::AppState;

/// Hosts a click redirect may point at. Anything else is rejected --
/// an open redirect through our domain would be a phishing primitive.
const REDIRECT_ALLOW_LIST: &[&str] = &[
    "shopping.naver.com",
    "search.naver.com",
    "coupang.com",
    "link.coupang.com",
];

/// Whether `url` points at an allow-listed shopping host (exact match
/// or subdomain).
pub fn is_allowed_redirect(url: &str) -> bool {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return false;
    };
    if parsed.scheme() != "https" {
        return false;
    }
    let Some(host) = parsed.host_str() else {
        return false;
    };
    REDIRECT_ALLOW_LIST
        .iter()
        .any(|allowed| host == *allowed || host.ends_with(&format!(".{allowed}")))
}

#[derive(Debug, Deserialize)]
pub struct ClickQuery {
    pub url: String,
    pub product: Option<String>,
}

/// GET /api/v1/track/click?url=&product=
///
/// Redirect to the shop through the affiliate program, recording the
/// click best-effort. Only allow-listed shopping hosts are redirected.
pub async fn click(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    headers: HeaderMap,
    Query(query): Query<ClickQuery>,
) -> AppResult<Redirect> {
    if !is_allowed_redirect(&query.url) {
        return Err(AppError::BadRequest("redirect target not allowed".into()));
    }

    let product = query.product.unwrap_or_default();
    let link = generate_affiliate_link(&query.url, &product);

    let (target, platform) = match &link {
        Some(link) => (link.affiliate_link.clone(), link.platform),
        // Allow-listed host without an affiliate program entry; pass
        // the original URL through.
        None => (query.url.clone(), Platform::Naver),
    };

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    let product_id = (platform == Platform::Naver)
        .then(|| naver_product_id(&query.url).map(String::from))
        .flatten();

    let click = CreateAffiliateClick {
        user_id: user.map(|u| u.user_id),
        platform: platform.as_str().to_string(),
        product_name: (!product.is_empty()).then_some(product),
        product_id,
        original_link: query.url.clone(),
        affiliate_link: target.clone(),
        user_agent: header("user-agent"),
        referrer: header("referer"),
    };
    if let Err(e) = AffiliateClickRepo::create(&state.pool, &click).await {
        tracing::warn!(error = %e, "failed to record affiliate click");
    }

    Ok(Redirect::temporary(&target))
}

/// Flat per-click revenue estimates, KRW. Real settlement data arrives
/// monthly from the partner dashboards; these are the planning figures.
fn revenue_per_click(platform: &str) -> i64 {
    match platform {
        "coupang" => 150,
        "naver" => 100,
        _ => 0,
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub total_clicks: i64,
    pub by_platform: Vec<PlatformClickStats>,
    /// Estimated revenue in KRW across all platforms.
    pub estimated_revenue: i64,
}

/// GET /api/v1/affiliate/analytics
pub async fn analytics(State(state): State<AppState>) -> AppResult<Json<AnalyticsResponse>> {
    let by_platform = AffiliateClickRepo::stats_by_platform(&state.pool).await?;
    let total_clicks = AffiliateClickRepo::count(&state.pool).await?;
    let estimated_revenue = by_platform
        .iter()
        .map(|s| s.clicks * revenue_per_click(&s.platform))
        .sum();

    Ok(Json(AnalyticsResponse {
        total_clicks,
        by_platform,
        estimated_revenue,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_accepts_shopping_hosts_and_subdomains() {
        assert!(is_allowed_redirect("https://shopping.naver.com/catalog/1"));
        assert!(is_allowed_redirect("https://search.naver.com/search?q=a"));
        assert!(is_allowed_redirect("https://www.coupang.com/vp/products/1"));
        assert!(is_allowed_redirect("https://link.coupang.com/a/partner"));
        assert!(is_allowed_redirect("https://m.coupang.com/item/1"));
    }

    #[test]
    fn allow_list_rejects_everything_else() {
        assert!(!is_allowed_redirect("https://evil.example.com/phish"));
        // Suffix tricks must not pass.
        assert!(!is_allowed_redirect("https://notcoupang.com/x"));
        assert!(!is_allowed_redirect("https://coupang.com.evil.io/x"));
        // Plain http is downgraded traffic; refuse it.
        assert!(!is_allowed_redirect("http://shopping.naver.com/catalog/1"));
        assert!(!is_allowed_redirect("not a url"));
    }
}
