//! Affiliate click model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tabi_core::types::{AccountId, Timestamp};
use uuid::Uuid;

/// One recorded click-through on an affiliate link.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AffiliateClick {
    pub id: Uuid,
    pub user_id: Option<AccountId>,
    pub platform: String,
    pub product_name: Option<String>,
    /// Platform-side listing id, when one could be extracted.
    pub product_id: Option<String>,
    pub original_link: String,
    pub affiliate_link: String,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub clicked_at: Timestamp,
}

/// DTO for recording a click.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAffiliateClick {
    pub user_id: Option<AccountId>,
    pub platform: String,
    pub product_name: Option<String>,
    pub product_id: Option<String>,
    pub original_link: String,
    pub affiliate_link: String,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

/// Per-platform click aggregate for the analytics endpoint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlatformClickStats {
    pub platform: String,
    pub clicks: i64,
}
