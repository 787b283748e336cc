//! Account model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tabi_core::types::{AccountId, Krw, Timestamp};

/// Full account row from the `users` table.
///
/// Ids are OIDC subjects for signed-in accounts and generated opaque
/// ids for anonymous session accounts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: AccountId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub is_anonymous: bool,
    /// `free`, `daily`, `weekly`, or `monthly`.
    pub subscription_tier: String,
    pub subscription_expires_at: Option<Timestamp>,
    pub daily_search_count: i32,
    pub last_search_date: Option<NaiveDate>,
    /// Cumulative absolute savings across confirmed comparisons, KRW.
    pub total_savings: Krw,
    pub country: Option<String>,
    pub language: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for the OIDC login upsert.
#[derive(Debug, Deserialize)]
pub struct UpsertUser {
    pub id: AccountId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
}
