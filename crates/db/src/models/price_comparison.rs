//! Comparison record model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tabi_core::types::{AccountId, Krw, Timestamp};
use uuid::Uuid;

/// One finished comparison, as stored. Records are immutable once
/// inserted; there is no update DTO.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PriceComparison {
    pub id: Uuid,
    pub user_id: AccountId,
    pub product_name: String,
    pub product_name_korean: Option<String>,
    pub brand: Option<String>,
    /// As photographed, in the foreign currency.
    pub local_price: f64,
    pub local_currency: String,
    pub converted_local_price: Krw,
    /// 0 when no domestic price was found; `domestic_source` tells
    /// the cases apart.
    pub domestic_price: Krw,
    pub savings_amount: Krw,
    pub savings_tier: String,
    pub domestic_source: String,
    pub domestic_link: Option<String>,
    pub product_image_url: Option<String>,
    pub ocr_raw_text: Option<String>,
    /// `processing`, `completed`, or `failed`.
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a comparison record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePriceComparison {
    pub product_name: String,
    pub product_name_korean: Option<String>,
    pub brand: Option<String>,
    pub local_price: f64,
    pub local_currency: String,
    pub converted_local_price: Krw,
    pub domestic_price: Krw,
    pub savings_amount: Krw,
    pub savings_tier: String,
    pub domestic_source: String,
    pub domestic_link: Option<String>,
    pub product_image_url: Option<String>,
    pub ocr_raw_text: Option<String>,
    pub status: String,
}
