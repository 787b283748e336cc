//! Repository for the `price_comparisons` table.

use sqlx::PgPool;

use crate::models::price_comparison::{CreatePriceComparison, PriceComparison};

const COLUMNS: &str = "id, user_id, product_name, product_name_korean, brand, local_price, \
                       local_currency, converted_local_price, domestic_price, savings_amount, \
                       savings_tier, domestic_source, domestic_link, product_image_url, \
                       ocr_raw_text, status, created_at, updated_at";

/// History queries are capped regardless of what the client asks for.
const MAX_LIST_LIMIT: i64 = 100;
const DEFAULT_LIST_LIMIT: i64 = 20;

/// Comparison record persistence. Insert-only: records are immutable.
pub struct ComparisonRepo;

impl ComparisonRepo {
    /// Insert a finished comparison record, returning the stored row.
    pub async fn create(
        pool: &PgPool,
        user_id: &str,
        input: &CreatePriceComparison,
    ) -> Result<PriceComparison, sqlx::Error> {
        let query = format!(
            "INSERT INTO price_comparisons (
                user_id, product_name, product_name_korean, brand, local_price,
                local_currency, converted_local_price, domestic_price, savings_amount,
                savings_tier, domestic_source, domestic_link, product_image_url,
                ocr_raw_text, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PriceComparison>(&query)
            .bind(user_id)
            .bind(&input.product_name)
            .bind(&input.product_name_korean)
            .bind(&input.brand)
            .bind(input.local_price)
            .bind(&input.local_currency)
            .bind(input.converted_local_price)
            .bind(input.domestic_price)
            .bind(input.savings_amount)
            .bind(&input.savings_tier)
            .bind(&input.domestic_source)
            .bind(&input.domestic_link)
            .bind(&input.product_image_url)
            .bind(&input.ocr_raw_text)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    /// An account's comparison history, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<PriceComparison>, sqlx::Error> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        let query = format!(
            "SELECT {COLUMNS} FROM price_comparisons
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, PriceComparison>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
