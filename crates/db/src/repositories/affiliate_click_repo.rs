//! Repository for the `affiliate_clicks` table.

use sqlx::PgPool;

use crate::models::affiliate_click::{
    AffiliateClick, CreateAffiliateClick, PlatformClickStats,
};

const COLUMNS: &str = "id, user_id, platform, product_name, product_id, original_link, \
                       affiliate_link, user_agent, referrer, clicked_at";

/// Click-through persistence.
pub struct AffiliateClickRepo;

impl AffiliateClickRepo {
    /// Record one click-through.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAffiliateClick,
    ) -> Result<AffiliateClick, sqlx::Error> {
        let query = format!(
            "INSERT INTO affiliate_clicks (
                user_id, platform, product_name, product_id, original_link,
                affiliate_link, user_agent, referrer)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AffiliateClick>(&query)
            .bind(&input.user_id)
            .bind(&input.platform)
            .bind(&input.product_name)
            .bind(&input.product_id)
            .bind(&input.original_link)
            .bind(&input.affiliate_link)
            .bind(&input.user_agent)
            .bind(&input.referrer)
            .fetch_one(pool)
            .await
    }

    /// Click counts grouped by platform, busiest first.
    pub async fn stats_by_platform(pool: &PgPool) -> Result<Vec<PlatformClickStats>, sqlx::Error> {
        sqlx::query_as::<_, PlatformClickStats>(
            "SELECT platform, COUNT(*) AS clicks
             FROM affiliate_clicks
             GROUP BY platform
             ORDER BY clicks DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Total recorded clicks.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM affiliate_clicks")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
