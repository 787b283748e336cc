//! Repository for the `users` table.

use sqlx::PgPool;
use tabi_core::types::{Krw, Timestamp};
use tabi_core::usage::SubscriptionTier;

use crate::models::user::{UpsertUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, display_name, profile_image_url, is_anonymous, \
                       subscription_tier, subscription_expires_at, daily_search_count, \
                       last_search_date, total_savings, country, language, \
                       created_at, updated_at";

/// Account persistence.
pub struct UserRepo;

impl UserRepo {
    /// Upsert an account from an OIDC login, returning the row.
    ///
    /// Profile fields follow the identity provider on every login;
    /// counters and subscription state are never touched here.
    pub async fn upsert(pool: &PgPool, input: &UpsertUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, email, display_name, profile_image_url, country, language)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                display_name = EXCLUDED.display_name,
                profile_image_url = EXCLUDED.profile_image_url,
                country = COALESCE(EXCLUDED.country, users.country),
                language = COALESCE(EXCLUDED.language, users.language),
                is_anonymous = FALSE
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.id)
            .bind(&input.email)
            .bind(&input.display_name)
            .bind(&input.profile_image_url)
            .bind(&input.country)
            .bind(&input.language)
            .fetch_one(pool)
            .await
    }

    /// Find an account by id.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Ensure an anonymous session account exists for `id`.
    ///
    /// Guest usage tracking needs a row to hang counters on; repeated
    /// calls with the same id are no-ops apart from `updated_at`.
    pub async fn ensure_anonymous(pool: &PgPool, id: &str) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, is_anonymous)
             VALUES ($1, TRUE)
             ON CONFLICT (id) DO UPDATE SET updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Grant a subscription tier after a verified payment.
    ///
    /// Returns `false` when no such account exists.
    pub async fn grant_subscription(
        pool: &PgPool,
        id: &str,
        tier: SubscriptionTier,
        expires_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET subscription_tier = $2, subscription_expires_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(tier.as_str())
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Accumulate a confirmed comparison's absolute savings.
    pub async fn add_total_savings(
        pool: &PgPool,
        id: &str,
        amount: Krw,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET total_savings = total_savings + $2 WHERE id = $1")
            .bind(id)
            .bind(amount.abs())
            .execute(pool)
            .await?;
        Ok(())
    }
}
