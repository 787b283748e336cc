//! Authoritative account-side usage counter.
//!
//! The increment is the one read-modify-write in the system that must
//! not lose updates: two devices confirming comparisons for the same
//! account concurrently must serialize. `SELECT ... FOR UPDATE` plus
//! the conditional `UPDATE` run inside a single transaction; the wall
//! decision itself is the pure [`tabi_core::usage::evaluate`].

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tabi_core::types::Timestamp;
use tabi_core::usage::{
    self, SubscriptionTier, UsageSnapshot, WallState, WallThresholds,
};

/// Wall status for one account, as reported to the client.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AccountUsage {
    pub allowed: bool,
    pub daily_search_count: i32,
    pub state: WallState,
    pub premium: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct CounterRow {
    daily_search_count: i32,
    last_search_date: Option<NaiveDate>,
    subscription_tier: String,
    subscription_expires_at: Option<Timestamp>,
}

const COUNTER_COLUMNS: &str =
    "daily_search_count, last_search_date, subscription_tier, subscription_expires_at";

/// Usage counter persistence.
pub struct UsageRepo;

impl UsageRepo {
    /// Attempt one increment against an account's daily counter.
    ///
    /// Creates an anonymous account row when none exists (guest
    /// session ids arrive here before any login). Blocked attempts
    /// leave the stored count untouched.
    pub async fn increment_and_check(
        pool: &PgPool,
        user_id: &str,
        thresholds: WallThresholds,
        today: NaiveDate,
        now: Timestamp,
    ) -> Result<AccountUsage, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("INSERT INTO users (id, is_anonymous) VALUES ($1, TRUE) ON CONFLICT (id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let query = format!("SELECT {COUNTER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE");
        let row: CounterRow = sqlx::query_as(&query)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        let premium = usage::is_premium(
            SubscriptionTier::from_str_or_free(&row.subscription_tier),
            row.subscription_expires_at,
            now,
        );
        let snapshot = UsageSnapshot {
            daily_search_count: row.daily_search_count,
            last_search_date: row.last_search_date,
        };
        let decision = usage::evaluate(snapshot, today, thresholds, premium);

        if decision.allowed {
            sqlx::query(
                "UPDATE users SET daily_search_count = $2, last_search_date = $3 WHERE id = $1",
            )
            .bind(user_id)
            .bind(decision.new_count)
            .bind(today)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        if !decision.allowed {
            tracing::info!(user_id, count = decision.new_count, "hard wall blocked increment");
        }

        Ok(AccountUsage {
            allowed: decision.allowed,
            daily_search_count: decision.new_count,
            state: decision.state,
            premium,
        })
    }

    /// Read-only wall status; never advances the counter.
    pub async fn current(
        pool: &PgPool,
        user_id: &str,
        thresholds: WallThresholds,
        today: NaiveDate,
        now: Timestamp,
    ) -> Result<AccountUsage, sqlx::Error> {
        let query = format!("SELECT {COUNTER_COLUMNS} FROM users WHERE id = $1");
        let row: Option<CounterRow> = sqlx::query_as(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        let Some(row) = row else {
            return Ok(Self::fresh(false));
        };

        let premium = usage::is_premium(
            SubscriptionTier::from_str_or_free(&row.subscription_tier),
            row.subscription_expires_at,
            now,
        );
        // Stale last_search_date means the daily reset has effectively
        // already happened.
        let count = match row.last_search_date {
            Some(last) if last == today => row.daily_search_count,
            _ => 0,
        };
        let state = if premium {
            WallState::Free
        } else {
            usage::wall_state(count, thresholds)
        };

        Ok(AccountUsage { allowed: state != WallState::HardWall || premium, daily_search_count: count, state, premium })
    }

    /// Status handed out when the counter cannot be read or written.
    /// Lookup failures fail open: a broken counter must not block use.
    pub fn fresh(premium: bool) -> AccountUsage {
        AccountUsage {
            allowed: true,
            daily_search_count: 0,
            state: WallState::Free,
            premium,
        }
    }
}
