//! Repository for the `search_logs` table.

use sqlx::PgPool;

use crate::models::search_log::{CreateSearchLog, SearchLog};

const COLUMNS: &str = "id, user_id, query, result_count, best_price, created_at";

/// Search analytics persistence.
pub struct SearchLogRepo;

impl SearchLogRepo {
    /// Log one domestic search. Best-effort from the caller's side;
    /// failures here never fail a search.
    pub async fn create(pool: &PgPool, input: &CreateSearchLog) -> Result<SearchLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO search_logs (user_id, query, result_count, best_price)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SearchLog>(&query)
            .bind(&input.user_id)
            .bind(&input.query)
            .bind(input.result_count)
            .bind(input.best_price)
            .fetch_one(pool)
            .await
    }
}
