//! Search analytics model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tabi_core::types::{AccountId, Krw, Timestamp};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SearchLog {
    pub id: Uuid,
    pub user_id: Option<AccountId>,
    pub query: String,
    pub result_count: i32,
    pub best_price: Option<Krw>,
    pub created_at: Timestamp,
}

/// DTO for logging a domestic search.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSearchLog {
    pub user_id: Option<AccountId>,
    pub query: String,
    pub result_count: i32,
    pub best_price: Option<Krw>,
}
