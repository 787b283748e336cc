//! Handlers for the `/usage` resource: the authoritative account-side
//! usage wall.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tabi_db::repositories::{AccountUsage, UsageRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::OptionalAuthUser;
use crate::state::AppState;

/// Request body for `POST /usage/check`. Guests identify themselves
/// with an opaque session id when no token is present.
#[derive(Debug, Default, Deserialize)]
pub struct UsageCheckRequest {
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UsageQuery {
    pub session_id: Option<String>,
}

fn resolve_account(
    user: Option<crate::middleware::auth::AuthUser>,
    session_id: Option<String>,
) -> Result<String, AppError> {
    if let Some(user) = user {
        return Ok(user.user_id);
    }
    session_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("session_id required for guest usage checks".into()))
}

/// POST /api/v1/usage/check
///
/// Attempt one increment against the daily counter. A hard wall comes
/// back as a structured `allowed = false` payload, not an error; a
/// broken counter fails open rather than blocking use.
pub async fn check(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    body: Option<Json<UsageCheckRequest>>,
) -> AppResult<Json<AccountUsage>> {
    let session_id = body.and_then(|Json(b)| b.session_id);
    let account_id = resolve_account(user, session_id)?;

    let now = Utc::now();
    let usage = match UsageRepo::increment_and_check(
        &state.pool,
        &account_id,
        state.config.wall_thresholds(),
        now.date_naive(),
        now,
    )
    .await
    {
        Ok(usage) => usage,
        Err(e) => {
            tracing::warn!(user_id = %account_id, error = %e, "usage counter unavailable, failing open");
            UsageRepo::fresh(false)
        }
    };

    Ok(Json(usage))
}

/// GET /api/v1/usage/current?session_id=
///
/// Read-only wall status; never advances the counter.
pub async fn current(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    Query(query): Query<UsageQuery>,
) -> AppResult<Json<AccountUsage>> {
    let account_id = resolve_account(user, query.session_id)?;

    let now = Utc::now();
    let usage = match UsageRepo::current(
        &state.pool,
        &account_id,
        state.config.wall_thresholds(),
        now.date_naive(),
        now,
    )
    .await
    {
        Ok(usage) => usage,
        Err(e) => {
            tracing::warn!(user_id = %account_id, error = %e, "usage counter unavailable, failing open");
            UsageRepo::fresh(false)
        }
    };

    Ok(Json(usage))
}
