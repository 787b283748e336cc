//! Handlers for the `/comparisons` resource.
//!
//! `run` executes the pipeline and returns the outcome without writing
//! anything; nothing is persisted until the client explicitly confirms
//! via `save`. That split keeps a dropped request side-effect free and
//! lets guests run comparisons without an account.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tabi_db::models::price_comparison::{CreatePriceComparison, PriceComparison};
use tabi_db::repositories::{ComparisonRepo, UsageRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::pipeline::{self, ComparisonRequest};
use crate::state::AppState;

/// POST /api/v1/comparisons/run
///
/// Run the comparison pipeline. Guest-accessible; always yields a
/// terminal record with a savings tier, degrading locally on
/// collaborator failure.
pub async fn run(
    State(state): State<AppState>,
    Json(input): Json<ComparisonRequest>,
) -> AppResult<Json<tabi_core::comparison::ComparisonOutcome>> {
    if input.product_name.trim().is_empty() {
        return Err(AppError::BadRequest("product_name must not be empty".into()));
    }
    if !input.local_price.is_finite() || input.local_price <= 0.0 {
        return Err(AppError::BadRequest("local_price must be positive".into()));
    }

    let outcome = pipeline::run_comparison(
        state.providers.converter.as_ref(),
        state.providers.shopping.as_ref(),
        &input,
    )
    .await;

    Ok(Json(outcome))
}

#[derive(Debug, Serialize)]
pub struct SaveComparisonResponse {
    pub comparison: PriceComparison,
}

/// POST /api/v1/comparisons
///
/// Persist a confirmed comparison to the account's durable history,
/// accumulate its absolute savings, and advance the daily usage
/// counter. Requires authentication -- guests keep their history
/// on-device and advance the wall via `/usage/check`.
pub async fn save(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreatePriceComparison>,
) -> AppResult<Json<SaveComparisonResponse>> {
    if input.product_name.trim().is_empty() {
        return Err(AppError::BadRequest("product_name must not be empty".into()));
    }

    let comparison = ComparisonRepo::create(&state.pool, &user.user_id, &input).await?;
    UserRepo::add_total_savings(&state.pool, &user.user_id, comparison.savings_amount).await?;

    // Confirmation is the "comparison completed" event for the wall.
    // Best-effort: a blocked or failed increment never loses the saved
    // record.
    let now = Utc::now();
    if let Err(e) = UsageRepo::increment_and_check(
        &state.pool,
        &user.user_id,
        state.config.wall_thresholds(),
        now.date_naive(),
        now,
    )
    .await
    {
        tracing::warn!(user_id = %user.user_id, error = %e, "usage counter not advanced on save");
    }

    tracing::info!(
        user_id = %user.user_id,
        comparison_id = %comparison.id,
        savings = comparison.savings_amount,
        "comparison saved"
    );
    Ok(Json(SaveComparisonResponse { comparison }))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/comparisons?limit=
///
/// The account's comparison history, newest first.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<PriceComparison>>> {
    let comparisons =
        ComparisonRepo::list_for_user(&state.pool, &user.user_id, query.limit).await?;
    Ok(Json(comparisons))
}
