//! Handler for the `/search` resource: domestic shopping search.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tabi_db::models::search_log::CreateSearchLog;
use tabi_db::repositories::SearchLogRepo;
use tabi_providers::shopping::SearchItem;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::OptionalAuthUser;
use crate::state::AppState;

const DEFAULT_MAX_RESULTS: usize = 10;
const MAX_MAX_RESULTS: usize = 30;

/// Request body for `POST /search/domestic`.
#[derive(Debug, Deserialize)]
pub struct DomesticSearchRequest {
    pub product_name: String,
    pub max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct DomesticSearchResponse {
    pub items: Vec<SearchItem>,
    pub count: usize,
}

/// POST /api/v1/search/domestic
///
/// Cleaned, price-ascending search results for a product name.
/// Guest-accessible; the search is logged best-effort for analytics.
pub async fn domestic(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    Json(input): Json<DomesticSearchRequest>,
) -> AppResult<Json<DomesticSearchResponse>> {
    let product_name = input.product_name.trim();
    if product_name.is_empty() {
        return Err(AppError::BadRequest("product_name must not be empty".into()));
    }
    let max_results = input
        .max_results
        .unwrap_or(DEFAULT_MAX_RESULTS)
        .clamp(1, MAX_MAX_RESULTS);

    let items = state
        .providers
        .shopping
        .search(product_name, max_results)
        .await?;

    let log = CreateSearchLog {
        user_id: user.map(|u| u.user_id),
        query: product_name.to_string(),
        result_count: items.len() as i32,
        best_price: items.first().map(|i| i.price),
    };
    if let Err(e) = SearchLogRepo::create(&state.pool, &log).await {
        tracing::warn!(error = %e, "failed to log search");
    }

    let count = items.len();
    Ok(Json(DomesticSearchResponse { items, count }))
}
