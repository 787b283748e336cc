//! Handlers for exchange rates and currency conversion.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tabi_core::currency::is_supported;
use tabi_providers::exchange::Conversion;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Request body for `POST /currency/convert`.
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

fn normalize_code(code: &str) -> Result<String, AppError> {
    let code = code.trim().to_uppercase();
    if !is_supported(&code) {
        return Err(AppError::BadRequest(format!("unsupported currency: {code}")));
    }
    Ok(code)
}

/// GET /api/v1/exchange-rates/{from}/{to}
pub async fn get_rate(
    State(state): State<AppState>,
    Path((from, to)): Path<(String, String)>,
) -> AppResult<Json<RateResponse>> {
    let from = normalize_code(&from)?;
    let to = normalize_code(&to)?;

    let rate = state.providers.converter.rate(&from, &to).await?;

    Ok(Json(RateResponse {
        from,
        to,
        rate,
        timestamp: chrono::Utc::now(),
    }))
}

/// POST /api/v1/currency/convert
pub async fn convert(
    State(state): State<AppState>,
    Json(input): Json<ConvertRequest>,
) -> AppResult<Json<Conversion>> {
    if !input.amount.is_finite() || input.amount <= 0.0 {
        return Err(AppError::BadRequest("amount must be positive".into()));
    }
    let from = normalize_code(&input.from)?;
    let to = normalize_code(&input.to)?;

    let conversion = state
        .providers
        .converter
        .convert(input.amount, &from, &to)
        .await?;
    Ok(Json(conversion))
}
