//! Handlers for the `/analysis` resource: vision recognition of
//! product photos and price tags.

use axum::extract::{Multipart, State};
use axum::Json;
use tabi_providers::vision::{PriceTagInfo, ProductAnalysis};

use crate::error::AppResult;
use crate::handlers::images::read_image_field;
use crate::state::AppState;

/// POST /api/v1/analysis/product
///
/// Combined product identification + price tag extraction from one
/// photo.
pub async fn product(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ProductAnalysis>> {
    let (bytes, mime_type) = read_image_field(&mut multipart).await?;

    let analysis = state
        .providers
        .vision
        .analyze_product_with_price(&bytes, &mime_type)
        .await?;

    tracing::debug!(
        product = %analysis.product.name,
        price_tag = analysis.price_tag.detected,
        confidence = analysis.confidence,
        "product analysis complete"
    );
    Ok(Json(analysis))
}

/// POST /api/v1/analysis/price-tag
///
/// Price-tag-only OCR, for when the user reshoots just the tag.
pub async fn price_tag(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<PriceTagInfo>> {
    let (bytes, mime_type) = read_image_field(&mut multipart).await?;

    let info = state
        .providers
        .vision
        .analyze_price_tag(&bytes, &mime_type)
        .await?;
    Ok(Json(info))
}
