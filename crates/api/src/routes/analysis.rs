//! Route definitions for the `/analysis` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::analysis;
use crate::state::AppState;

/// Routes mounted at `/analysis`.
///
/// ```text
/// POST /product    -> product + price tag recognition (multipart)
/// POST /price-tag  -> price-tag-only OCR (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/product", post(analysis::product))
        .route("/price-tag", post(analysis::price_tag))
}
