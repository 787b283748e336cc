//! Route definitions for the `/images` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

/// Routes mounted at `/images`.
///
/// ```text
/// POST /  -> upload a product photo (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(images::upload))
}
