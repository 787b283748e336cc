//! Route definitions for the `/search` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::search;
use crate::state::AppState;

/// Routes mounted at `/search`.
///
/// ```text
/// POST /domestic  -> domestic shopping search (guest ok)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/domestic", post(search::domestic))
}
