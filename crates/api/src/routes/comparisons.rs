//! Route definitions for the `/comparisons` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::comparisons;
use crate::state::AppState;

/// Routes mounted at `/comparisons`.
///
/// ```text
/// POST /run  -> run the pipeline, nothing persisted (guest ok)
/// POST /     -> save a confirmed record (requires auth)
/// GET  /     -> history newest-first (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/run", post(comparisons::run))
        .route("/", post(comparisons::save).get(comparisons::list))
}
