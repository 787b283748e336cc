//! Route definitions for the `/usage` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::usage;
use crate::state::AppState;

/// Routes mounted at `/usage`.
///
/// ```text
/// POST /check    -> increment-and-check the daily wall
/// GET  /current  -> read-only wall status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/check", post(usage::check))
        .route("/current", get(usage::current))
}
