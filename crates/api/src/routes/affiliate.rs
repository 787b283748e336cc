//! Route definitions for affiliate tracking and analytics.

use axum::routing::get;
use axum::Router;

use crate::handlers::affiliate;
use crate::state::AppState;

/// Routes mounted at `/track`.
///
/// ```text
/// GET /click  -> affiliate redirect (allow-listed hosts only)
/// ```
pub fn track_router() -> Router<AppState> {
    Router::new().route("/click", get(affiliate::click))
}

/// Routes mounted at `/affiliate`.
///
/// ```text
/// GET /analytics  -> click counts + estimated revenue
/// ```
pub fn analytics_router() -> Router<AppState> {
    Router::new().route("/analytics", get(affiliate::analytics))
}
