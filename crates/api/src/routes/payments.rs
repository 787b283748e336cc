//! Route definitions for the `/payments` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Routes mounted at `/payments`.
///
/// ```text
/// POST /prepare  -> register order with the gateway (requires auth)
/// POST /verify   -> verify payment, grant subscription (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/prepare", post(payments::prepare))
        .route("/verify", post(payments::verify))
}
