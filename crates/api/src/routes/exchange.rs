//! Route definitions for exchange rates and currency conversion.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::exchange;
use crate::state::AppState;

/// Routes mounted at `/exchange-rates`.
///
/// ```text
/// GET /{from}/{to}  -> pair rate + timestamp
/// ```
pub fn rates_router() -> Router<AppState> {
    Router::new().route("/{from}/{to}", get(exchange::get_rate))
}

/// Routes mounted at `/currency`.
///
/// ```text
/// POST /convert  -> convert a positive amount between supported codes
/// ```
pub fn currency_router() -> Router<AppState> {
    Router::new().route("/convert", post(exchange::convert))
}
