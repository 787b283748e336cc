//! Route tree assembly.

pub mod affiliate;
pub mod analysis;
pub mod auth;
pub mod comparisons;
pub mod exchange;
pub mod health;
pub mod images;
pub mod payments;
pub mod search;
pub mod usage;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                      exchange provider profile for a JWT (public)
/// /auth/user                       authenticated account profile
///
/// /images                          photo upload (multipart, public)
///
/// /analysis/product                product + price tag recognition (multipart)
/// /analysis/price-tag              price-tag-only OCR (multipart)
///
/// /exchange-rates/{from}/{to}      pair rate + timestamp
/// /currency/convert                amount conversion
///
/// /search/domestic                 domestic shopping search
///
/// /comparisons/run                 run the comparison pipeline (guest ok)
/// /comparisons                     save confirmed record (POST, auth),
///                                  history newest-first (GET, auth)
///
/// /usage/check                     increment-and-check the daily wall
/// /usage/current                   read-only wall status
///
/// /payments/prepare                register order with the gateway (auth)
/// /payments/verify                 verify payment, grant subscription (auth)
///
/// /track/click                     affiliate redirect (allow-listed hosts)
/// /affiliate/analytics             click counts + estimated revenue
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/images", images::router())
        .nest("/analysis", analysis::router())
        .nest("/exchange-rates", exchange::rates_router())
        .nest("/currency", exchange::currency_router())
        .nest("/search", search::router())
        .nest("/comparisons", comparisons::router())
        .nest("/usage", usage::router())
        .nest("/payments", payments::router())
        .nest("/track", affiliate::track_router())
        .nest("/affiliate", affiliate::analytics_router())
}
