//! Shared test harness: full application router over stubbed external
//! collaborators, plus request helpers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use tabi_api::auth::jwt::{generate_access_token, JwtConfig};
use tabi_api::config::ServerConfig;
use tabi_api::routes;
use tabi_api::state::{AppState, Providers};
use tabi_providers::error::ProviderError;
use tabi_providers::exchange::{cross_convert, pair_rate, Conversion, CurrencyConverter, RateTable};
use tabi_providers::object_store::ObjectStore;
use tabi_providers::payment::{
    PaymentOrder, PaymentProcessor, PaymentStatus, PaymentVerification,
};
use tabi_providers::shopping::{SearchItem, ShoppingSearch};
use tabi_providers::vision::{
    PriceTag, PriceTagInfo, ProductAnalysis, ProductIdentity, VisionAnalyzer,
};

// ---------------------------------------------------------------------------
// Stub collaborators
// ---------------------------------------------------------------------------

/// Fixed USD rate table: 1 USD = 1350 KRW = 36 THB.
fn stub_rates() -> RateTable {
    HashMap::from([
        ("USD".to_string(), 1.0),
        ("KRW".to_string(), 1_350.0),
        ("THB".to_string(), 36.0),
        ("JPY".to_string(), 150.0),
    ])
}

struct StubConverter(RateTable);

#[async_trait]
impl CurrencyConverter for StubConverter {
    async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<Conversion, ProviderError> {
        Ok(Conversion {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            from_amount: amount,
            to_amount: cross_convert(amount, from, to, &self.0)?,
            exchange_rate: pair_rate(from, to, &self.0)?,
            last_updated: chrono::Utc::now(),
        })
    }

    async fn rate(&self, from: &str, to: &str) -> Result<f64, ProviderError> {
        pair_rate(from, to, &self.0)
    }
}

struct StubShopping(Vec<SearchItem>);

#[async_trait]
impl ShoppingSearch for StubShopping {
    async fn search(
        &self,
        _product_name: &str,
        max_results: usize,
    ) -> Result<Vec<SearchItem>, ProviderError> {
        Ok(self.0.iter().take(max_results).cloned().collect())
    }
}

struct StubVision;

#[async_trait]
impl VisionAnalyzer for StubVision {
    async fn analyze_product_with_price(
        &self,
        _image: &[u8],
        _mime_type: &str,
    ) -> Result<ProductAnalysis, ProviderError> {
        Ok(ProductAnalysis {
            product: ProductIdentity {
                name: "Shin Ramyun".to_string(),
                name_english: "Shin Ramyun".to_string(),
                name_korean: "농심 신라면".to_string(),
                brand: Some("농심".to_string()),
                description: None,
            },
            price_tag: PriceTag {
                detected: true,
                price: Some(45.0),
                currency: Some("THB".to_string()),
                currency_symbol: Some("฿".to_string()),
                raw_text: Some("45 THB".to_string()),
            },
            confidence: 0.92,
        })
    }

    async fn analyze_price_tag(
        &self,
        _image: &[u8],
        _mime_type: &str,
    ) -> Result<PriceTagInfo, ProviderError> {
        Ok(PriceTagInfo {
            price: 45.0,
            currency: "THB".to_string(),
            currency_symbol: "฿".to_string(),
            raw_text: "45 THB".to_string(),
            confidence: 0.9,
        })
    }
}

struct StubObjectStore;

#[async_trait]
impl ObjectStore for StubObjectStore {
    async fn upload(
        &self,
        _bytes: Vec<u8>,
        filename: &str,
        _mime_type: &str,
    ) -> Result<String, ProviderError> {
        Ok(format!("https://cdn.test/uploads/{filename}"))
    }
}

/// Gateway stub that reports every verification as paid with exactly
/// the expected amount and order reference.
struct StubPayments;

#[async_trait]
impl PaymentProcessor for StubPayments {
    async fn prepare(&self, order: &PaymentOrder) -> Result<String, ProviderError> {
        Ok(order.merchant_uid.clone())
    }

    async fn verify(
        &self,
        _receipt_id: &str,
        merchant_uid: &str,
        expected_amount: i64,
    ) -> Result<PaymentVerification, ProviderError> {
        Ok(PaymentVerification {
            status: PaymentStatus::Paid,
            amount: expected_amount,
            merchant_uid: merchant_uid.to_string(),
            receipt_url: None,
            paid_at: Some(chrono::Utc::now().timestamp()),
        })
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults and low wall
/// thresholds (soft 5, hard 10) so wall tests stay fast.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        soft_wall_at: 5,
        hard_wall_at: 10,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// One plausible domestic listing at 52000 KRW.
pub fn default_listings() -> Vec<SearchItem> {
    vec![SearchItem {
        product_name: "농심 신라면 멀티팩 20입".to_string(),
        price: 52_000,
        link: "https://search.shopping.naver.com/catalog/1".to_string(),
        affiliate_link: Some("https://search.shopping.naver.com/catalog/1?af_id=t".to_string()),
        image: String::new(),
        mall_name: "네이버쇼핑".to_string(),
        brand: Some("농심".to_string()),
        source: "naver",
    }]
}

/// Build the full application router with all middleware layers, using
/// the given database pool and stubbed collaborators.
///
/// This mirrors the router construction in `main.rs` so integration
/// tests exercise the same middleware stack (CORS, request ID,
/// timeout, tracing, panic recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_listings(pool, default_listings())
}

pub fn build_test_app_with_listings(pool: PgPool, listings: Vec<SearchItem>) -> Router {
    let config = test_config();

    let providers = Arc::new(Providers {
        vision: Arc::new(StubVision),
        converter: Arc::new(StubConverter(stub_rates())),
        shopping: Arc::new(StubShopping(listings)),
        object_store: Arc::new(StubObjectStore),
        domestic_payments: Arc::new(StubPayments),
        international_payments: Arc::new(StubPayments),
    });

    let state = AppState {
        pool,
        config: Arc::new(config),
        providers,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Mint a valid access token for the given account id.
pub fn token_for(account_id: &str) -> String {
    generate_access_token(account_id, &test_config().jwt).expect("token generation")
}

pub async fn get(app: Router, path: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn get_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(path)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json_auth(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body must be JSON")
}
