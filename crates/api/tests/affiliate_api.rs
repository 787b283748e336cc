//! Integration tests for affiliate click-through tracking.

mod common;

use axum::http::{header::LOCATION, StatusCode};
use sqlx::PgPool;

use common::{body_json, build_test_app, get};

#[sqlx::test(migrations = "../db/migrations")]
async fn click_redirects_and_records_the_listing_id(pool: PgPool) {
    let app = build_test_app(pool.clone());

    let response = get(
        app.clone(),
        "/api/v1/track/click?url=https%3A%2F%2Fsearch.shopping.naver.com%2Fcatalog%2F123&product=%EC%8B%A0%EB%9D%BC%EB%A9%B4",
    )
    .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let location = response.headers().get(LOCATION).unwrap().to_str().unwrap();
    assert!(location.starts_with("https://search.shopping.naver.com/catalog/123"));
    assert!(location.contains("af_id="));

    let (platform, product_id): (String, Option<String>) =
        sqlx::query_as("SELECT platform, product_id FROM affiliate_clicks")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(platform, "naver");
    assert_eq!(product_id.as_deref(), Some("123"));

    let analytics = body_json(get(app, "/api/v1/affiliate/analytics").await).await;
    assert_eq!(analytics["total_clicks"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn click_refuses_non_allow_listed_targets(pool: PgPool) {
    let app = build_test_app(pool.clone());

    let response = get(
        app,
        "/api/v1/track/click?url=https%3A%2F%2Fevil.example.com%2Fphish",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM affiliate_clicks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
