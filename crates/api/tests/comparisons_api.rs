//! Integration tests for the comparison pipeline and history endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::{
    body_json, build_test_app, build_test_app_with_listings, get_auth, post_json, post_json_auth,
    token_for,
};

fn run_request() -> serde_json::Value {
    json!({
        "product_name": "Shin Ramyun",
        "product_name_korean": "농심 신라면",
        "local_price": 1200.0,
        "local_currency": "THB"
    })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn run_finds_a_domestic_price_and_classifies_it(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(app, "/api/v1/comparisons/run", run_request()).await;
    assert_eq!(response.status(), StatusCode::OK);

    // 1200 THB at the stub rates is 45000 KRW against a 52000 KRW
    // domestic listing: 7000 KRW saved, 15.6% of the local total.
    let outcome = body_json(response).await;
    assert_eq!(outcome["converted_local_price"], 45_000);
    assert_eq!(outcome["domestic_price"], 52_000);
    assert_eq!(outcome["savings_amount"], 7_000);
    assert_eq!(outcome["savings_tier"], "excellent-deal");
    assert_eq!(outcome["comparison_source"], "네이버쇼핑");
    assert_eq!(outcome["status"], "completed");
    assert!(outcome["product_link"]
        .as_str()
        .unwrap()
        .contains("af_id="));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn run_with_no_relevant_listing_degrades_to_no_data(pool: PgPool) {
    // Only listing is an unrelated accessory, which relevance filters out.
    let app = build_test_app_with_listings(
        pool,
        vec![tabi_providers::shopping::SearchItem {
            product_name: "냄비 전용 뚜껑 거치대".to_string(),
            price: 52_000,
            link: "https://search.shopping.naver.com/catalog/9".to_string(),
            affiliate_link: None,
            image: String::new(),
            mall_name: "네이버쇼핑".to_string(),
            brand: None,
            source: "naver",
        }],
    );

    let response = post_json(app, "/api/v1/comparisons/run", run_request()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let outcome = body_json(response).await;
    assert_eq!(outcome["domestic_price"], 0);
    assert_eq!(outcome["savings_amount"], 0);
    assert_eq!(outcome["savings_tier"], "no-data");
    assert_eq!(outcome["comparison_source"], "한국 가격 정보 없음");
    assert_eq!(outcome["status"], "completed");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn run_rejects_invalid_input(pool: PgPool) {
    let app = build_test_app(pool);

    let mut bad = run_request();
    bad["product_name"] = json!("   ");
    let response = post_json(app.clone(), "/api/v1/comparisons/run", bad).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut bad = run_request();
    bad["local_price"] = json!(-5.0);
    let response = post_json(app, "/api/v1/comparisons/run", bad).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

fn save_request() -> serde_json::Value {
    json!({
        "product_name": "Shin Ramyun",
        "product_name_korean": "농심 신라면",
        "brand": "농심",
        "local_price": 1200.0,
        "local_currency": "THB",
        "converted_local_price": 45_000,
        "domestic_price": 52_000,
        "savings_amount": 7_000,
        "savings_tier": "excellent-deal",
        "domestic_source": "네이버쇼핑",
        "domestic_link": "https://search.shopping.naver.com/catalog/1",
        "product_image_url": null,
        "ocr_raw_text": "45 THB",
        "status": "completed"
    })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn save_requires_authentication(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(app, "/api/v1/comparisons", save_request()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn save_then_list_round_trip(pool: PgPool) {
    let app = build_test_app(pool);

    // Sign in to create the account and get a token.
    let login = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({"id": "acct-saver", "email": "saver@example.com"}),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);
    let token = body_json(login).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = post_json_auth(app.clone(), "/api/v1/comparisons", &token, save_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let saved = body_json(response).await;
    assert_eq!(saved["comparison"]["user_id"], "acct-saver");
    assert_eq!(saved["comparison"]["savings_amount"], 7_000);

    // History comes back with the record, and the account's lifetime
    // savings accumulated.
    let response = get_auth(app.clone(), "/api/v1/comparisons", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let history = body_json(response).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["product_name"], "Shin Ramyun");

    let profile = body_json(get_auth(app.clone(), "/api/v1/auth/user", &token).await).await;
    assert_eq!(profile["total_savings"], 7_000);

    // The confirmed save advanced the daily counter.
    let usage = body_json(get_auth(app, "/api/v1/usage/current", &token).await).await;
    assert_eq!(usage["daily_search_count"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_is_scoped_to_the_token(pool: PgPool) {
    let app = build_test_app(pool);

    for id in ["acct-a", "acct-b"] {
        let login = post_json(app.clone(), "/api/v1/auth/login", json!({"id": id})).await;
        assert_eq!(login.status(), StatusCode::OK);
    }
    let token_a = token_for("acct-a");
    let token_b = token_for("acct-b");

    post_json_auth(app.clone(), "/api/v1/comparisons", &token_a, save_request()).await;

    let own = body_json(get_auth(app.clone(), "/api/v1/comparisons", &token_a).await).await;
    assert_eq!(own.as_array().unwrap().len(), 1);

    let other = body_json(get_auth(app, "/api/v1/comparisons", &token_b).await).await;
    assert!(other.as_array().unwrap().is_empty());
}
