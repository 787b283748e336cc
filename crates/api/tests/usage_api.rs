//! Integration tests for the `/usage` wall endpoints.
//!
//! The test config sets the soft wall at 5 and the hard wall at 10 so
//! the full progression fits in a handful of requests.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::{body_json, build_test_app, get, post_json, post_json_auth, token_for};

#[sqlx::test(migrations = "../db/migrations")]
async fn guest_wall_progression_free_soft_hard(pool: PgPool) {
    let app = build_test_app(pool);
    let body = json!({"session_id": "sess-progression"});

    // Checks 1-4 stay free.
    for i in 1..=4 {
        let response = post_json(app.clone(), "/api/v1/usage/check", body.clone()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let usage = body_json(response).await;
        assert_eq!(usage["allowed"], true, "check {i}");
        assert_eq!(usage["daily_search_count"], i);
        assert_eq!(usage["state"], "free");
        assert_eq!(usage["premium"], false);
    }

    // Check 5 crosses the soft wall but is still permitted.
    let usage = body_json(post_json(app.clone(), "/api/v1/usage/check", body.clone()).await).await;
    assert_eq!(usage["allowed"], true);
    assert_eq!(usage["daily_search_count"], 5);
    assert_eq!(usage["state"], "soft_wall");

    // Checks 6-10 remain permitted; the 10th lands on the hard wall.
    for i in 6..=10 {
        let usage =
            body_json(post_json(app.clone(), "/api/v1/usage/check", body.clone()).await).await;
        assert_eq!(usage["allowed"], true, "check {i}");
        assert_eq!(usage["daily_search_count"], i);
    }

    // Check 11 is blocked and the counter stops moving.
    let response = post_json(app.clone(), "/api/v1/usage/check", body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let usage = body_json(response).await;
    assert_eq!(usage["allowed"], false);
    assert_eq!(usage["daily_search_count"], 10);
    assert_eq!(usage["state"], "hard_wall");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn current_is_read_only(pool: PgPool) {
    let app = build_test_app(pool);
    let body = json!({"session_id": "sess-current"});

    for _ in 0..3 {
        post_json(app.clone(), "/api/v1/usage/check", body.clone()).await;
    }

    // Repeated reads never advance the counter.
    for _ in 0..5 {
        let response = get(app.clone(), "/api/v1/usage/current?session_id=sess-current").await;
        assert_eq!(response.status(), StatusCode::OK);
        let usage = body_json(response).await;
        assert_eq!(usage["daily_search_count"], 3);
        assert_eq!(usage["state"], "free");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn guest_without_session_id_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(app.clone(), "/api/v1/usage/check", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(app.clone(), "/api/v1/usage/check", json!({"session_id": "  "})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(app, "/api/v1/usage/current").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unavailable_counter_fails_open(pool: PgPool) {
    let app = build_test_app(pool.clone());

    // Closing the pool makes every counter lookup fail; the wall must
    // let the user through with a fresh state rather than block.
    pool.close().await;

    let response = post_json(
        app.clone(),
        "/api/v1/usage/check",
        json!({"session_id": "sess-broken"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let usage = body_json(response).await;
    assert_eq!(usage["allowed"], true);
    assert_eq!(usage["daily_search_count"], 0);
    assert_eq!(usage["state"], "free");
    assert_eq!(usage["premium"], false);

    // The read-only endpoint fails open the same way.
    let usage = body_json(get(app, "/api/v1/usage/current?session_id=sess-broken").await).await;
    assert_eq!(usage["allowed"], true);
    assert_eq!(usage["daily_search_count"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn token_identity_wins_over_session_id(pool: PgPool) {
    let app = build_test_app(pool);

    // Sign in so the token's account exists.
    let login = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({"id": "acct-token", "email": "token@example.com"}),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);
    let token = token_for("acct-token");

    // Two authenticated checks, each smuggling a different session id.
    for _ in 0..2 {
        post_json_auth(
            app.clone(),
            "/api/v1/usage/check",
            &token,
            json!({"session_id": "sess-ignored"}),
        )
        .await;
    }

    // The token's account carries the count; the session id never got one.
    let usage =
        body_json(common::get_auth(app.clone(), "/api/v1/usage/current", &token).await).await;
    assert_eq!(usage["daily_search_count"], 2);

    let guest =
        body_json(get(app, "/api/v1/usage/current?session_id=sess-ignored").await).await;
    assert_eq!(guest["daily_search_count"], 0);
}
