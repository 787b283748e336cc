//! Handlers for the `/auth` resource.
//!
//! Sign-in happens against an external identity provider; the client
//! exchanges the verified profile for a service JWT here. There is no
//! password flow and no refresh flow -- tokens are short-lived and the
//! client re-exchanges on expiry.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tabi_core::error::CoreError;
use tabi_db::models::user::{UpsertUser, User};
use tabi_db::repositories::UserRepo;

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Stable subject from the identity provider.
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: User,
}

/// POST /api/v1/auth/login
///
/// Upsert the account from the provider profile and issue a service
/// token. Claims a previously anonymous session account if the ids
/// coincide.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    if input.id.trim().is_empty() {
        return Err(AppError::BadRequest("account id must not be empty".into()));
    }

    let user = UserRepo::upsert(
        &state.pool,
        &UpsertUser {
            id: input.id,
            email: input.email,
            display_name: input.display_name,
            profile_image_url: input.profile_image_url,
            country: input.country,
            language: input.language,
        },
    )
    .await?;

    let access_token = generate_access_token(&user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = %user.id, "account signed in");

    Ok(Json(AuthResponse {
        access_token,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user,
    }))
}

/// GET /api/v1/auth/user
///
/// Profile of the authenticated account.
pub async fn current_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<User>> {
    let account = UserRepo::find_by_id(&state.pool, &user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: user.user_id,
        }))?;
    Ok(Json(account))
}
