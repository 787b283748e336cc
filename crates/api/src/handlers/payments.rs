//! Handlers for the `/payments` resource: premium subscription
//! purchase.
//!
//! `prepare` registers the order amount with the gateway before the
//! client-side widget runs, so the widget cannot tamper with it.
//! `verify` re-checks the completed payment server-side and only then
//! grants the subscription tier.

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tabi_core::error::CoreError;
use tabi_core::usage::SubscriptionTier;
use tabi_db::repositories::UserRepo;
use tabi_providers::payment::{PaymentOrder, PaymentStatus, PaymentVerification};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Subscription price table, KRW per tier.
fn tier_price(tier: SubscriptionTier) -> Option<i64> {
    match tier {
        SubscriptionTier::Free => None,
        SubscriptionTier::Daily => Some(1_900),
        SubscriptionTier::Weekly => Some(4_900),
        SubscriptionTier::Monthly => Some(9_900),
    }
}

fn tier_duration(tier: SubscriptionTier) -> Option<Duration> {
    match tier {
        SubscriptionTier::Free => None,
        SubscriptionTier::Daily => Some(Duration::days(1)),
        SubscriptionTier::Weekly => Some(Duration::days(7)),
        SubscriptionTier::Monthly => Some(Duration::days(30)),
    }
}

/// Request body for `POST /payments/prepare`.
#[derive(Debug, Deserialize)]
pub struct PrepareRequest {
    pub tier: String,
    /// Buyer country (ISO 3166-1 alpha-2); selects the gateway.
    pub country: Option<String>,
    pub buyer_name: Option<String>,
    pub buyer_email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PrepareResponse {
    pub merchant_uid: String,
    pub amount: i64,
    pub tier: String,
}

/// POST /api/v1/payments/prepare
pub async fn prepare(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<PrepareRequest>,
) -> AppResult<Json<PrepareResponse>> {
    let tier = SubscriptionTier::from_str_or_free(&input.tier);
    let amount = tier_price(tier)
        .ok_or_else(|| AppError::BadRequest(format!("not a purchasable tier: {}", input.tier)))?;

    let merchant_uid = format!("tabi_{}_{}", tier.as_str(), Uuid::new_v4().simple());
    let order = PaymentOrder {
        merchant_uid: merchant_uid.clone(),
        amount,
        product_name: format!("tabi premium ({})", tier.as_str()),
        buyer_name: input.buyer_name.unwrap_or_else(|| user.user_id.clone()),
        buyer_email: input.buyer_email,
    };

    let processor = state.providers.payments_for(input.country.as_deref());
    let merchant_uid = processor.prepare(&order).await?;

    tracing::info!(user_id = %user.user_id, merchant_uid = %merchant_uid, amount, "payment prepared");

    Ok(Json(PrepareResponse {
        merchant_uid,
        amount,
        tier: tier.as_str().to_string(),
    }))
}

/// Request body for `POST /payments/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// Gateway-side payment/receipt id.
    pub receipt_id: String,
    pub merchant_uid: String,
    pub tier: String,
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub verification: PaymentVerification,
    pub granted_tier: Option<String>,
    pub expires_at: Option<chrono::DateTime<Utc>>,
}

/// POST /api/v1/payments/verify
///
/// Verify the completed payment with the gateway. Amount and order
/// reference mismatches are rejected by the processor; only a `paid`
/// status grants the tier. Idempotent by merchant_uid: re-verifying a
/// paid order re-grants the same entitlement.
pub async fn verify(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<VerifyRequest>,
) -> AppResult<Json<VerifyResponse>> {
    let tier = SubscriptionTier::from_str_or_free(&input.tier);
    let expected_amount = tier_price(tier)
        .ok_or_else(|| AppError::BadRequest(format!("not a purchasable tier: {}", input.tier)))?;

    let processor = state.providers.payments_for(input.country.as_deref());
    let verification = processor
        .verify(&input.receipt_id, &input.merchant_uid, expected_amount)
        .await?;

    let (granted_tier, expires_at) = if verification.status == PaymentStatus::Paid {
        let duration = tier_duration(tier).ok_or_else(|| {
            AppError::Core(CoreError::Internal("purchasable tier without duration".into()))
        })?;
        let expires_at = Utc::now() + duration;

        let granted = UserRepo::grant_subscription(&state.pool, &user.user_id, tier, expires_at)
            .await?;
        if !granted {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "user",
                id: user.user_id,
            }));
        }

        tracing::info!(
            user_id = %user.user_id,
            tier = tier.as_str(),
            merchant_uid = %input.merchant_uid,
            "subscription granted"
        );
        (Some(tier.as_str().to_string()), Some(expires_at))
    } else {
        tracing::warn!(
            user_id = %user.user_id,
            status = ?verification.status,
            merchant_uid = %input.merchant_uid,
            "payment verified but not paid"
        );
        (None, None)
    };

    Ok(Json(VerifyResponse { verification, granted_tier, expires_at }))
}
