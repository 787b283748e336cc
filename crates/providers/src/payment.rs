//! Payment collaborator.
//!
//! Two gateways sit behind one [`PaymentProcessor`] trait: Iamport for
//! domestic (KR) buyers and Stripe for everyone else, selected by
//! [`processor_for_country`]. Verification is the security boundary --
//! the paid amount and the order reference must both match what the
//! server expects before any entitlement is granted, and re-verifying
//! the same order reference is harmless (idempotent check, no side
//! effects here).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use tabi_core::types::Timestamp;

use crate::error::ProviderError;

// ---------------------------------------------------------------------------
// Trait + shared types
// ---------------------------------------------------------------------------

/// Order details registered before the client-side payment widget runs.
#[derive(Debug, Clone)]
pub struct PaymentOrder {
    /// Merchant-side order reference, unique per purchase attempt.
    pub merchant_uid: String,
    /// Expected amount in KRW.
    pub amount: i64,
    pub product_name: String,
    pub buyer_name: String,
    pub buyer_email: Option<String>,
}

/// Gateway-reported payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Ready,
    Paid,
    Cancelled,
    Failed,
}

/// Result of a server-side verification call.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentVerification {
    pub status: PaymentStatus,
    pub amount: i64,
    pub merchant_uid: String,
    pub receipt_url: Option<String>,
    pub paid_at: Option<i64>,
}

/// Payment gateway seam.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Pre-register an order with the gateway so the client widget
    /// cannot tamper with the amount.
    async fn prepare(&self, order: &PaymentOrder) -> Result<String, ProviderError>;

    /// Verify a completed payment. Implementations must reject amount
    /// and order-reference mismatches with [`ProviderError::Rejected`].
    async fn verify(
        &self,
        receipt_id: &str,
        merchant_uid: &str,
        expected_amount: i64,
    ) -> Result<PaymentVerification, ProviderError>;
}

/// Pick the gateway for a buyer's country (ISO 3166-1 alpha-2).
///
/// Domestic buyers pay through Iamport (card, KakaoPay, Toss);
/// everyone else goes through the international gateway.
pub fn processor_for_country(country: Option<&str>) -> GatewayKind {
    match country {
        Some("KR") | None => GatewayKind::Domestic,
        Some(_) => GatewayKind::International,
    }
}

/// Which of the two configured gateways to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayKind {
    Domestic,
    International,
}

/// Shared mismatch checks used by both gateways after fetching the
/// gateway's view of the payment.
fn check_mismatch(
    gateway_amount: i64,
    gateway_uid: &str,
    expected_amount: i64,
    expected_uid: &str,
) -> Result<(), ProviderError> {
    if gateway_amount != expected_amount {
        return Err(ProviderError::Rejected(format!(
            "payment amount mismatch: expected {expected_amount}, gateway reports {gateway_amount}"
        )));
    }
    if gateway_uid != expected_uid {
        return Err(ProviderError::Rejected(format!(
            "order reference mismatch: expected {expected_uid}, gateway reports {gateway_uid}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Iamport (domestic)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct IamportEnvelope<T> {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    response: Option<T>,
}

#[derive(Debug, Deserialize)]
struct IamportToken {
    access_token: String,
    /// Unix seconds.
    expired_at: i64,
}

#[derive(Debug, Deserialize)]
struct IamportPayment {
    merchant_uid: String,
    amount: i64,
    status: String,
    #[serde(default)]
    paid_at: Option<i64>,
    #[serde(default)]
    receipt_url: Option<String>,
}

struct CachedToken {
    token: String,
    expires_at: Timestamp,
}

/// Iamport REST client with access-token caching.
pub struct IamportProcessor {
    client: reqwest::Client,
    api_key: String,
    api_secret: String,
    base_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl IamportProcessor {
    pub fn new(client: reqwest::Client, api_key: String, api_secret: String) -> Self {
        Self {
            client,
            api_key,
            api_secret,
            base_url: "https://api.iamport.kr".into(),
            token: Mutex::new(None),
        }
    }

    /// Read `IMP_KEY` / `IMP_SECRET` from the environment.
    pub fn from_env(client: reqwest::Client) -> Result<Self, ProviderError> {
        let api_key = std::env::var("IMP_KEY").map_err(|_| ProviderError::Credentials {
            provider: "iamport",
            detail: "IMP_KEY not set",
        })?;
        let api_secret = std::env::var("IMP_SECRET").map_err(|_| ProviderError::Credentials {
            provider: "iamport",
            detail: "IMP_SECRET not set",
        })?;
        Ok(Self::new(client, api_key, api_secret))
    }

    /// Override the endpoint, for tests against a local server.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn access_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.token.lock().await;
        if let Some(t) = cached.as_ref() {
            if t.expires_at > chrono::Utc::now() {
                return Ok(t.token.clone());
            }
        }

        let envelope: IamportEnvelope<IamportToken> = self
            .client
            .post(format!("{}/users/getToken", self.base_url))
            .json(&serde_json::json!({
                "imp_key": self.api_key,
                "imp_secret": self.api_secret,
            }))
            .send()
            .await?
            .json()
            .await?;

        let token = envelope.response.filter(|_| envelope.code == 0).ok_or_else(|| {
            ProviderError::Malformed {
                provider: "iamport",
                detail: format!("token request refused: {}", envelope.message.unwrap_or_default()),
            }
        })?;

        let expires_at = chrono::DateTime::from_timestamp(token.expired_at, 0)
            .unwrap_or_else(chrono::Utc::now);
        *cached = Some(CachedToken { token: token.access_token.clone(), expires_at });
        Ok(token.access_token)
    }
}

#[async_trait]
impl PaymentProcessor for IamportProcessor {
    async fn prepare(&self, order: &PaymentOrder) -> Result<String, ProviderError> {
        let token = self.access_token().await?;

        let envelope: IamportEnvelope<serde_json::Value> = self
            .client
            .post(format!("{}/payments/prepare", self.base_url))
            .bearer_auth(&token)
            .json(&serde_json::json!({
                "merchant_uid": order.merchant_uid,
                "amount": order.amount,
            }))
            .send()
            .await?
            .json()
            .await?;

        if envelope.code != 0 {
            return Err(ProviderError::Malformed {
                provider: "iamport",
                detail: format!(
                    "payment preparation refused: {}",
                    envelope.message.unwrap_or_default()
                ),
            });
        }

        tracing::info!(merchant_uid = %order.merchant_uid, amount = order.amount,
            "payment order registered with iamport");
        Ok(order.merchant_uid.clone())
    }

    async fn verify(
        &self,
        receipt_id: &str,
        merchant_uid: &str,
        expected_amount: i64,
    ) -> Result<PaymentVerification, ProviderError> {
        let token = self.access_token().await?;

        let envelope: IamportEnvelope<IamportPayment> = self
            .client
            .get(format!("{}/payments/{receipt_id}", self.base_url))
            .bearer_auth(&token)
            .send()
            .await?
            .json()
            .await?;

        let payment = envelope.response.filter(|_| envelope.code == 0).ok_or_else(|| {
            ProviderError::Malformed {
                provider: "iamport",
                detail: format!("lookup refused: {}", envelope.message.unwrap_or_default()),
            }
        })?;

        check_mismatch(payment.amount, &payment.merchant_uid, expected_amount, merchant_uid)?;

        let status = match payment.status.as_str() {
            "ready" => PaymentStatus::Ready,
            "paid" => PaymentStatus::Paid,
            "cancelled" => PaymentStatus::Cancelled,
            _ => PaymentStatus::Failed,
        };

        Ok(PaymentVerification {
            status,
            amount: payment.amount,
            merchant_uid: payment.merchant_uid,
            receipt_url: payment.receipt_url,
            paid_at: payment.paid_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Stripe (international)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    id: String,
    amount: i64,
    status: String,
    #[serde(default)]
    metadata: std::collections::HashMap<String, String>,
}

/// Minimal Stripe payment-intent client for international buyers.
pub struct StripeProcessor {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl StripeProcessor {
    pub fn new(client: reqwest::Client, secret_key: String) -> Self {
        Self { client, secret_key, base_url: "https://api.stripe.com/v1".into() }
    }

    /// Read `STRIPE_SECRET_KEY` from the environment.
    pub fn from_env(client: reqwest::Client) -> Result<Self, ProviderError> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY").map_err(|_| {
            ProviderError::Credentials { provider: "stripe", detail: "STRIPE_SECRET_KEY not set" }
        })?;
        Ok(Self::new(client, secret_key))
    }

    /// Override the endpoint, for tests against a local server.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl PaymentProcessor for StripeProcessor {
    async fn prepare(&self, order: &PaymentOrder) -> Result<String, ProviderError> {
        let params = [
            ("amount", order.amount.to_string()),
            ("currency", "krw".to_string()),
            ("metadata[merchant_uid]", order.merchant_uid.clone()),
            ("description", order.product_name.clone()),
        ];

        let response = self
            .client
            .post(format!("{}/payment_intents", self.base_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { provider: "stripe", status: status.as_u16(), body });
        }

        let intent: StripePaymentIntent = response.json().await?;
        tracing::info!(merchant_uid = %order.merchant_uid, intent = %intent.id,
            "payment intent created with stripe");
        Ok(order.merchant_uid.clone())
    }

    async fn verify(
        &self,
        receipt_id: &str,
        merchant_uid: &str,
        expected_amount: i64,
    ) -> Result<PaymentVerification, ProviderError> {
        let response = self
            .client
            .get(format!("{}/payment_intents/{receipt_id}", self.base_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { provider: "stripe", status: status.as_u16(), body });
        }

        let intent: StripePaymentIntent = response.json().await?;
        let intent_uid = intent.metadata.get("merchant_uid").cloned().unwrap_or_default();

        check_mismatch(intent.amount, &intent_uid, expected_amount, merchant_uid)?;

        let status = match intent.status.as_str() {
            "succeeded" => PaymentStatus::Paid,
            "canceled" => PaymentStatus::Cancelled,
            "processing" | "requires_confirmation" | "requires_payment_method" => {
                PaymentStatus::Ready
            }
            _ => PaymentStatus::Failed,
        };

        Ok(PaymentVerification {
            status,
            amount: intent.amount,
            merchant_uid: intent_uid,
            receipt_url: None,
            paid_at: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn korea_pays_domestically_everyone_else_internationally() {
        assert_eq!(processor_for_country(Some("KR")), GatewayKind::Domestic);
        assert_eq!(processor_for_country(Some("TH")), GatewayKind::International);
        assert_eq!(processor_for_country(Some("US")), GatewayKind::International);
        // Unknown country defaults to the domestic gateway (primary
        // audience is Korean travellers).
        assert_eq!(processor_for_country(None), GatewayKind::Domestic);
    }

    #[test]
    fn amount_mismatch_is_rejected() {
        let err = check_mismatch(9_900, "order_1", 19_900, "order_1").unwrap_err();
        assert_matches!(err, ProviderError::Rejected(msg) if msg.contains("amount mismatch"));
    }

    #[test]
    fn order_reference_mismatch_is_rejected() {
        let err = check_mismatch(19_900, "order_2", 19_900, "order_1").unwrap_err();
        assert_matches!(err, ProviderError::Rejected(msg) if msg.contains("order reference"));
    }

    #[test]
    fn matching_payment_passes() {
        assert!(check_mismatch(19_900, "order_1", 19_900, "order_1").is_ok());
    }
}
