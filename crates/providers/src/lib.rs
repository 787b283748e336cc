//! External collaborators consumed by the tabi platform.
//!
//! Every collaborator sits behind a trait so the pipeline and the
//! handlers can be exercised with stubs: vision/OCR analysis, currency
//! rates, domestic shopping search, payment processing, and object
//! storage. Implementations speak HTTP via `reqwest` with bounded
//! timeouts and one retry on transient failures; exhausting retries
//! surfaces as a [`ProviderError`] the caller degrades on, never a
//! panic.

pub mod affiliate;
pub mod error;
pub mod exchange;
pub mod object_store;
pub mod payment;
pub mod shopping;
pub mod vision;

pub use error::ProviderError;

/// Per-request timeout for every external HTTP call.
pub const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(8);

/// How many times a transient network failure is retried before the
/// call is treated as failed.
pub const TRANSIENT_RETRIES: usize = 1;

/// Run an operation, retrying once when it fails with a transport
/// error. Non-transport failures (bad status, malformed payloads,
/// rejections) are returned immediately -- retrying those only risks
/// duplicate side effects.
pub(crate) async fn with_retry<T, F, Fut>(op: F) -> Result<T, ProviderError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, ProviderError>>,
{
    let mut last_err = None;
    for attempt in 0..=TRANSIENT_RETRIES {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err @ ProviderError::Request(_)) => {
                if attempt < TRANSIENT_RETRIES {
                    tracing::warn!(error = %err, attempt, "transient provider failure, retrying");
                }
                last_err = Some(err);
            }
            Err(err) => return Err(err),
        }
    }
    Err(last_err.expect("loop ran at least once"))
}

/// Build the shared HTTP client used by all providers.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent("tabi-price-comparison/1.0")
        .build()
        .expect("reqwest client construction cannot fail with static config")
}
