/// Errors from any external collaborator.
///
/// Handlers map these to degraded comparison records or 502-style
/// responses; they are never fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The collaborator returned a non-2xx status code.
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// The collaborator answered but the payload was unusable.
    #[error("{provider} returned a malformed response: {detail}")]
    Malformed {
        provider: &'static str,
        detail: String,
    },

    /// Required credentials are missing from the environment.
    #[error("{provider} credentials not configured: {detail}")]
    Credentials {
        provider: &'static str,
        detail: &'static str,
    },

    /// A domain-level refusal, e.g. an unknown currency code or a
    /// payment verification mismatch.
    #[error("{0}")]
    Rejected(String),
}
