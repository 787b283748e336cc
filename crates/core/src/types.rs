/// Account identifiers come from the auth collaborator (OIDC `sub`)
/// and are opaque strings, not database serials.
pub type AccountId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Monetary amounts in home-currency (KRW) minor-unit-free integers.
pub type Krw = i64;
