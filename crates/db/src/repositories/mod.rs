//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod affiliate_click_repo;
pub mod comparison_repo;
pub mod search_log_repo;
pub mod usage_repo;
pub mod user_repo;

pub use affiliate_click_repo::AffiliateClickRepo;
pub use comparison_repo::ComparisonRepo;
pub use search_log_repo::SearchLogRepo;
pub use usage_repo::{AccountUsage, UsageRepo};
pub use user_repo::UserRepo;
