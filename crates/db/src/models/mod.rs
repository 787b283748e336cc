//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts

pub mod affiliate_click;
pub mod price_comparison;
pub mod search_log;
pub mod user;
