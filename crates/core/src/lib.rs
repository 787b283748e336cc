//! Pure domain logic for the tabi price-comparison platform.
//!
//! Everything in this crate is I/O-free so it can be used by the API
//! layer, the repositories, and any future CLI tooling without pulling
//! in a runtime. External collaborators (vision, rates, search,
//! payments) live in `tabi-providers`.

pub mod comparison;
pub mod currency;
pub mod error;
pub mod relevance;
pub mod savings;
pub mod types;
pub mod usage;
