//! HTTP handlers, one module per resource.

pub mod affiliate;
pub mod analysis;
pub mod auth;
pub mod comparisons;
pub mod exchange;
pub mod images;
pub mod payments;
pub mod search;
pub mod usage;
