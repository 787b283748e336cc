//! Request middleware: authentication extractors.

pub mod auth;
