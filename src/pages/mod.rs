//! Consumers of the session and request layers.

pub mod dashboard;
pub mod login;
