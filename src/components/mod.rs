//! Reusable view components.

pub mod access_guard;
