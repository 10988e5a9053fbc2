//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by domain (`session`, `rooms`) so views can depend on
//! small focused models.

pub mod rooms;
pub mod session;
