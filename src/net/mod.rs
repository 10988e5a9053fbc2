//! Network layer: wire types, the request façade, and the services built on it.

pub mod api;
pub mod auth;
pub mod realtime;
pub mod rooms;
pub mod types;
