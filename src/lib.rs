//! # roomgate
//!
//! Headless client for the rooms backend: a session store, an access guard
//! that gates protected views on it, and a typed request layer over the
//! `/auth` and `/rooms` endpoints plus the realtime channel.
//!
//! Layout follows the usual client split: `net` talks to the server,
//! `state` holds shared models, `components` and `pages` are the views
//! built on top of them.

pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;
