//! Client configuration parsed from environment variables.
//!
//! The base address is resolved once at startup and copied into the
//! [`ApiClient`](crate::net::api::ApiClient); nothing mutates it afterwards.

/// Names the base address of the REST API, e.g. `http://127.0.0.1:8080/api/v1`.
pub const API_BASE_URL_ENV: &str = "ROOMGATE_API_BASE_URL";
/// Overrides the realtime channel address.
pub const WS_URL_ENV: &str = "ROOMGATE_WS_URL";
/// Path appended to the base address when deriving the realtime address.
pub const REALTIME_PATH: &str = "/ws";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The base address has no `http://` or `https://` scheme to map onto `ws`.
    #[error("cannot derive realtime URL from base URL {0:?}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base address without a trailing slash. Empty means same-origin
    /// relative paths.
    pub api_base_url: String,
    /// Explicit realtime address; derived from `api_base_url` when `None`.
    pub realtime_url: Option<String>,
}

impl ClientConfig {
    pub fn new(api_base_url: impl AsRef<str>) -> Self {
        Self { api_base_url: normalize_base_url(api_base_url.as_ref()), realtime_url: None }
    }

    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `ROOMGATE_API_BASE_URL`: empty (same-origin) when absent
    /// - `ROOMGATE_WS_URL`: derived from the base address when absent
    pub fn from_env() -> Self {
        let api_base_url = std::env::var(API_BASE_URL_ENV)
            .map(|raw| normalize_base_url(&raw))
            .unwrap_or_default();
        let realtime_url = std::env::var(WS_URL_ENV)
            .ok()
            .map(|raw| raw.trim().to_owned())
            .filter(|raw| !raw.is_empty());

        Self { api_base_url, realtime_url }
    }

    #[must_use]
    pub fn with_realtime_url(mut self, url: impl Into<String>) -> Self {
        self.realtime_url = Some(url.into());
        self
    }

    /// Address of the realtime channel.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] when no explicit address is
    /// set and the base address is not an absolute `http(s)` URL.
    pub fn realtime_url(&self) -> Result<String, ConfigError> {
        match &self.realtime_url {
            Some(url) => Ok(url.clone()),
            None => ws_url(&self.api_base_url),
        }
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn ws_url(base_url: &str) -> Result<String, ConfigError> {
    if let Some(rest) = base_url.strip_prefix("http://") {
        return Ok(format!("ws://{rest}{REALTIME_PATH}"));
    }
    if let Some(rest) = base_url.strip_prefix("https://") {
        return Ok(format!("wss://{rest}{REALTIME_PATH}"));
    }

    Err(ConfigError::InvalidBaseUrl(base_url.to_owned()))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
