//! Request façade over the REST API.
//!
//! Every call is an independent request against `base_url + path` with a JSON
//! content type. Success bodies decode into the caller's type; failures come
//! back as one [`ApiError`] value.
//!
//! ERROR HANDLING
//! ==============
//! A response with a non-success status is [`ApiError::Status`], carrying the
//! status code and the body text (or the reason phrase when the body is
//! empty). No response at all is [`ApiError::Transport`]. Only transport
//! failures and server-side statuses are worth retrying; this layer does not
//! retry on its own.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;

/// Errors produced by [`ApiClient`] calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{status} {message}")]
    Status { status: u16, message: String },

    /// No response arrived (connect failure, DNS, bad URL, broken body stream).
    #[error("transport failure: {0}")]
    Transport(String),

    /// A success body could not be decoded into the expected type.
    #[error("response decode failed: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build a status failure, deriving the message from the body text.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = if body.is_empty() {
            status.canonical_reason().unwrap_or("Request failed").to_owned()
        } else {
            body.to_owned()
        };
        Self::Status { status: status.as_u16(), message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// Text suitable for showing to the user.
    pub fn message(&self) -> &str {
        match self {
            Self::Status { message, .. } => message,
            Self::Transport(message) | Self::Decode(message) => message,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

/// Stateless HTTP client bound to one immutable base address.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { http, base_url: Arc::from(config.api_base_url.as_str()) })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full target address for `path`.
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None::<&()>).await
    }

    /// `POST path`, with an optional JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn post<T, B>(&self, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, body).await
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::DELETE, path, None::<&()>).await
    }

    async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let request = self.http.request(method.clone(), &url);
        let request = if let Some(body) = body { request.json(body) } else { request };

        let response = request.send().await.map_err(|e| {
            tracing::debug!(%method, %url, error = %e, "request failed before a response");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        tracing::debug!(%method, %url, status = status.as_u16(), "api response");

        if !status.is_success() {
            return Err(ApiError::from_status(status, &text));
        }
        decode_body(status, &text)
    }
}

/// Join the base address and a path with exactly one `/` between them.
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Decode a success body. "No content" yields whatever `T` makes of `null`
/// (`()` or `None`) without touching the JSON parser.
pub(crate) fn decode_body<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T, ApiError> {
    if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
        return serde_json::from_value(Value::Null).map_err(|e| ApiError::Decode(e.to_string()));
    }
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
