//! Authentication endpoint.

use super::api::{ApiClient, ApiError};
use super::types::{Identity, LoginRequest, LoginResponse};

pub const LOGIN_PATH: &str = "/auth/login";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Request(#[from] ApiError),

    /// The server answered 2xx but refused the login.
    #[error("login rejected: {0}")]
    Rejected(String),
}

impl AuthError {
    /// Text suitable for showing to the user.
    pub fn message(&self) -> &str {
        match self {
            Self::Request(err) => err.message(),
            Self::Rejected(message) => message,
        }
    }
}

/// Log in by name via `POST /auth/login`.
///
/// # Errors
///
/// Returns [`AuthError::Request`] for failed requests and
/// [`AuthError::Rejected`] when the response carries no identity.
pub async fn login(api: &ApiClient, name: &str) -> Result<Identity, AuthError> {
    let response: LoginResponse = api.post(LOGIN_PATH, Some(&LoginRequest { name })).await?;
    response.into_identity().map_err(AuthError::Rejected)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
