//! Login page: a name field submitted to the authentication endpoint.

use crate::net::api::ApiClient;
use crate::net::auth::{self, AuthError};
use crate::net::types::Identity;
use crate::state::session::SessionStore;

/// Client-side form problems, shown next to the field and never sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl LoginError {
    /// Text for the blocking alert shown on failure.
    pub fn message(&self) -> String {
        match self {
            Self::Invalid(err) => err.to_string(),
            Self::Auth(err) => err.message().to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub name: String,
}

impl LoginForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The trimmed name to submit.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NameRequired`] for a blank name.
    pub fn validate(&self) -> Result<&str, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::NameRequired);
        }
        Ok(name)
    }
}

/// Validate `form`, log in, and on success store the identity in `session`.
///
/// The session is only touched on success.
///
/// # Errors
///
/// Returns [`LoginError::Invalid`] without any request for a bad form, and
/// [`LoginError::Auth`] when the server call fails or refuses the login.
pub async fn submit(form: &LoginForm, api: &ApiClient, session: &SessionStore) -> Result<Identity, LoginError> {
    let name = form.validate()?;
    let identity = auth::login(api, name).await.inspect_err(|e| {
        tracing::warn!(error = %e, "login failed");
    })?;

    tracing::info!(id = %identity.id, "logged in");
    session.set_identity(identity.clone());
    Ok(identity)
}

/// State of the login surface while it is mounted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginPage {
    pub form: LoginForm,
    pub pending: bool,
    /// Inline validation message for the name field.
    pub field_error: Option<String>,
    /// Failure from the last submission, shown as a blocking alert.
    pub alert: Option<String>,
}

impl LoginPage {
    pub fn new(name: impl Into<String>) -> Self {
        Self { form: LoginForm::new(name), ..Self::default() }
    }

    /// Submit the form, recording the outcome on the page.
    ///
    /// # Errors
    ///
    /// See [`submit`].
    pub async fn submit(&mut self, api: &ApiClient, session: &SessionStore) -> Result<Identity, LoginError> {
        self.field_error = None;
        self.alert = None;
        self.pending = true;
        let result = submit(&self.form, api, session).await;
        self.pending = false;

        match &result {
            Err(LoginError::Invalid(err)) => self.field_error = Some(err.to_string()),
            Err(err @ LoginError::Auth(_)) => self.alert = Some(err.message()),
            Ok(_) => {}
        }
        result
    }
}

#[cfg(test)]
#[path = "login_test.rs"]
mod tests;
