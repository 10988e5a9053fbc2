//! Wire types shared by the services and the views.
//!
//! Field names mirror the server's JSON. The backend writes numeric user ids,
//! empty strings for unset profile fields and `null` for empty member lists;
//! the deserializers below normalize those so the rest of the crate never
//! sees them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// IDENTITY
// =============================================================================

/// Non-empty identifier of an authenticated principal.
///
/// Accepts JSON strings and unsigned integers; both normalize to text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct IdentityId(String);

impl IdentityId {
    /// Returns `None` for an empty identifier.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() { None } else { Some(Self(raw)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for IdentityId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for IdentityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(id) => Ok(Self::from(id)),
            Raw::Text(id) => Self::new(id).ok_or_else(|| serde::de::Error::custom("identity id must not be empty")),
        }
    }
}

/// The authenticated principal.
///
/// A value of this type only exists for a real, identified user; the
/// session is authenticated exactly when it holds one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Any other fields the server sent (avatar URL, memberships, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Identity {
    pub fn new(id: IdentityId) -> Self {
        Self { id, name: None, email: None, attributes: Map::new() }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Name for greetings; falls back to the identifier.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

// =============================================================================
// ROOMS
// =============================================================================

pub type RoomId = u64;

/// A room as listed by `GET /rooms`. Read-only projection; never cached as
/// the authoritative copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Members, serialized under `users` by the server.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub users: Vec<Identity>,
}

/// Body of `POST /rooms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRoom {
    pub name: String,
    pub description: String,
}

impl NewRoom {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), description: String::new() }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Body of `PUT /rooms/{id}`; unset fields are left untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoomUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RoomUpdate {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

// =============================================================================
// AUTH
// =============================================================================

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest<'a> {
    pub name: &'a str,
}

/// Response of `POST /auth/login`.
///
/// The server wraps the user in a `{success, message, user}` envelope; a
/// bare identity object is accepted as well.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LoginResponse {
    Envelope(LoginEnvelope),
    Bare(Identity),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "data")]
    pub user: Option<Identity>,
}

impl LoginResponse {
    /// Extract the identity, or the server's reason for refusing.
    ///
    /// # Errors
    ///
    /// Returns the envelope message when `success` is false or no user came back.
    pub fn into_identity(self) -> Result<Identity, String> {
        match self {
            Self::Bare(identity) => Ok(identity),
            Self::Envelope(LoginEnvelope { success: true, user: Some(identity), .. }) => Ok(identity),
            Self::Envelope(LoginEnvelope { message, .. }) if !message.is_empty() => Err(message),
            Self::Envelope(_) => Err("login response carried no user".to_owned()),
        }
    }
}

fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
