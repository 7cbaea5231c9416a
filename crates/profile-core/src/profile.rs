//! Profile entity and update payload

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A user profile, identified by its username
///
/// Serialized as `{"username", "firstName", "lastName"}`. The PascalCase
/// field names are accepted on input as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Unique identity key
    #[serde(alias = "Username")]
    pub username: String,
    #[serde(alias = "FirstName")]
    pub first_name: String,
    #[serde(alias = "LastName")]
    pub last_name: String,
}

impl Profile {
    /// Create a new profile
    pub fn new(
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Build the profile an update resolves to.
    ///
    /// The username always comes from the addressed resource, never from the
    /// request body.
    pub fn from_put_request(username: impl Into<String>, request: PutProfileRequest) -> Self {
        Self {
            username: username.into(),
            first_name: request.first_name,
            last_name: request.last_name,
        }
    }

    /// Check that the profile can be stored under its username
    pub fn validate(&self) -> Result<()> {
        validate_username(&self.username)
    }
}

/// Reject usernames that cannot address a profile
pub fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(Error::invalid_input("username cannot be empty"));
    }
    Ok(())
}

/// Body of a full-replace update: names only, no username
///
/// Unknown fields are ignored, so a `username` sent by a client has no effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutProfileRequest {
    #[serde(alias = "FirstName")]
    pub first_name: String,
    #[serde(alias = "LastName")]
    pub last_name: String,
}

impl PutProfileRequest {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}
