//! User records and request identity
//!
//! Users live in the `users` collection and are keyed by a unique email.
//! The dashboard only ever reads them.

use std::fmt;

use bson::oid::ObjectId;
use bson::Bson;
use serde::{Deserialize, Deserializer, Serialize};

use super::ValidationError;

/// Display name used when the request has no matching user record.
pub const DEFAULT_DISPLAY_NAME: &str = "User";

/// RFC 5321 path limit
const MAX_EMAIL_LEN: usize = 254;

/// User document from the `users` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Empty when the stored value is missing or not a string
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    pub email: String,
}

fn lenient_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Bson::deserialize(deserializer)? {
        Bson::String(name) => name,
        _ => String::new(),
    })
}

impl User {
    pub fn new(name: impl Into<String>, email: &UserEmail) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.as_str().to_owned(),
        }
    }
}

/// A syntactically valid email address used to identify the requesting user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserEmail(String);

impl UserEmail {
    /// Validate and wrap an email address. Surrounding whitespace is trimmed.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let email = raw.trim();

        if email.is_empty() {
            return Err(ValidationError::Empty { field: "email" });
        }
        if email.len() > MAX_EMAIL_LEN {
            return Err(ValidationError::TooLong {
                field: "email",
                max: MAX_EMAIL_LEN,
            });
        }

        let (local, domain) = email.split_once('@').ok_or(ValidationError::InvalidFormat {
            field: "email",
            reason: "missing '@'",
        })?;

        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "expected exactly one '@' between non-empty parts",
            });
        }
        if email.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must not contain whitespace",
            });
        }

        Ok(Self(email.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who is asking for the dashboard.
///
/// Resolved per request from the request context; anonymous requests
/// still get a dashboard, rendered for [`DEFAULT_DISPLAY_NAME`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    User(UserEmail),
}

impl Identity {
    pub fn email(&self) -> Option<&UserEmail> {
        match self {
            Self::Anonymous => None,
            Self::User(email) => Some(email),
        }
    }
}

impl From<Option<UserEmail>> for Identity {
    fn from(email: Option<UserEmail>) -> Self {
        email.map(Self::User).unwrap_or_default()
    }
}
