//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::PageError;
use crate::models::{Identity, UserEmail, ValidationError};
use crate::state::AppState;

/// Header a trusted proxy may use to pass the authenticated user's email
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Identity of the requesting user.
///
/// Resolved in order from:
/// 1. a `UserEmail` extension inserted by upstream auth middleware
/// 2. the `X-User-Email` header
/// 3. the configured default identity
pub struct CurrentUser(pub Identity);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = PageError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(email) = parts.extensions.get::<UserEmail>() {
            return Ok(Self(Identity::User(email.clone())));
        }

        if let Some(value) = parts.headers.get(USER_EMAIL_HEADER) {
            let raw = value.to_str().map_err(|_| ValidationError::InvalidFormat {
                field: "X-User-Email",
                reason: "header is not valid ASCII",
            })?;
            return Ok(Self(Identity::User(UserEmail::new(raw)?)));
        }

        Ok(Self(state.default_identity.clone()))
    }
}
