//! Server settings - environment loading
//!
//! Settings are loaded from environment variables:
//! - `TASKBOARD_BIND`: listen address (default: 127.0.0.1:3030)
//! - `MONGODB_URI`: connection string (default: mongodb://localhost:27017)
//! - `TASKBOARD_DATABASE`: application database (default: todo_db)
//! - `TASKBOARD_DEFAULT_USER_EMAIL`: identity used when a request carries none
//! - `TASKBOARD_MONGO_TIMEOUT_SECS`: server selection timeout (default: 5)
//! - `TASKBOARD_CORS_PERMISSIVE`: allow any origin (default: false)

use std::net::SocketAddr;
use std::time::Duration;

use crate::db::client::DEFAULT_SERVER_SELECTION_TIMEOUT;
use crate::db::DEFAULT_DATABASE;
use crate::models::{Identity, UserEmail};

pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";

/// Invalid environment value
#[derive(Debug, thiserror::Error)]
#[error("invalid value for {var}: {reason}")]
pub struct SettingsError {
    pub var: &'static str,
    pub reason: String,
}

/// Server settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub mongodb_uri: String,
    pub database: String,
    /// Fallback identity for requests without one
    pub default_user_email: Option<UserEmail>,
    pub mongo_timeout: Duration,
    /// Allow permissive CORS (default: false = localhost only)
    pub cors_permissive: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            mongodb_uri: DEFAULT_MONGODB_URI.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            default_user_email: None,
            mongo_timeout: DEFAULT_SERVER_SELECTION_TIMEOUT,
            cors_permissive: false,
        }
    }
}

impl Settings {
    /// Create settings from environment variables
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Create settings from an arbitrary variable source (for testing)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let mut settings = Self::default();
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(bind) = get("TASKBOARD_BIND") {
            settings.bind_addr = bind.parse().map_err(|e| SettingsError {
                var: "TASKBOARD_BIND",
                reason: format!("{}", e),
            })?;
        }
        if let Some(uri) = get("MONGODB_URI") {
            settings.mongodb_uri = uri;
        }
        if let Some(database) = get("TASKBOARD_DATABASE") {
            settings.database = database;
        }
        if let Some(email) = get("TASKBOARD_DEFAULT_USER_EMAIL") {
            let email = UserEmail::new(&email).map_err(|e| SettingsError {
                var: "TASKBOARD_DEFAULT_USER_EMAIL",
                reason: e.to_string(),
            })?;
            settings.default_user_email = Some(email);
        }
        if let Some(secs) = get("TASKBOARD_MONGO_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| SettingsError {
                var: "TASKBOARD_MONGO_TIMEOUT_SECS",
                reason: format!("'{}' is not a whole number of seconds", secs),
            })?;
            settings.mongo_timeout = Duration::from_secs(secs);
        }
        if let Some(flag) = get("TASKBOARD_CORS_PERMISSIVE") {
            settings.cors_permissive = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        Ok(settings)
    }

    /// Identity used when the request context carries none
    pub fn default_identity(&self) -> Identity {
        Identity::from(self.default_user_email.clone())
    }
}
