//! Repository implementations for database access
//!
//! Each store is a trait with a MongoDB-backed repository and an in-memory
//! mock. The mock lets the dashboard and HTTP layers be exercised without a
//! running server.

pub mod tasks;
pub mod users;

pub use tasks::{MockTaskStore, TaskRepo, TaskStore};
pub use users::{MockUserStore, UserRepo, UserStore};

use mongodb::error::{ErrorKind, WriteFailure};

/// Server error code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("duplicate {resource}: '{key}'")]
    Duplicate { resource: &'static str, key: String },
}

impl DbError {
    /// Error used by mock stores to simulate an unreachable server.
    pub fn unavailable(message: &str) -> Self {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, message.to_owned());
        Self::Mongo(mongodb::error::Error::from(io))
    }
}

/// True when the driver error is a unique index violation.
pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_is_not_duplicate() {
        let err = DbError::unavailable("connection refused");
        match err {
            DbError::Mongo(ref e) => assert!(!is_duplicate_key(e)),
            DbError::Duplicate { .. } => panic!("expected Mongo variant"),
        }
        assert!(err.to_string().starts_with("database error"));
    }

    #[test]
    fn duplicate_display() {
        let err = DbError::Duplicate {
            resource: "user",
            key: "ankit@example.com".into(),
        };
        assert_eq!(err.to_string(), "duplicate user: 'ankit@example.com'");
    }
}
