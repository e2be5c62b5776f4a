//! User repository
//!
//! - find_by_email: single indexed lookup
//! - insert: relies on the unique `email` index, no check-then-insert

use async_trait::async_trait;
use bson::doc;
use mongodb::{Collection, Database};

use super::{is_duplicate_key, DbError};
use crate::db::USERS_COLLECTION;
use crate::models::{User, UserEmail};

/// Lookup of user records by email (testable)
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &UserEmail) -> Result<Option<User>, DbError>;
}

/// MongoDB-backed user store
#[derive(Clone)]
pub struct UserRepo {
    collection: Collection<User>,
}

impl UserRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(USERS_COLLECTION),
        }
    }

    /// Insert a user. A second user with the same email is rejected by the
    /// unique index and reported as `DbError::Duplicate`.
    pub async fn insert(&self, user: &User) -> Result<(), DbError> {
        match self.collection.insert_one(user).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(DbError::Duplicate {
                resource: "user",
                key: user.email.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl UserStore for UserRepo {
    async fn find_by_email(&self, email: &UserEmail) -> Result<Option<User>, DbError> {
        let user = self
            .collection
            .find_one(doc! { "email": email.as_str() })
            .await?;

        tracing::debug!(email = %email, found = user.is_some(), "User lookup");
        Ok(user)
    }
}

/// Mock user store for testing
#[derive(Default)]
pub struct MockUserStore {
    users: Vec<User>,
    fail: bool,
}

impl MockUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self { users, fail: false }
    }

    /// Store whose lookups always fail
    pub fn failing() -> Self {
        Self {
            users: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl UserStore for MockUserStore {
    async fn find_by_email(&self, email: &UserEmail) -> Result<Option<User>, DbError> {
        if self.fail {
            return Err(DbError::unavailable("mock user store is down"));
        }
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email.as_str())
            .cloned())
    }
}
