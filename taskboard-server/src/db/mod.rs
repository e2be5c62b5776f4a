//! Database layer - client construction and repositories
//!
//! # Design Principles
//!
//! - One `mongodb::Client` per process; it pools connections internally
//! - Repositories sit behind traits so handlers can be tested without a server
//! - Rely on DB constraints (unique index on `users.email`), handle conflicts

pub mod client;
pub mod repos;

pub use client::{create_client, create_client_with_options};
pub use repos::*;

/// Default application database
pub const DEFAULT_DATABASE: &str = "todo_db";

/// Collection holding task documents
pub const TASKS_COLLECTION: &str = "tasks";

/// Collection holding user documents
pub const USERS_COLLECTION: &str = "users";
