//! HTTP server layer
//!
//! Axum server with:
//! - CORS (localhost only by default)
//! - Request tracing
//! - Graceful shutdown
//! - HTML error pages

pub mod server;
pub mod error;
pub mod extractors;
pub mod routes;

pub use server::{build_router, run_server};
pub use error::PageError;
pub use extractors::{CurrentUser, USER_EMAIL_HEADER};
