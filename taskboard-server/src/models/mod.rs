//! Domain models with validation at construction
//!
//! Request-supplied values are validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod user;
pub mod task;

pub use validation::ValidationError;
pub use user::{Identity, User, UserEmail, DEFAULT_DISPLAY_NAME};
pub use task::TaskRow;
