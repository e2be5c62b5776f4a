//! Command implementations for the taskboard CLI

pub mod bootstrap;
pub mod serve;

pub use bootstrap::{run_bootstrap, run_verify};
pub use serve::run_serve;
