//! taskboard-server: task dashboard over a MongoDB store
//!
//! - `dashboard`: aggregates tasks and the current user into a rendered page
//! - `bootstrap`: provisions the application user, collections and indexes
//! - `http`: axum routes, identity extraction and error pages

pub mod bootstrap;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod settings;
pub mod state;

use std::sync::Arc;

pub use error::{Result, ServerError};
pub use settings::Settings;
pub use state::AppState;

/// Connect to MongoDB and serve HTTP until shutdown
pub async fn serve(settings: Settings) -> Result<()> {
    let client = db::create_client_with_options(&settings.mongodb_uri, settings.mongo_timeout).await?;
    tracing::info!(database = %settings.database, "Using MongoDB database");

    let state = Arc::new(AppState::from_client(&client, &settings));
    http::run_server(state, &settings).await
}
