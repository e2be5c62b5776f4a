//! MongoDB client construction
//!
//! The driver owns pooling, server selection and timeouts. We only pin the
//! app name and the server selection timeout so an unreachable store fails
//! fast instead of stalling a request.

use std::time::Duration;

use mongodb::options::ClientOptions;
use mongodb::Client;

/// Reported to the server in the handshake (visible in `currentOp`).
const APP_NAME: &str = "taskboard";

/// Default server selection timeout.
pub const DEFAULT_SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a MongoDB client.
///
/// # Errors
///
/// Returns an error if the connection string cannot be parsed. The driver
/// connects lazily, so an unreachable server surfaces on first use.
///
/// # Example
///
/// ```ignore
/// let client = create_client("mongodb://localhost:27017").await?;
/// ```
pub async fn create_client(uri: &str) -> Result<Client, mongodb::error::Error> {
    create_client_with_options(uri, DEFAULT_SERVER_SELECTION_TIMEOUT).await
}

/// Create a MongoDB client with a custom server selection timeout.
pub async fn create_client_with_options(
    uri: &str,
    server_selection_timeout: Duration,
) -> Result<Client, mongodb::error::Error> {
    let mut options = ClientOptions::parse(uri).await?;
    options.app_name = Some(APP_NAME.to_string());
    options.server_selection_timeout = Some(server_selection_timeout);

    tracing::debug!(
        hosts = ?options.hosts,
        timeout_ms = server_selection_timeout.as_millis() as u64,
        "MongoDB client configured"
    );

    Client::with_options(options)
}
