//! Dashboard page

use std::sync::Arc;

use axum::{extract::State, response::Html, routing::get, Router};

use crate::http::error::PageError;
use crate::http::extractors::CurrentUser;
use crate::state::AppState;

/// GET / - task dashboard for the current user
async fn dashboard(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
) -> Result<Html<String>, PageError> {
    let html = state
        .dashboard
        .render_dashboard(&identity, state.renderer.as_ref())
        .await?;
    Ok(Html(html))
}

/// Dashboard routes (`/alltask` kept for existing links)
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(dashboard))
        .route("/alltask", get(dashboard))
}
