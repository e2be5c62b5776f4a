//! Dashboard aggregation
//!
//! One request runs a fixed pipeline:
//!
//! 1. fetch every task document
//! 2. look up the requesting user by email (if the request carries one)
//! 3. build a [`DashboardView`]
//! 4. hand the view to a [`DashboardRenderer`]
//!
//! Any store failure stops the pipeline before rendering and comes back as a
//! [`DashboardError`] for the HTTP layer to turn into an error page.

pub mod render;

use std::sync::Arc;

use bson::Document;

use crate::db::{DbError, TaskStore, UserStore};
use crate::models::{Identity, User, DEFAULT_DISPLAY_NAME};

pub use render::{DashboardRenderer, RenderError, TemplateRenderer};

/// Page title shown on the dashboard
pub const DASHBOARD_TITLE: &str = "Dashboard";

/// Everything the dashboard template needs
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub title: String,
    pub name: String,
    /// All task documents, exactly as stored
    pub dashboard: Vec<Document>,
}

/// Dashboard pipeline failure
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("failed to load tasks: {0}")]
    Tasks(#[source] DbError),

    #[error("failed to load user: {0}")]
    User(#[source] DbError),

    #[error("failed to render dashboard: {0}")]
    Render(#[from] RenderError),
}

/// Name to greet the user with. Falls back to [`DEFAULT_DISPLAY_NAME`] when
/// there is no user or the record carries no usable name.
pub fn resolve_display_name(user: Option<User>) -> String {
    match user {
        Some(user) if !user.name.is_empty() => user.name,
        _ => DEFAULT_DISPLAY_NAME.to_string(),
    }
}

/// Aggregates tasks and the current user into a dashboard view
#[derive(Clone)]
pub struct DashboardService {
    tasks: Arc<dyn TaskStore>,
    users: Arc<dyn UserStore>,
}

impl DashboardService {
    pub fn new(tasks: Arc<dyn TaskStore>, users: Arc<dyn UserStore>) -> Self {
        Self { tasks, users }
    }

    /// Build the view model. Queries run one after the other.
    pub async fn build(&self, identity: &Identity) -> Result<DashboardView, DashboardError> {
        let tasks = self.tasks.find_all().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to load tasks for dashboard");
            DashboardError::Tasks(e)
        })?;

        let user = match identity.email() {
            Some(email) => self.users.find_by_email(email).await.map_err(|e| {
                tracing::error!(error = %e, email = %email, "Failed to load dashboard user");
                DashboardError::User(e)
            })?,
            None => None,
        };

        let name = resolve_display_name(user);
        tracing::info!(name = %name, tasks = tasks.len(), "Dashboard user resolved");

        Ok(DashboardView {
            title: DASHBOARD_TITLE.to_string(),
            name,
            dashboard: tasks,
        })
    }

    /// Build the view and render it. The renderer is only called once the
    /// view is complete.
    pub async fn render_dashboard(
        &self,
        identity: &Identity,
        renderer: &dyn DashboardRenderer,
    ) -> Result<String, DashboardError> {
        let view = self.build(identity).await?;

        renderer.render(&view).map_err(|e| {
            tracing::error!(error = %e, "Failed to render dashboard");
            DashboardError::Render(e)
        })
    }
}
