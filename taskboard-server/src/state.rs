//! Application state shared across handlers

use std::sync::Arc;

use mongodb::Client;

use crate::dashboard::{DashboardRenderer, DashboardService, TemplateRenderer};
use crate::db::{TaskRepo, UserRepo};
use crate::models::Identity;
use crate::settings::Settings;

/// Shared application state
pub struct AppState {
    pub dashboard: DashboardService,
    pub renderer: Arc<dyn DashboardRenderer>,
    /// Identity for requests that carry none
    pub default_identity: Identity,
    pub database: String,
}

impl AppState {
    pub fn new(
        dashboard: DashboardService,
        renderer: Arc<dyn DashboardRenderer>,
        default_identity: Identity,
        database: impl Into<String>,
    ) -> Self {
        Self {
            dashboard,
            renderer,
            default_identity,
            database: database.into(),
        }
    }

    /// Wire MongoDB repositories and the template renderer
    pub fn from_client(client: &Client, settings: &Settings) -> Self {
        let db = client.database(&settings.database);
        let dashboard = DashboardService::new(
            Arc::new(TaskRepo::new(&db)),
            Arc::new(UserRepo::new(&db)),
        );

        Self::new(
            dashboard,
            Arc::new(TemplateRenderer),
            settings.default_identity(),
            settings.database.clone(),
        )
    }
}
