//! HTML rendering with askama templates
//!
//! Templates live in `taskboard-server/templates/` and are compiled into the
//! binary. Output is HTML-escaped by askama.

use askama::Template;

use super::DashboardView;
use crate::models::TaskRow;

/// Rendering failure
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

/// Turns a dashboard view into a response body (testable)
pub trait DashboardRenderer: Send + Sync {
    fn render(&self, view: &DashboardView) -> Result<String, RenderError>;
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardPage<'a> {
    title: &'a str,
    name: &'a str,
    tasks: Vec<TaskRow>,
    open_count: usize,
    done_count: usize,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPage<'a> {
    status: u16,
    message: &'a str,
}

/// Renders `dashboard.html`
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl DashboardRenderer for TemplateRenderer {
    fn render(&self, view: &DashboardView) -> Result<String, RenderError> {
        let tasks: Vec<TaskRow> = view.dashboard.iter().map(TaskRow::from).collect();
        let done_count = tasks.iter().filter(|t| t.completed).count();

        let page = DashboardPage {
            title: &view.title,
            name: &view.name,
            open_count: tasks.len() - done_count,
            done_count,
            tasks,
        };
        Ok(page.render()?)
    }
}

/// Render the generic error page
pub fn render_error_page(status: u16, message: &str) -> Result<String, RenderError> {
    Ok(ErrorPage { status, message }.render()?)
}
