//! Page error type with IntoResponse
//!
//! Errors are rendered as HTML error pages. Store and render failures get a
//! generic message; details stay in the logs.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::dashboard::render::render_error_page;
use crate::dashboard::DashboardError;
use crate::models::ValidationError;

/// Error returned by page handlers
#[derive(Debug)]
pub enum PageError {
    /// Request carried an invalid value (400)
    BadRequest(ValidationError),

    /// Dashboard pipeline failed (503 for store errors, 500 for rendering)
    Dashboard(DashboardError),
}

impl PageError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Dashboard(DashboardError::Tasks(_) | DashboardError::User(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Dashboard(DashboardError::Render(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::BadRequest(e) => e.to_string(),
            Self::Dashboard(DashboardError::Render(_)) => "Something went wrong.".to_string(),
            Self::Dashboard(_) => {
                "The task store is unavailable right now. Please try again shortly.".to_string()
            }
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        match render_error_page(status.as_u16(), &message) {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render error page: {}", e);
                (status, message).into_response()
            }
        }
    }
}

impl From<ValidationError> for PageError {
    fn from(e: ValidationError) -> Self {
        Self::BadRequest(e)
    }
}

impl From<DashboardError> for PageError {
    fn from(e: DashboardError) -> Self {
        Self::Dashboard(e)
    }
}
