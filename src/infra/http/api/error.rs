use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::content::ContentError;
use crate::application::error::ErrorReport;

pub mod codes {
    pub const CONTENT: &str = "content_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
}

/// JSON error response. The body stays generic; the cause travels in an
/// [`ErrorReport`] for the logging middleware.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    report: ErrorReport,
}

impl ApiError {
    pub fn content(err: &ContentError) -> Self {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        Self {
            status,
            code: codes::CONTENT,
            message: "Failed to load content",
            report: ErrorReport::from_error("infra::http::api::content", status, err),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        Self::content(&err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        self.report.attach(&mut response);
        response
    }
}
