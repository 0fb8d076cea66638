//! HTTP API handlers for ksc-server

pub mod auth;
pub mod extract;
pub mod health;
pub mod invite;
pub mod projects;
pub mod report;

pub use auth::auth_middleware;
pub use extract::extract_items;
pub use health::health_routes;
pub use invite::{get_invite_project, submit_response};
pub use projects::{
    create_project, delete_project, get_project, list_projects, replace_items,
};
pub use report::get_report;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ksc_common::api::types::ErrorResponse;
use serde_json::Value;

/// Handler error mapped onto a JSON error body and status code
#[derive(Debug)]
pub enum ApiError {
    /// 404 with the named resource
    NotFound(String),
    /// 409, e.g. a duplicate expert submission
    Conflict {
        error: &'static str,
        message: String,
    },
    /// 400 with an error identifier and optional diagnostic details
    BadRequest {
        error: &'static str,
        message: String,
        details: Option<Value>,
    },
    /// 500
    Internal(String),
}

impl ApiError {
    pub fn bad_request(error: &'static str, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            error,
            message: message.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("not_found", format!("Not found: {}", what)),
            ),
            ApiError::Conflict { error, message } => {
                (StatusCode::CONFLICT, ErrorResponse::new(error, message))
            }
            ApiError::BadRequest {
                error,
                message,
                details,
            } => {
                let body = match details {
                    Some(details) => ErrorResponse::with_details(error, message, details),
                    None => ErrorResponse::new(error, message),
                };
                (StatusCode::BAD_REQUEST, body)
            }
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("internal_error", message),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ksc_common::Error> for ApiError {
    fn from(err: ksc_common::Error) -> Self {
        match err {
            ksc_common::Error::NotFound(what) => ApiError::NotFound(what),
            ksc_common::Error::InvalidInput(msg) => {
                ApiError::bad_request("invalid_input", msg)
            }
            other => {
                tracing::error!("Request failed: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}
