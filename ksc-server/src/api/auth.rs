//! Authentication middleware for owner endpoints
//!
//! Requests with a body carry `timestamp` and `hash` fields inside the JSON;
//! GET and DELETE requests carry them as query parameters. Validation is the
//! shared-secret timestamp+hash scheme from `ksc_common::api::auth`. The
//! invite-token endpoints never pass through here; the token itself is the
//! expert's capability.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

use ksc_common::api::auth::{validate_hash, validate_timestamp, ApiAuthError};
use ksc_common::api::types::{AuthQuery, ErrorResponse};

use crate::AppState;

/// Request body size cap, keeps hash validation from buffering huge bodies
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Authentication middleware for protected routes
///
/// The special secret value 0 disables all checking (used by tests and
/// fresh read-only deployments).
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if state.shared_secret == 0 {
        return Ok(next.run(request).await);
    }

    if request.method() == Method::GET || request.method() == Method::DELETE {
        validate_query_auth(&request, state.shared_secret)?;
        return Ok(next.run(request).await);
    }

    // Buffer the body to validate the hash, then restore it for the handler
    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AuthError::ParseError(format!("Failed to read body: {}", e)))?;

    let json_value: Value = serde_json::from_slice(&body_bytes)
        .map_err(|e| AuthError::ParseError(format!("Invalid JSON: {}", e)))?;

    let auth_fields: AuthQuery = serde_json::from_value(json_value.clone())
        .map_err(|e| AuthError::MissingFields(format!("Missing auth fields: {}", e)))?;

    validate_fields(&auth_fields, &json_value, state.shared_secret)?;

    let request = Request::from_parts(parts, Body::from(body_bytes));
    Ok(next.run(request).await)
}

/// Validate auth carried in query parameters (GET/DELETE have no body)
fn validate_query_auth(request: &Request, shared_secret: i64) -> Result<(), AuthError> {
    let query = request.uri().query().unwrap_or("");
    let fields = parse_auth_query(query)
        .ok_or_else(|| AuthError::MissingFields("timestamp and hash query parameters".into()))?;

    // The hashed document for body-less requests is just the auth envelope
    let envelope = json!({ "timestamp": fields.timestamp, "hash": fields.hash });
    validate_fields(&fields, &envelope, shared_secret)
}

/// Minimal query-string parse for the two auth fields
fn parse_auth_query(query: &str) -> Option<AuthQuery> {
    let mut timestamp = None;
    let mut hash = None;
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=')?;
        match key {
            "timestamp" => timestamp = value.parse::<i64>().ok(),
            "hash" => hash = Some(value.to_string()),
            _ => {}
        }
    }
    Some(AuthQuery {
        timestamp: timestamp?,
        hash: hash?,
    })
}

fn validate_fields(
    fields: &AuthQuery,
    document: &Value,
    shared_secret: i64,
) -> Result<(), AuthError> {
    validate_timestamp(fields.timestamp).map_err(|e| match e {
        ApiAuthError::InvalidTimestamp { reason, .. } => AuthError::InvalidTimestamp(reason),
        other => AuthError::Other(other.to_string()),
    })?;

    validate_hash(&fields.hash, document, shared_secret).map_err(|e| match e {
        ApiAuthError::InvalidHash {
            provided,
            calculated,
        } => {
            warn!(
                "Hash validation failed: provided={}, calculated={}",
                provided, calculated
            );
            AuthError::InvalidHash
        }
        other => AuthError::Other(other.to_string()),
    })
}

/// Authentication error types for HTTP responses
#[derive(Debug)]
pub enum AuthError {
    InvalidTimestamp(String),
    InvalidHash,
    MissingFields(String),
    ParseError(String),
    Other(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AuthError::InvalidTimestamp(reason) => (
                StatusCode::UNAUTHORIZED,
                "timestamp_invalid",
                format!("Invalid timestamp: {}", reason),
            ),
            AuthError::InvalidHash => (
                StatusCode::UNAUTHORIZED,
                "hash_invalid",
                "Invalid hash".to_string(),
            ),
            AuthError::MissingFields(msg) => (
                StatusCode::BAD_REQUEST,
                "missing_auth_fields",
                format!("Missing required fields: {}", msg),
            ),
            AuthError::ParseError(msg) => (
                StatusCode::BAD_REQUEST,
                "parse_error",
                format!("Parse error: {}", msg),
            ),
            AuthError::Other(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "auth_error",
                format!("Authentication error: {}", msg),
            ),
        };

        (status, Json(ErrorResponse::new(error, message))).into_response()
    }
}
