//! Shared API request/response types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Authentication parameters for GET/DELETE requests (query parameters)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthQuery {
    /// Unix epoch time in milliseconds
    pub timestamp: i64,

    /// SHA-256 hash (64 hex chars)
    pub hash: String,
}

/// Error response body returned by every failing endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g. `duplicate_response`)
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_serializes_without_empty_details() {
        let error = ErrorResponse::new("duplicate_response", "Already submitted");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("duplicate_response"));
        assert!(!json.contains("details"));
    }

    #[test]
    fn error_response_with_details() {
        let error = ErrorResponse::with_details(
            "incomplete_submission",
            "Missing cells",
            serde_json::json!({"expected": 30, "found": 20}),
        );
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"expected\":30"));
    }

    #[test]
    fn auth_query_deserializes() {
        let query: AuthQuery =
            serde_json::from_str(r#"{"timestamp": 1730000000000, "hash": "abc"}"#).unwrap();
        assert_eq!(query.timestamp, 1730000000000);
        assert_eq!(query.hash, "abc");
    }
}
