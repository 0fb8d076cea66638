//! Scale-item extraction endpoint (owner-authenticated)

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::ApiError;
use crate::extract::{extract_from_text, ExtractError, Extraction};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    /// Plain text content, already decoded by the caller
    pub text: String,
    /// Declared file extension, with or without the leading dot
    pub extension: String,
}

/// POST /api/extract
///
/// Returns detected language and candidate item texts; the owner reviews
/// them before saving as scale items.
pub async fn extract_items(
    State(_state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<Extraction>, ApiError> {
    let extraction = extract_from_text(&request.text, &request.extension).map_err(|e| match e {
        ExtractError::UnsupportedFormat(_) => {
            ApiError::bad_request("unsupported_format", e.to_string())
        }
        ExtractError::CorruptContent(_) => {
            ApiError::bad_request("corrupt_content", e.to_string())
        }
    })?;

    Ok(Json(extraction))
}
