//! Expert-facing invite endpoints (no owner authentication)
//!
//! The invite token is the capability: whoever holds the link can view the
//! project and submit exactly one response per email address.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use ksc_common::db::models::{ExpertMeta, ItemSide, ProjectKind, ResponseRecord, ScaleItem};
use ksc_common::rating::{RatingSheet, SheetError, DELPHI_MAX, FACE_VALIDITY_MAX};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::api::projects::rated_item_count;
use crate::api::ApiError;
use crate::{db, AppState};

/// What an invited expert sees: the scale, never the owner or other
/// experts' submissions
#[derive(Debug, Serialize)]
pub struct InviteProjectResponse {
    pub name: String,
    pub description: String,
    pub kind: ProjectKind,
    pub criteria: Vec<String>,
    pub original_items: Vec<ScaleItem>,
    pub translated_items: Vec<ScaleItem>,
    pub item_count: usize,
}

/// GET /api/invite/:token
pub async fn get_invite_project(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<InviteProjectResponse>, ApiError> {
    let project = db::get_project_by_token(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::NotFound("invite".to_string()))?;

    let criteria = db::get_criteria(&state.db, &project.guid).await?;
    let original_items = db::get_items(&state.db, &project.guid, ItemSide::Original).await?;
    let translated_items = db::get_items(&state.db, &project.guid, ItemSide::Translated).await?;
    let item_count = rated_item_count(&original_items, &translated_items);

    Ok(Json(InviteProjectResponse {
        name: project.name,
        description: project.description,
        kind: project.kind,
        criteria,
        original_items,
        translated_items,
        item_count,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponseRequest {
    pub expert: ExpertMeta,
    #[serde(default)]
    pub remarks: Option<String>,
    /// Rating rows: `ratings[item][criterion]`
    pub ratings: Vec<Vec<u8>>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponseResponse {
    pub guid: String,
    pub submitted_at: String,
}

/// POST /api/invite/:token/responses
///
/// Intake enforces everything the calculator relies on: complete rating
/// tables with in-range values, and at most one submission per
/// (project, expert email). Incomplete submissions never reach storage.
pub async fn submit_response(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<SubmitResponseRequest>,
) -> Result<(StatusCode, Json<SubmitResponseResponse>), ApiError> {
    let project = db::get_project_by_token(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::NotFound("invite".to_string()))?;

    if request.expert.name.trim().is_empty() || request.expert.email.trim().is_empty() {
        return Err(ApiError::bad_request(
            "missing_expert_fields",
            "Expert name and email are required",
        ));
    }
    let email = request.expert.email.trim().to_lowercase();

    let criteria = db::get_criteria(&state.db, &project.guid).await?;
    let original = db::get_items(&state.db, &project.guid, ItemSide::Original).await?;
    let translated = db::get_items(&state.db, &project.guid, ItemSide::Translated).await?;
    let item_count = rated_item_count(&original, &translated);

    if item_count == 0 || criteria.is_empty() {
        return Err(ApiError::bad_request(
            "project_not_ready",
            "Project has no scale items to rate yet",
        ));
    }

    // Reject-not-update: a second submission for the same email conflicts
    if db::response_exists(&state.db, &project.guid, &email).await? {
        return Err(ApiError::Conflict {
            error: "duplicate_response",
            message: format!("A response from {} already exists for this project", email),
        });
    }

    let max_value = match project.kind {
        ProjectKind::FaceValidity => FACE_VALIDITY_MAX,
        ProjectKind::Delphi => DELPHI_MAX,
    };

    let sheet = RatingSheet::from_rows(&request.ratings, item_count, criteria.len(), max_value)
        .map_err(|e| sheet_error_to_api(e, item_count, criteria.len()))?;

    let record = ResponseRecord {
        guid: Uuid::new_v4().to_string(),
        expert: ExpertMeta {
            name: request.expert.name.trim().to_string(),
            email,
            qualification: request.expert.qualification.trim().to_string(),
            years_experience: request.expert.years_experience.trim().to_string(),
        },
        remarks: request.remarks.filter(|r| !r.trim().is_empty()),
        // submitted_at is set once, server-side, and never updated
        submitted_at: Utc::now().to_rfc3339(),
    };

    db::insert_response(&state.db, &project.guid, &record, &sheet).await?;
    tracing::info!(
        "Recorded response {} from {} for project {}",
        record.guid,
        record.expert.email,
        project.guid
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponseResponse {
            guid: record.guid,
            submitted_at: record.submitted_at,
        }),
    ))
}

fn sheet_error_to_api(err: SheetError, items: usize, criteria: usize) -> ApiError {
    match err {
        SheetError::ItemCountMismatch { expected, found }
        | SheetError::CellCountMismatch {
            expected, found, ..
        } => ApiError::BadRequest {
            error: "incomplete_submission",
            message: err.to_string(),
            details: Some(json!({
                "expected_items": items,
                "expected_criteria": criteria,
                "expected": expected,
                "found": found,
            })),
        },
        SheetError::ValueOutOfRange { .. } => ApiError::BadRequest {
            error: "invalid_rating",
            message: err.to_string(),
            details: None,
        },
    }
}
