//! Project and scale-item CRUD endpoints (owner-authenticated)

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use ksc_common::db::models::{ItemSide, Project, ProjectKind, ResponseRecord, ScaleItem};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::ApiError;
use crate::{db, AppState};

/// Default rubric for face-validity studies: ten binary criteria per item
pub const FACE_VALIDITY_CRITERIA: [&str; 10] = [
    "The item is clear and understandable",
    "The language is simple and unambiguous",
    "The vocabulary is familiar to the target population",
    "The translation reads naturally",
    "The item preserves the meaning of the original",
    "The item is relevant to the measured construct",
    "The item is appropriate for the cultural context",
    "The item is free of offensive or biased wording",
    "The item asks about a single idea",
    "The response options fit the item",
];

/// Default rubric for Delphi studies: four ordinal criteria per item
pub const DELPHI_CRITERIA: [&str; 4] = ["Relevance", "Clarity", "Simplicity", "Ambiguity"];

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub kind: ProjectKind,
    #[serde(default)]
    pub description: String,
    pub owner: String,
    /// Criterion labels; the per-kind default rubric applies when omitted
    #[serde(default)]
    pub criteria: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ProjectSummaryResponse {
    #[serde(flatten)]
    pub project: Project,
    pub item_count: i64,
    pub response_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ResponseWithRatings {
    #[serde(flatten)]
    pub record: ResponseRecord,
    pub ratings: Vec<Vec<u8>>,
}

#[derive(Debug, Serialize)]
pub struct ProjectDetailResponse {
    #[serde(flatten)]
    pub project: Project,
    pub criteria: Vec<String>,
    pub original_items: Vec<ScaleItem>,
    pub translated_items: Vec<ScaleItem>,
    pub responses: Vec<ResponseWithRatings>,
}

/// Number of item rows experts rate: the translated list, or the original
/// list while no translation has been entered yet
pub(crate) fn rated_item_count(original: &[ScaleItem], translated: &[ScaleItem]) -> usize {
    if translated.is_empty() {
        original.len()
    } else {
        translated.len()
    }
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("missing_name", "Project name is required"));
    }
    if request.owner.trim().is_empty() {
        return Err(ApiError::bad_request("missing_owner", "Project owner is required"));
    }

    let criteria: Vec<String> = match request.criteria {
        Some(labels) => {
            let labels: Vec<String> = labels
                .into_iter()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect();
            if labels.is_empty() {
                return Err(ApiError::bad_request(
                    "empty_criteria",
                    "Criteria list must contain at least one label",
                ));
            }
            labels
        }
        None => default_criteria(request.kind),
    };

    let project = Project {
        guid: Uuid::new_v4().to_string(),
        name: request.name.trim().to_string(),
        description: request.description.trim().to_string(),
        kind: request.kind,
        owner: request.owner.trim().to_string(),
        invite_token: Uuid::new_v4().to_string(),
        created_at: Utc::now().to_rfc3339(),
    };

    db::insert_project(&state.db, &project, &criteria).await?;
    tracing::info!("Created {} project {} ({})", project.kind.as_str(), project.name, project.guid);

    Ok((StatusCode::CREATED, Json(project)))
}

fn default_criteria(kind: ProjectKind) -> Vec<String> {
    match kind {
        ProjectKind::FaceValidity => {
            FACE_VALIDITY_CRITERIA.iter().map(|s| s.to_string()).collect()
        }
        ProjectKind::Delphi => DELPHI_CRITERIA.iter().map(|s| s.to_string()).collect(),
    }
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectSummaryResponse>>, ApiError> {
    let summaries = db::list_projects(&state.db).await?;
    Ok(Json(
        summaries
            .into_iter()
            .map(|s| ProjectSummaryResponse {
                project: s.project,
                item_count: s.item_count,
                response_count: s.response_count,
            })
            .collect(),
    ))
}

/// GET /api/projects/:guid
pub async fn get_project(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Result<Json<ProjectDetailResponse>, ApiError> {
    let project = db::get_project(&state.db, &guid)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("project {}", guid)))?;

    let criteria = db::get_criteria(&state.db, &guid).await?;
    let original_items = db::get_items(&state.db, &guid, ItemSide::Original).await?;
    let translated_items = db::get_items(&state.db, &guid, ItemSide::Translated).await?;

    let item_count = rated_item_count(&original_items, &translated_items);
    let records = db::get_responses(&state.db, &guid).await?;
    let mut responses = Vec::with_capacity(records.len());
    for record in records {
        let sheet =
            db::get_rating_sheet(&state.db, &record.guid, item_count, criteria.len()).await?;
        responses.push(ResponseWithRatings {
            record,
            ratings: sheet.to_rows(),
        });
    }

    Ok(Json(ProjectDetailResponse {
        project,
        criteria,
        original_items,
        translated_items,
        responses,
    }))
}

/// DELETE /api/projects/:guid
pub async fn delete_project(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Result<StatusCode, ApiError> {
    if db::delete_project(&state.db, &guid).await? {
        tracing::info!("Deleted project {}", guid);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("project {}", guid)))
    }
}

#[derive(Debug, Deserialize)]
pub struct ReplaceItemsRequest {
    #[serde(default)]
    pub original: Vec<String>,
    #[serde(default)]
    pub translated: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReplaceItemsResponse {
    pub original_count: usize,
    pub translated_count: usize,
}

/// PUT /api/projects/:guid/items
///
/// Replaces both parallel lists. Items correspond across lists by position
/// only, so the lists are replaced wholesale rather than patched.
pub async fn replace_items(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    Json(request): Json<ReplaceItemsRequest>,
) -> Result<Json<ReplaceItemsResponse>, ApiError> {
    if db::get_project(&state.db, &guid).await?.is_none() {
        return Err(ApiError::NotFound(format!("project {}", guid)));
    }

    let original: Vec<String> = request
        .original
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    let translated: Vec<String> = request
        .translated
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    db::replace_items(&state.db, &guid, &original, &translated).await?;

    Ok(Json(ReplaceItemsResponse {
        original_count: original.len(),
        translated_count: translated.len(),
    }))
}
