//! Statistics report endpoint
//!
//! Computes the agreement report for a project on demand over an immutable
//! snapshot of its responses. Nothing is cached or persisted; the JSON here
//! is what a report renderer consumes.

use axum::extract::{Path, State};
use axum::Json;
use ksc_common::db::models::{ItemSide, ProjectKind};
use serde::Serialize;

use crate::api::projects::rated_item_count;
use crate::api::ApiError;
use crate::stats::{delphi_report, face_validity_report, DelphiReport, FaceValidityReport, StatsConfig};
use crate::{db, AppState};

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReportPayload {
    FaceValidity(FaceValidityReport),
    Delphi(DelphiReport),
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub project_guid: String,
    pub name: String,
    pub kind: ProjectKind,
    pub criteria: Vec<String>,
    pub report: ReportPayload,
}

/// GET /api/projects/:guid/report
pub async fn get_report(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Result<Json<ReportResponse>, ApiError> {
    let project = db::get_project(&state.db, &guid)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("project {}", guid)))?;

    let criteria = db::get_criteria(&state.db, &guid).await?;
    let original = db::get_items(&state.db, &guid, ItemSide::Original).await?;
    let translated = db::get_items(&state.db, &guid, ItemSide::Translated).await?;
    let item_count = rated_item_count(&original, &translated);

    let sheets = db::load_sheet_snapshot(&state.db, &guid, item_count, criteria.len()).await?;
    let config = StatsConfig::default();

    let report = match project.kind {
        ProjectKind::FaceValidity => ReportPayload::FaceValidity(face_validity_report(
            &sheets,
            item_count,
            criteria.len(),
            &config,
        )),
        ProjectKind::Delphi => {
            ReportPayload::Delphi(delphi_report(&sheets, item_count, criteria.len(), &config))
        }
    };

    Ok(Json(ReportResponse {
        project_guid: project.guid,
        name: project.name,
        kind: project.kind,
        criteria,
        report,
    }))
}
