//! Database access layer for ksc-server
//!
//! Query functions over the shared schema. Handlers call these and never
//! touch SQL directly; the statistics engine only ever sees the
//! `Vec<RatingSheet>` snapshot loaded here.

use ksc_common::db::models::{ExpertMeta, ItemSide, Project, ProjectKind, ResponseRecord, ScaleItem};
use ksc_common::{RatingSheet, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

/// A project row plus its response count, for the list endpoint
#[derive(Debug, Clone)]
pub struct ProjectSummary {
    pub project: Project,
    pub item_count: i64,
    pub response_count: i64,
}

fn row_to_project(
    row: (String, String, String, String, String, String, String),
) -> Option<Project> {
    let (guid, name, description, kind, owner, invite_token, created_at) = row;
    Some(Project {
        guid,
        name,
        description,
        kind: ProjectKind::parse(&kind)?,
        owner,
        invite_token,
        created_at,
    })
}

const PROJECT_COLUMNS: &str =
    "guid, name, description, kind, owner, invite_token, created_at";

/// Insert a new project with its criteria list
pub async fn insert_project(
    pool: &SqlitePool,
    project: &Project,
    criteria: &[String],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO projects (guid, name, description, kind, owner, invite_token, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&project.guid)
    .bind(&project.name)
    .bind(&project.description)
    .bind(project.kind.as_str())
    .bind(&project.owner)
    .bind(&project.invite_token)
    .bind(&project.created_at)
    .execute(&mut *tx)
    .await?;

    for (position, label) in criteria.iter().enumerate() {
        sqlx::query("INSERT INTO criteria (project_guid, position, label) VALUES (?, ?, ?)")
            .bind(&project.guid)
            .bind(position as i64)
            .bind(label)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// List all projects with item and response counts
pub async fn list_projects(pool: &SqlitePool) -> Result<Vec<ProjectSummary>> {
    let rows: Vec<(String, String, String, String, String, String, String, i64, i64)> =
        sqlx::query_as(
            "SELECT p.guid, p.name, p.description, p.kind, p.owner, p.invite_token, p.created_at,
                    (SELECT COUNT(*) FROM scale_items s
                      WHERE s.project_guid = p.guid AND s.side = 'translated'),
                    (SELECT COUNT(*) FROM responses r WHERE r.project_guid = p.guid)
             FROM projects p
             ORDER BY p.created_at DESC",
        )
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|r| {
            let (guid, name, description, kind, owner, invite_token, created_at, items, responses) =
                r;
            Some(ProjectSummary {
                project: row_to_project((
                    guid,
                    name,
                    description,
                    kind,
                    owner,
                    invite_token,
                    created_at,
                ))?,
                item_count: items,
                response_count: responses,
            })
        })
        .collect())
}

/// Fetch one project by guid
pub async fn get_project(pool: &SqlitePool, guid: &str) -> Result<Option<Project>> {
    let row: Option<(String, String, String, String, String, String, String)> = sqlx::query_as(
        &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE guid = ?"),
    )
    .bind(guid)
    .fetch_optional(pool)
    .await?;

    Ok(row.and_then(row_to_project))
}

/// Fetch one project by its invite token (expert access path)
pub async fn get_project_by_token(pool: &SqlitePool, token: &str) -> Result<Option<Project>> {
    let row: Option<(String, String, String, String, String, String, String)> = sqlx::query_as(
        &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE invite_token = ?"),
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(row.and_then(row_to_project))
}

/// Delete a project; children cascade via foreign keys
pub async fn delete_project(pool: &SqlitePool, guid: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM projects WHERE guid = ?")
        .bind(guid)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Ordered criterion labels for a project
pub async fn get_criteria(pool: &SqlitePool, project_guid: &str) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT label FROM criteria WHERE project_guid = ? ORDER BY position",
    )
    .bind(project_guid)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}

/// Ordered scale items for one side of a project
pub async fn get_items(
    pool: &SqlitePool,
    project_guid: &str,
    side: ItemSide,
) -> Result<Vec<ScaleItem>> {
    let rows: Vec<(String, i64, String)> = sqlx::query_as(
        "SELECT guid, position, text FROM scale_items
         WHERE project_guid = ? AND side = ? ORDER BY position",
    )
    .bind(project_guid)
    .bind(side.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(guid, position, text)| ScaleItem {
            guid,
            position,
            text,
        })
        .collect())
}

/// Replace both scale-item lists of a project in one transaction
pub async fn replace_items(
    pool: &SqlitePool,
    project_guid: &str,
    original: &[String],
    translated: &[String],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM scale_items WHERE project_guid = ?")
        .bind(project_guid)
        .execute(&mut *tx)
        .await?;

    for (side, texts) in [(ItemSide::Original, original), (ItemSide::Translated, translated)] {
        for (position, text) in texts.iter().enumerate() {
            sqlx::query(
                "INSERT INTO scale_items (guid, project_guid, side, position, text)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(project_guid)
            .bind(side.as_str())
            .bind(position as i64)
            .bind(text)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

/// Whether an expert email already submitted for a project
pub async fn response_exists(
    pool: &SqlitePool,
    project_guid: &str,
    email: &str,
) -> Result<bool> {
    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM responses WHERE project_guid = ? AND expert_email = ?",
    )
    .bind(project_guid)
    .bind(email)
    .fetch_one(pool)
    .await?;
    Ok(count.0 > 0)
}

/// Store one expert response and its rating cells atomically
pub async fn insert_response(
    pool: &SqlitePool,
    project_guid: &str,
    record: &ResponseRecord,
    sheet: &RatingSheet,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO responses
         (guid, project_guid, expert_name, expert_email, qualification, years_experience, remarks, submitted_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&record.guid)
    .bind(project_guid)
    .bind(&record.expert.name)
    .bind(&record.expert.email)
    .bind(&record.expert.qualification)
    .bind(&record.expert.years_experience)
    .bind(&record.remarks)
    .bind(&record.submitted_at)
    .execute(&mut *tx)
    .await?;

    for item in 0..sheet.items() {
        for criterion in 0..sheet.criteria() {
            sqlx::query(
                "INSERT INTO ratings (response_guid, item_index, criterion_index, value)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(&record.guid)
            .bind(item as i64)
            .bind(criterion as i64)
            .bind(sheet.get(item, criterion) as i64)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

/// All response headers for a project, oldest first
pub async fn get_responses(pool: &SqlitePool, project_guid: &str) -> Result<Vec<ResponseRecord>> {
    let rows: Vec<(String, String, String, String, String, Option<String>, String)> =
        sqlx::query_as(
            "SELECT guid, expert_name, expert_email, qualification, years_experience, remarks, submitted_at
             FROM responses WHERE project_guid = ? ORDER BY submitted_at",
        )
        .bind(project_guid)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(
            |(guid, name, email, qualification, years_experience, remarks, submitted_at)| {
                ResponseRecord {
                    guid,
                    expert: ExpertMeta {
                        name,
                        email,
                        qualification,
                        years_experience,
                    },
                    remarks,
                    submitted_at,
                }
            },
        )
        .collect())
}

/// Load one response's rating sheet
pub async fn get_rating_sheet(
    pool: &SqlitePool,
    response_guid: &str,
    items: usize,
    criteria: usize,
) -> Result<RatingSheet> {
    let rows: Vec<(i64, i64, i64)> = sqlx::query_as(
        "SELECT item_index, criterion_index, value FROM ratings WHERE response_guid = ?",
    )
    .bind(response_guid)
    .fetch_all(pool)
    .await?;

    let mut sheet = RatingSheet::new(items, criteria);
    for (item, criterion, value) in rows {
        let (item, criterion) = (item as usize, criterion as usize);
        // Cells outside the current item lists (after an owner edit) are
        // dropped from the snapshot rather than corrupting the table
        if item < items && criterion < criteria {
            sheet.set(item, criterion, value as u8);
        }
    }
    Ok(sheet)
}

/// Immutable snapshot of every expert's sheet for a project
pub async fn load_sheet_snapshot(
    pool: &SqlitePool,
    project_guid: &str,
    items: usize,
    criteria: usize,
) -> Result<Vec<RatingSheet>> {
    let responses = get_responses(pool, project_guid).await?;
    let mut sheets = Vec::with_capacity(responses.len());
    for response in &responses {
        sheets.push(get_rating_sheet(pool, &response.guid, items, criteria).await?);
    }
    Ok(sheets)
}
