//! ksc-server library - Kappa Score Collector HTTP service
//!
//! Routes, handlers, the submission store queries and the agreement
//! statistics engine. The binary in `main.rs` wires this up to a resolved
//! root folder and a SQLite pool.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod extract;
pub mod stats;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Shared secret for API authentication (0 disables auth)
    pub shared_secret: i64,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, shared_secret: i64) -> Self {
        Self { db, shared_secret }
    }
}

/// Build application router
///
/// Owner endpoints require request authentication; the health endpoint and
/// the invite-token expert endpoints do not (the token itself is the
/// capability).
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/api/projects", post(api::create_project).get(api::list_projects))
        .route(
            "/api/projects/:guid",
            get(api::get_project).delete(api::delete_project),
        )
        .route("/api/projects/:guid/items", put(api::replace_items))
        .route("/api/projects/:guid/report", get(api::get_report))
        .route("/api/extract", post(api::extract_items))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/api/invite/:token", get(api::get_invite_project))
        .route("/api/invite/:token/responses", post(api::submit_response))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
