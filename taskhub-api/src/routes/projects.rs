/// Project endpoints
///
/// Creating, updating and deleting projects requires the Admin or Manager
/// role. Developers only see projects they are a team member of.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::Pagination,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskhub_shared::{
    auth::actor::Actor,
    models::project::{NewProject, ProjectPatch, ProjectView, DEFAULT_PROJECT_STATUS},
    services::project::ProjectService,
};
use validator::Validate;

fn default_status() -> Option<String> {
    Some(DEFAULT_PROJECT_STATUS.to_string())
}

/// Project creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_status")]
    #[validate(length(max = 100, message = "Status must be at most 100 characters"))]
    pub status: Option<String>,

    #[serde(default)]
    pub start_date: Option<String>,

    #[serde(default)]
    pub end_date: Option<String>,

    /// Initial team; unknown user ids are ignored
    #[serde(default)]
    pub team_member_ids: Vec<i64>,
}

impl From<CreateProjectRequest> for NewProject {
    fn from(req: CreateProjectRequest) -> Self {
        NewProject {
            name: req.name,
            description: req.description,
            status: req.status,
            start_date: req.start_date,
            end_date: req.end_date,
            team_member_ids: req.team_member_ids,
        }
    }
}

fn validate_patch(patch: &ProjectPatch) -> ApiResult<()> {
    match &patch.name {
        Some(name) if name.trim().is_empty() || name.len() > 255 => Err(ApiError::invalid_field(
            "name",
            "Name must be 1-255 characters",
        )),
        _ => Ok(()),
    }
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectView>)> {
    req.validate()?;

    let mut tx = state.db.begin().await?;
    let project = ProjectService::create(&mut tx, &actor, req.into()).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<ProjectView>>> {
    let mut conn = state.db.acquire().await?;
    let projects = ProjectService::list(&mut conn, &actor, page.skip, page.limit).await?;

    Ok(Json(projects))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<i64>,
) -> ApiResult<Json<ProjectView>> {
    let mut conn = state.db.acquire().await?;
    let project = ProjectService::get(&mut conn, &actor, project_id).await?;

    Ok(Json(project))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<i64>,
    Json(patch): Json<ProjectPatch>,
) -> ApiResult<Json<ProjectView>> {
    validate_patch(&patch)?;

    let mut tx = state.db.begin().await?;
    let project = ProjectService::update(&mut tx, &actor, project_id, patch).await?;
    tx.commit().await?;

    Ok(Json(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut tx = state.db.begin().await?;
    ProjectService::delete(&mut tx, &actor, project_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
