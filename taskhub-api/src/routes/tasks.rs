/// Task and comment endpoints
///
/// Task visibility and update rights depend on role, team membership and
/// assignment. Comments hang off tasks and are open to every signed-in user.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use taskhub_shared::{
    auth::actor::Actor,
    models::{
        comment::{CommentView, NewComment},
        task::{NewTask, TaskFilter, TaskPatch, TaskStatus, TaskView, DEFAULT_TASK_PRIORITY},
    },
    services::{comment::CommentService, task::TaskService},
};
use validator::Validate;

fn default_priority() -> Option<String> {
    Some(DEFAULT_TASK_PRIORITY.to_string())
}

/// Task creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default = "default_priority")]
    #[validate(length(max = 50, message = "Priority must be at most 50 characters"))]
    pub priority: Option<String>,

    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,

    pub project_id: i64,

    #[serde(default)]
    pub assignee_id: Option<i64>,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(req: CreateTaskRequest) -> Self {
        NewTask {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            deadline: req.deadline,
            project_id: req.project_id,
            assignee_id: req.assignee_id,
        }
    }
}

/// Comment creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, message = "Comment cannot be empty"))]
    pub content: String,
}

fn validate_patch(patch: &TaskPatch) -> ApiResult<()> {
    match &patch.title {
        Some(title) if title.trim().is_empty() || title.len() > 255 => Err(
            ApiError::invalid_field("title", "Title must be 1-255 characters"),
        ),
        _ => Ok(()),
    }
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    req.validate()?;

    let mut tx = state.db.begin().await?;
    let task = TaskService::create(&mut tx, &actor, req.into()).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Lists tasks; supports `project_id`, `status`, `assignee_id`, `skip` and
/// `limit` query parameters
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<Json<Vec<TaskView>>> {
    let mut conn = state.db.acquire().await?;
    let tasks = TaskService::list(&mut conn, &actor, &filter).await?;

    Ok(Json(tasks))
}

pub async fn my_tasks(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<TaskView>>> {
    let mut conn = state.db.acquire().await?;
    let tasks = TaskService::my_tasks(&mut conn, &actor).await?;

    Ok(Json(tasks))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<TaskView>> {
    let mut conn = state.db.acquire().await?;
    let task = TaskService::get(&mut conn, &actor, task_id).await?;

    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(task_id): Path<i64>,
    Json(patch): Json<TaskPatch>,
) -> ApiResult<Json<TaskView>> {
    validate_patch(&patch)?;

    let mut tx = state.db.begin().await?;
    let task = TaskService::update(&mut tx, &actor, task_id, patch).await?;
    tx.commit().await?;

    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(task_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut tx = state.db.begin().await?;
    TaskService::delete(&mut tx, &actor, task_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(task_id): Path<i64>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    req.validate()?;

    let mut tx = state.db.begin().await?;
    let comment = CommentService::create(
        &mut tx,
        &actor,
        task_id,
        NewComment {
            content: req.content,
        },
    )
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<Vec<CommentView>>> {
    let mut conn = state.db.acquire().await?;
    let comments = CommentService::list_for_task(&mut conn, &actor, task_id).await?;

    Ok(Json(comments))
}
