/// User story generation endpoints
///
/// # Errors
///
/// - 403 Forbidden: caller is not an Admin or Manager (generation), or a
///   Developer outside the project (listing)
/// - 502 Bad Gateway: the text-generation provider failed
/// - 503 Service Unavailable: no provider API key configured

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use taskhub_shared::{
    auth::actor::Actor,
    models::user_story::UserStory,
    services::user_story::UserStoryService,
};
use validator::Validate;

/// Generation request
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateStoriesRequest {
    #[serde(rename = "projectDescription")]
    #[validate(length(min = 1, message = "Project description cannot be empty"))]
    pub project_description: String,
}

/// Generates user stories without saving them
pub async fn generate_user_stories(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<GenerateStoriesRequest>,
) -> ApiResult<Json<Vec<String>>> {
    req.validate()?;

    let stories =
        UserStoryService::generate(state.generator.as_ref(), &actor, &req.project_description)
            .await?;

    Ok(Json(stories))
}

/// Generates user stories and saves them under a project
pub async fn generate_and_save_user_stories(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<i64>,
    Json(req): Json<GenerateStoriesRequest>,
) -> ApiResult<Json<Vec<UserStory>>> {
    req.validate()?;

    let mut tx = state.db.begin().await?;
    let stories = UserStoryService::generate_and_save(
        &mut tx,
        state.generator.as_ref(),
        &actor,
        project_id,
        &req.project_description,
    )
    .await?;
    tx.commit().await?;

    Ok(Json(stories))
}

pub async fn list_user_stories(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<i64>,
) -> ApiResult<Json<Vec<UserStory>>> {
    let mut conn = state.db.acquire().await?;
    let stories = UserStoryService::list_for_project(&mut conn, &actor, project_id).await?;

    Ok(Json(stories))
}
