/// Dashboard endpoints

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use taskhub_shared::{
    auth::actor::Actor,
    services::dashboard::{DashboardService, DashboardStats, ProjectStats},
};

pub async fn stats(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<DashboardStats>> {
    let mut conn = state.db.acquire().await?;
    let stats = DashboardService::stats(&mut conn, &actor).await?;

    Ok(Json(stats))
}

pub async fn project_stats(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<ProjectStats>>> {
    let mut conn = state.db.acquire().await?;
    let stats = DashboardService::project_stats(&mut conn, &actor).await?;

    Ok(Json(stats))
}

pub async fn single_project_stats(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<i64>,
) -> ApiResult<Json<ProjectStats>> {
    let mut conn = state.db.acquire().await?;
    let stats = DashboardService::single_project_stats(&mut conn, &actor, project_id).await?;

    Ok(Json(stats))
}
