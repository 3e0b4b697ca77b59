/// User management endpoints
///
/// Any signed-in user may list and view accounts. Updates are limited to
/// one's own account unless the caller is an Admin; roles and deletions are
/// Admin-only.

use crate::{app::AppState, error::ApiResult, routes::Pagination};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskhub_shared::{
    auth::actor::Actor,
    models::user::{User, UserPatch, UserRole},
    services::user::UserService,
};
use validator::Validate;

/// Partial user update; absent fields are left alone
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 3, max = 100, message = "Username must be 3-100 characters"))]
    pub username: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Full name must be 1-255 characters"))]
    pub full_name: Option<String>,

    pub role: Option<UserRole>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(req: UpdateUserRequest) -> Self {
        UserPatch {
            email: req.email,
            username: req.username,
            full_name: req.full_name,
            role: req.role,
            password: req.password,
        }
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<User>>> {
    let mut conn = state.db.acquire().await?;
    let users = UserService::list(&mut conn, &actor, page.skip, page.limit).await?;

    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<User>> {
    let mut conn = state.db.acquire().await?;
    let user = UserService::get(&mut conn, &actor, user_id).await?;

    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    req.validate()?;

    let mut tx = state.db.begin().await?;
    let user = UserService::update(&mut tx, &actor, user_id, req.into()).await?;
    tx.commit().await?;

    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut tx = state.db.begin().await?;
    UserService::delete(&mut tx, &actor, user_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
