/// Authentication endpoints
///
/// Provides registration, login and the current-user lookup.
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Create an account (JSON body)
/// - `POST /api/auth/login` - Exchange username and password for an access
///   token (form encoded, `username` + `password`)
/// - `GET /api/auth/me` - The authenticated user
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/auth/login \
///   -d 'username=alice&password=secret123'
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Form, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use taskhub_shared::{
    auth::{actor::Actor, jwt},
    models::user::{User, UserRole},
    services::user::{Registration, UserService},
};
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 3, max = 100, message = "Username must be 3-100 characters"))]
    pub username: String,

    #[validate(length(min = 1, max = 255, message = "Full name must be 1-255 characters"))]
    pub full_name: String,

    /// Defaults to Developer
    #[serde(default)]
    pub role: UserRole,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Registration {
            email: req.email,
            username: req.username,
            full_name: req.full_name,
            role: req.role,
            password: req.password,
        }
    }
}

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Access token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    /// Always "bearer"
    pub token_type: String,
}

/// Registers a new user
///
/// # Errors
///
/// - 409 Conflict: email or username already taken
/// - 422 Unprocessable Entity: validation errors
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    req.validate()?;

    let mut tx = state.db.begin().await?;
    let user = UserService::register(&mut tx, req.into()).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Issues an access token for valid credentials
///
/// # Errors
///
/// - 401 Unauthorized: unknown username or wrong password
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let mut conn = state.db.acquire().await?;

    let user = UserService::verify_credentials(&mut conn, &form.username, &form.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Incorrect username or password".to_string()))?;

    let claims = jwt::Claims::with_expiration(
        user.id,
        Duration::minutes(state.config.jwt.expiration_minutes),
    );
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Returns the authenticated user
pub async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<User>> {
    let mut conn = state.db.acquire().await?;
    let user = UserService::get(&mut conn, &actor, actor.id).await?;

    Ok(Json(user))
}
