/// Caller identity
///
/// Every authenticated request is represented by an [`Actor`]: the user id
/// and the role they hold right now. Handlers resolve it once from the
/// `Authorization: Bearer <token>` header and pass it to the services.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::jwt::{validate_token, JwtError};
use crate::models::user::{User, UserRole};

/// The authenticated caller of a service operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User id of the caller
    pub id: i64,

    /// Role the caller holds
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: i64, role: UserRole) -> Self {
        Self { id, role }
    }

    /// Admins and managers see and manage everything
    pub fn is_privileged(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Manager)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

/// Why a request could not be authenticated
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Header present but not a bearer token
    #[error("{0}")]
    InvalidFormat(String),

    /// Token failed validation
    #[error("{0}")]
    InvalidToken(String),

    /// Token is valid but its user no longer exists
    #[error("User no longer exists")]
    UnknownUser,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid token issuer".to_string()),
            other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
        }
    }
}

/// Extracts the token from an `Authorization` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingCredentials)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Resolves an `Authorization` header to the calling [`Actor`]
///
/// The role comes from the users table, not from the token.
pub async fn authenticate(
    pool: &PgPool,
    authorization: Option<&str>,
    secret: &str,
) -> Result<Actor, AuthError> {
    let token = bearer_token(authorization)?;
    let claims = validate_token(token, secret)?;

    let user = User::find_by_id(pool, claims.sub)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    tracing::debug!(user_id = user.id, role = ?user.role, "Authenticated request");
    Ok(Actor::from(&user))
}
