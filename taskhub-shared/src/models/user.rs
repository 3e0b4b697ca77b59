/// User model and database operations
///
/// Users hold exactly one [`UserRole`]. The role drives every access decision
/// in [`crate::auth::policy`].
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('Admin', 'Manager', 'Developer');
///
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     username VARCHAR(100) NOT NULL UNIQUE,
///     full_name VARCHAR(255) NOT NULL,
///     hashed_password VARCHAR(255) NOT NULL,
///     role user_role NOT NULL DEFAULT 'Developer',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ
/// );
/// ```
///
/// Deleting a user nulls out `creator_id` / `assignee_id` on projects and
/// tasks, and deletes the user's comments, user stories and memberships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// Role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role")]
pub enum UserRole {
    /// Manages everything, including other users
    Admin,

    /// Manages projects, tasks and user stories
    Manager,

    /// Works on the projects they are a team member of
    Developer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Manager => "Manager",
            UserRole::Developer => "Developer",
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Developer
    }
}

/// A user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,

    /// Unique email address
    pub email: String,

    /// Unique login name
    pub username: String,

    pub full_name: String,

    /// Argon2id password hash, never serialized
    #[serde(skip_serializing, default)]
    pub hashed_password: String,

    pub role: UserRole,

    pub created_at: DateTime<Utc>,

    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating a user
///
/// The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub hashed_password: String,
    pub role: UserRole,
}

/// Partial update of a user account
///
/// Only supplied fields change. `password` is plaintext and is hashed by the
/// user service; [`UserPatch::apply_to`] leaves the hash untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<UserRole>,
    pub password: Option<String>,
}

impl UserPatch {
    /// Whether the patch assigns a role different from `current`
    pub fn changes_role(&self, current: UserRole) -> bool {
        self.role.map_or(false, |role| role != current)
    }

    /// Merges the supplied profile fields into `user`
    pub fn apply_to(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(username) = &self.username {
            user.username = username.clone();
        }
        if let Some(full_name) = &self.full_name {
            user.full_name = full_name.clone();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
    }
}

const USER_COLUMNS: &str =
    "id, email, username, full_name, hashed_password, role, created_at, updated_at";

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `users_email_key` or
    /// `users_username_key` when the email or username is taken.
    pub async fn create<'e, E>(executor: E, data: NewUser) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "INSERT INTO users (email, username, full_name, hashed_password, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(data.email)
            .bind(data.username)
            .bind(data.full_name)
            .bind(data.hashed_password)
            .bind(data.role)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Finds a user by login name (used by the login flow)
    pub async fn find_by_username<'e, E>(
        executor: E,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");

        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(executor)
            .await
    }

    /// Loads the users among `ids` that exist, ordered by id
    ///
    /// Unknown ids are skipped.
    pub async fn find_by_ids<'e, E>(executor: E, ids: &[i64]) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1) ORDER BY id");

        sqlx::query_as::<_, User>(&sql)
            .bind(ids)
            .fetch_all(executor)
            .await
    }

    pub async fn list<'e, E>(executor: E, skip: i64, limit: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id OFFSET $1 LIMIT $2");

        sqlx::query_as::<_, User>(&sql)
            .bind(skip)
            .bind(limit)
            .fetch_all(executor)
            .await
    }

    /// Writes every mutable column of `self` back and bumps `updated_at`
    pub async fn save<'e, E>(&self, executor: E) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "UPDATE users \
             SET email = $2, username = $3, full_name = $4, hashed_password = $5, \
                 role = $6, updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(self.id)
            .bind(&self.email)
            .bind(&self.username)
            .bind(&self.full_name)
            .bind(&self.hashed_password)
            .bind(self.role)
            .fetch_one(executor)
            .await
    }

    /// Deletes a user; returns whether a row was removed
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            email: "dev@example.com".to_string(),
            username: "dev".to_string(),
            full_name: "Dev One".to_string(),
            hashed_password: "$argon2id$hash".to_string(),
            role: UserRole::Developer,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_hashed_password_is_not_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("hashed_password").is_none());
        assert_eq!(json["role"], "Developer");
        assert_eq!(json["username"], "dev");
    }

    #[test]
    fn test_patch_applies_only_supplied_fields() {
        let mut user = sample_user();
        let patch = UserPatch {
            full_name: Some("Renamed".to_string()),
            ..Default::default()
        };

        patch.apply_to(&mut user);

        assert_eq!(user.full_name, "Renamed");
        assert_eq!(user.email, "dev@example.com");
        assert_eq!(user.role, UserRole::Developer);
    }

    #[test]
    fn test_patch_changes_role() {
        let same = UserPatch {
            role: Some(UserRole::Developer),
            ..Default::default()
        };
        let promote = UserPatch {
            role: Some(UserRole::Manager),
            ..Default::default()
        };

        assert!(!same.changes_role(UserRole::Developer));
        assert!(promote.changes_role(UserRole::Developer));
        assert!(!UserPatch::default().changes_role(UserRole::Admin));
    }

    #[test]
    fn test_role_wire_names() {
        let role: UserRole = serde_json::from_str("\"Manager\"").unwrap();
        assert_eq!(role, UserRole::Manager);
        assert_eq!(UserRole::Admin.as_str(), "Admin");
        assert_eq!(UserRole::default(), UserRole::Developer);
    }
}
