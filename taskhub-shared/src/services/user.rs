/// User account operations
///
/// Registration and credential checks run before there is an actor. Everything
/// else is policy checked: users may edit themselves, Admins may edit anyone,
/// and only Admins change roles or delete accounts.

use serde::Deserialize;
use sqlx::PgConnection;

use super::error::{ServiceError, ServiceResult};
use crate::auth::actor::Actor;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::policy::{authorize, Operation, Resource};
use crate::models::user::{NewUser, User, UserPatch, UserRole};

/// Self-service sign-up data
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub full_name: String,

    #[serde(default)]
    pub role: UserRole,

    pub password: String,
}

pub struct UserService;

impl UserService {
    async fn load(conn: &mut PgConnection, user_id: i64) -> ServiceResult<User> {
        User::find_by_id(&mut *conn, user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    /// Creates an account with a freshly hashed password
    ///
    /// A taken email or username fails with a unique-violation storage error.
    pub async fn register(conn: &mut PgConnection, registration: Registration) -> ServiceResult<User> {
        let hashed_password = hash_password(&registration.password)?;

        let user = User::create(
            &mut *conn,
            NewUser {
                email: registration.email,
                username: registration.username,
                full_name: registration.full_name,
                hashed_password,
                role: registration.role,
            },
        )
        .await?;

        tracing::info!(user_id = user.id, username = %user.username, role = user.role.as_str(), "User registered");

        Ok(user)
    }

    /// Returns the user when `password` matches, `None` otherwise
    pub async fn verify_credentials(
        conn: &mut PgConnection,
        username: &str,
        password: &str,
    ) -> ServiceResult<Option<User>> {
        let Some(user) = User::find_by_username(&mut *conn, username).await? else {
            return Ok(None);
        };

        if verify_password(password, &user.hashed_password)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    pub async fn list(
        conn: &mut PgConnection,
        actor: &Actor,
        skip: i64,
        limit: i64,
    ) -> ServiceResult<Vec<User>> {
        authorize(
            actor,
            Operation::Read,
            &Resource::User {
                user_id: actor.id,
                changes_role: false,
            },
        )?;

        Ok(User::list(&mut *conn, skip.max(0), limit.max(0)).await?)
    }

    pub async fn get(conn: &mut PgConnection, actor: &Actor, user_id: i64) -> ServiceResult<User> {
        let user = Self::load(&mut *conn, user_id).await?;

        authorize(
            actor,
            Operation::Read,
            &Resource::User {
                user_id: user.id,
                changes_role: false,
            },
        )?;

        Ok(user)
    }

    /// Applies a partial update; a supplied password is re-hashed
    pub async fn update(
        conn: &mut PgConnection,
        actor: &Actor,
        user_id: i64,
        patch: UserPatch,
    ) -> ServiceResult<User> {
        let mut user = Self::load(&mut *conn, user_id).await?;

        authorize(
            actor,
            Operation::Update,
            &Resource::User {
                user_id: user.id,
                changes_role: patch.changes_role(user.role),
            },
        )?;

        patch.apply_to(&mut user);
        if let Some(password) = &patch.password {
            user.hashed_password = hash_password(password)?;
        }

        let user = user.save(&mut *conn).await?;

        tracing::info!(user_id = user.id, actor_id = actor.id, "User updated");

        Ok(user)
    }

    /// Deletes an account
    ///
    /// Their projects and tasks stay with the creator/assignee cleared; their
    /// comments and user stories are deleted.
    pub async fn delete(conn: &mut PgConnection, actor: &Actor, user_id: i64) -> ServiceResult<()> {
        let user = Self::load(&mut *conn, user_id).await?;

        authorize(
            actor,
            Operation::Delete,
            &Resource::User {
                user_id: user.id,
                changes_role: false,
            },
        )?;

        User::delete(&mut *conn, user.id).await?;

        tracing::info!(user_id = user.id, actor_id = actor.id, "User deleted");

        Ok(())
    }
}
