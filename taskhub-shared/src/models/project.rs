/// Project model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     status VARCHAR(100) DEFAULT 'Active',
///     start_date VARCHAR(64),
///     end_date VARCHAR(64),
///     creator_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ
/// );
/// ```
///
/// Deleting a project cascades to its tasks (and their comments), its user
/// stories and its membership rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use super::nullable;
use super::user::User;
use crate::auth::policy::Visibility;

/// Status given to projects created without one
pub const DEFAULT_PROJECT_STATUS: &str = "Active";

fn default_status() -> Option<String> {
    Some(DEFAULT_PROJECT_STATUS.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,

    /// Free-text status, "Active" by default
    pub status: Option<String>,

    /// Opaque date strings, stored as given
    pub start_date: Option<String>,
    pub end_date: Option<String>,

    /// Creating user; null once that user is deleted
    pub creator_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating a project
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_status")]
    pub status: Option<String>,

    #[serde(default)]
    pub start_date: Option<String>,

    #[serde(default)]
    pub end_date: Option<String>,

    /// Initial team; unknown user ids are ignored
    #[serde(default)]
    pub team_member_ids: Vec<i64>,
}

impl NewProject {
    /// A project with only a name and default values elsewhere
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            status: default_status(),
            start_date: None,
            end_date: None,
            team_member_ids: Vec::new(),
        }
    }
}

/// Partial update of a project
///
/// Absent fields are left alone. For nullable fields an explicit `null`
/// clears the value. `team_member_ids`, when present, replaces the team.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    pub status: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    pub start_date: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    pub end_date: Option<Option<String>>,

    pub team_member_ids: Option<Vec<i64>>,
}

impl ProjectPatch {
    /// Merges the supplied column fields into `project`
    ///
    /// Membership is not a column and is handled by the caller.
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
        if let Some(status) = &self.status {
            project.status = status.clone();
        }
        if let Some(start_date) = &self.start_date {
            project.start_date = start_date.clone();
        }
        if let Some(end_date) = &self.end_date {
            project.end_date = end_date.clone();
        }
    }
}

/// Project as returned to clients, with derived fields
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,

    pub team_members: Vec<User>,

    /// Number of tasks in the project, computed at read time
    pub task_count: i64,
}

const PROJECT_COLUMNS: &str =
    "id, name, description, status, start_date, end_date, creator_id, created_at, updated_at";

impl Project {
    pub async fn create<'e, E>(
        executor: E,
        data: NewProject,
        creator_id: Option<i64>,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "INSERT INTO projects (name, description, status, start_date, end_date, creator_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PROJECT_COLUMNS}"
        );

        sqlx::query_as::<_, Project>(&sql)
            .bind(data.name)
            .bind(data.description)
            .bind(data.status)
            .bind(data.start_date)
            .bind(data.end_date)
            .bind(creator_id)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");

        sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Lists projects in id order, restricted to the caller's teams when
    /// `visibility` is [`Visibility::Linked`]
    pub async fn list<'e, E>(
        executor: E,
        visibility: Visibility,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        match visibility {
            Visibility::All => {
                let sql = format!(
                    "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id OFFSET $1 LIMIT $2"
                );
                sqlx::query_as::<_, Project>(&sql)
                    .bind(skip)
                    .bind(limit)
                    .fetch_all(executor)
                    .await
            }
            Visibility::Linked(user_id) => {
                let sql = format!(
                    "SELECT {PROJECT_COLUMNS} FROM projects p \
                     WHERE EXISTS (SELECT 1 FROM project_members pm \
                                   WHERE pm.project_id = p.id AND pm.user_id = $1) \
                     ORDER BY id OFFSET $2 LIMIT $3"
                );
                sqlx::query_as::<_, Project>(&sql)
                    .bind(user_id)
                    .bind(skip)
                    .bind(limit)
                    .fetch_all(executor)
                    .await
            }
        }
    }

    /// Number of projects visible under `visibility`
    pub async fn count<'e, E>(executor: E, visibility: Visibility) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        match visibility {
            Visibility::All => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects")
                    .fetch_one(executor)
                    .await
            }
            Visibility::Linked(user_id) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM project_members WHERE user_id = $1",
                )
                .bind(user_id)
                .fetch_one(executor)
                .await
            }
        }
    }

    /// Writes every column of `self` back and bumps `updated_at`
    pub async fn save<'e, E>(&self, executor: E) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "UPDATE projects \
             SET name = $2, description = $3, status = $4, start_date = $5, end_date = $6, \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {PROJECT_COLUMNS}"
        );

        sqlx::query_as::<_, Project>(&sql)
            .bind(self.id)
            .bind(&self.name)
            .bind(&self.description)
            .bind(&self.status)
            .bind(&self.start_date)
            .bind(&self.end_date)
            .fetch_one(executor)
            .await
    }

    /// Deletes a project and, through the foreign keys, everything it owns
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn task_count<'e, E>(executor: E, project_id: i64) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(executor)
            .await
    }
}
