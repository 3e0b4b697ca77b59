/// User story model and database operations
///
/// Stories are immutable once saved: there is no update and no
/// `updated_at` column.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE user_stories (
///     id BIGSERIAL PRIMARY KEY,
///     story TEXT NOT NULL,
///     project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     creator_id BIGINT REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserStory {
    pub id: i64,
    pub story: String,
    pub project_id: i64,
    pub creator_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

const USER_STORY_COLUMNS: &str = "id, story, project_id, creator_id, created_at";

impl UserStory {
    pub async fn create<'e, E>(
        executor: E,
        project_id: i64,
        creator_id: Option<i64>,
        story: &str,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "INSERT INTO user_stories (story, project_id, creator_id) \
             VALUES ($1, $2, $3) RETURNING {USER_STORY_COLUMNS}"
        );

        sqlx::query_as::<_, UserStory>(&sql)
            .bind(story)
            .bind(project_id)
            .bind(creator_id)
            .fetch_one(executor)
            .await
    }

    /// Stories of a project in the order they were saved
    pub async fn list_for_project<'e, E>(
        executor: E,
        project_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "SELECT {USER_STORY_COLUMNS} FROM user_stories WHERE project_id = $1 ORDER BY id"
        );

        sqlx::query_as::<_, UserStory>(&sql)
            .bind(project_id)
            .fetch_all(executor)
            .await
    }
}
