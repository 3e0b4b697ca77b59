/// Comment model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id BIGSERIAL PRIMARY KEY,
///     content TEXT NOT NULL,
///     task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     author_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ
/// );
/// ```
///
/// Comments go away with their task and with their author.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use super::user::User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub task_id: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for commenting on a task
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub content: String,
}

/// Comment as returned to clients, with the author embedded
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,

    pub author: User,
}

const COMMENT_COLUMNS: &str = "id, content, task_id, author_id, created_at, updated_at";

impl Comment {
    pub async fn create<'e, E>(
        executor: E,
        task_id: i64,
        author_id: i64,
        content: &str,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "INSERT INTO comments (content, task_id, author_id) \
             VALUES ($1, $2, $3) RETURNING {COMMENT_COLUMNS}"
        );

        sqlx::query_as::<_, Comment>(&sql)
            .bind(content)
            .bind(task_id)
            .bind(author_id)
            .fetch_one(executor)
            .await
    }

    /// Comments on a task, oldest first
    pub async fn list_for_task<'e, E>(executor: E, task_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE task_id = $1 ORDER BY created_at, id"
        );

        sqlx::query_as::<_, Comment>(&sql)
            .bind(task_id)
            .fetch_all(executor)
            .await
    }
}
