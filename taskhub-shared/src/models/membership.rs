/// Project team membership
///
/// A row in `project_members` makes a user part of a project's team. For
/// Developers this is what grants visibility into the project and its tasks.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE project_members (
///     project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```

use sqlx::{PgConnection, PgExecutor};

use super::user::User;

pub struct Membership;

impl Membership {
    /// Checks whether `user_id` is on the team of `project_id`
    pub async fn is_member<'e, E>(
        executor: E,
        project_id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM project_members WHERE project_id = $1 AND user_id = $2)",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(executor)
        .await
    }

    /// Replaces the whole team of a project
    ///
    /// Ids that do not refer to an existing user are ignored. Duplicates in
    /// `user_ids` collapse to a single row.
    pub async fn replace_members(
        conn: &mut PgConnection,
        project_id: i64,
        user_ids: &[i64],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM project_members WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *conn)
            .await?;

        if user_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO project_members (project_id, user_id)
            SELECT $1, id FROM users WHERE id = ANY($2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(project_id)
        .bind(user_ids)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Team members of a project, ordered by user id
    pub async fn members_of<'e, E>(executor: E, project_id: i64) -> Result<Vec<User>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.username, u.full_name, u.hashed_password, u.role,
                   u.created_at, u.updated_at
            FROM users u
            JOIN project_members pm ON pm.user_id = u.id
            WHERE pm.project_id = $1
            ORDER BY u.id
            "#,
        )
        .bind(project_id)
        .fetch_all(executor)
        .await
    }
}
