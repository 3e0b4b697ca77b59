/// Task model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('To Do', 'In Progress', 'Done');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'To Do',
///     priority VARCHAR(50) DEFAULT 'Medium',
///     deadline TIMESTAMPTZ,
///     project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     assignee_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     creator_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ
/// );
/// ```
///
/// A task always belongs to the project it was created in; `project_id` is
/// never part of an update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, Postgres, QueryBuilder};

use super::nullable;
use super::user::User;
use crate::auth::policy::Visibility;

/// Priority given to tasks created without one
pub const DEFAULT_TASK_PRIORITY: &str = "Medium";

/// Page size used when a list request names none
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Workflow state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    #[sqlx(rename = "To Do")]
    #[serde(rename = "To Do")]
    ToDo,

    #[sqlx(rename = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,

    #[sqlx(rename = "Done")]
    #[serde(rename = "Done")]
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::ToDo
    }
}

fn default_priority() -> Option<String> {
    Some(DEFAULT_TASK_PRIORITY.to_string())
}

fn default_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,

    /// Free-text priority, "Medium" by default
    pub priority: Option<String>,

    pub deadline: Option<DateTime<Utc>>,

    pub project_id: i64,

    /// Assigned user; null when unassigned or after that user is deleted
    pub assignee_id: Option<i64>,

    /// Creating user; null once that user is deleted
    pub creator_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating a task
#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default = "default_priority")]
    pub priority: Option<String>,

    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,

    pub project_id: i64,

    #[serde(default)]
    pub assignee_id: Option<i64>,
}

impl NewTask {
    /// A task with only a title and default values elsewhere
    pub fn titled(project_id: i64, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            priority: default_priority(),
            deadline: None,
            project_id,
            assignee_id: None,
        }
    }
}

/// Partial update of a task
///
/// Absent fields are left alone; for nullable fields an explicit `null`
/// clears the value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,

    pub status: Option<TaskStatus>,

    #[serde(default, deserialize_with = "nullable")]
    pub priority: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    pub deadline: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "nullable")]
    pub assignee_id: Option<Option<i64>>,
}

impl TaskPatch {
    /// Drops everything except `status`
    pub fn restrict_to_status(self) -> Self {
        Self {
            status: self.status,
            ..Self::default()
        }
    }

    /// New assignee, if the patch sets one
    pub fn assigned_user(&self) -> Option<i64> {
        self.assignee_id.flatten()
    }

    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = &self.priority {
            task.priority = priority.clone();
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
        if let Some(assignee_id) = self.assignee_id {
            task.assignee_id = assignee_id;
        }
    }
}

/// Query filters for task listing
#[derive(Debug, Clone, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub project_id: Option<i64>,

    #[serde(default)]
    pub status: Option<TaskStatus>,

    #[serde(default)]
    pub assignee_id: Option<i64>,

    #[serde(default)]
    pub skip: i64,

    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            project_id: None,
            status: None,
            assignee_id: None,
            skip: 0,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

/// Task as returned to clients, with the assignee embedded
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,

    pub assignee: Option<User>,
}

/// Status breakdown of one project's tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct TaskCounts {
    pub total: i64,
    pub completed: i64,
    pub in_progress: i64,
    pub todo: i64,
    pub overdue: i64,
}

const TASK_COLUMNS: &str = "id, title, description, status, priority, deadline, project_id, \
                            assignee_id, creator_id, created_at, updated_at";

impl Task {
    pub async fn create<'e, E>(
        executor: E,
        data: NewTask,
        creator_id: Option<i64>,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "INSERT INTO tasks \
             (title, description, status, priority, deadline, project_id, assignee_id, creator_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {TASK_COLUMNS}"
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(data.title)
            .bind(data.description)
            .bind(data.status)
            .bind(data.priority)
            .bind(data.deadline)
            .bind(data.project_id)
            .bind(data.assignee_id)
            .bind(creator_id)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");

        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Lists tasks matching `filter`, in id order
    ///
    /// Under [`Visibility::Linked`] only tasks assigned to that user or
    /// belonging to one of their projects are returned.
    pub async fn list<'e, E>(
        executor: E,
        filter: &TaskFilter,
        visibility: Visibility,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE TRUE"));

        if let Some(project_id) = filter.project_id {
            query.push(" AND t.project_id = ").push_bind(project_id);
        }
        if let Some(status) = filter.status {
            query.push(" AND t.status = ").push_bind(status);
        }
        if let Some(assignee_id) = filter.assignee_id {
            query.push(" AND t.assignee_id = ").push_bind(assignee_id);
        }
        if let Visibility::Linked(user_id) = visibility {
            query
                .push(" AND (t.assignee_id = ")
                .push_bind(user_id)
                .push(
                    " OR EXISTS (SELECT 1 FROM project_members pm \
                     WHERE pm.project_id = t.project_id AND pm.user_id = ",
                )
                .push_bind(user_id)
                .push("))");
        }

        query
            .push(" ORDER BY t.id OFFSET ")
            .push_bind(filter.skip.max(0))
            .push(" LIMIT ")
            .push_bind(filter.limit.max(0));

        query.build_query_as::<Task>().fetch_all(executor).await
    }

    /// Tasks currently assigned to `user_id`
    pub async fn list_assigned_to<'e, E>(executor: E, user_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE assignee_id = $1 ORDER BY id");

        sqlx::query_as::<_, Task>(&sql)
            .bind(user_id)
            .fetch_all(executor)
            .await
    }

    /// Writes every mutable column of `self` back and bumps `updated_at`
    pub async fn save<'e, E>(&self, executor: E) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "UPDATE tasks \
             SET title = $2, description = $3, status = $4, priority = $5, deadline = $6, \
                 assignee_id = $7, updated_at = NOW() \
             WHERE id = $1 RETURNING {TASK_COLUMNS}"
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(self.id)
            .bind(&self.title)
            .bind(&self.description)
            .bind(self.status)
            .bind(&self.priority)
            .bind(self.deadline)
            .bind(self.assignee_id)
            .fetch_one(executor)
            .await
    }

    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of tasks in the projects visible under `visibility`
    ///
    /// For [`Visibility::Linked`] this counts tasks of the user's projects
    /// only; tasks merely assigned to them elsewhere are not included.
    pub async fn count_in_visible_projects<'e, E>(
        executor: E,
        visibility: Visibility,
    ) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        match visibility {
            Visibility::All => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks")
                    .fetch_one(executor)
                    .await
            }
            Visibility::Linked(user_id) => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    SELECT COUNT(*) FROM tasks t
                    JOIN project_members pm ON pm.project_id = t.project_id
                    WHERE pm.user_id = $1
                    "#,
                )
                .bind(user_id)
                .fetch_one(executor)
                .await
            }
        }
    }

    /// Task count per status over all tasks; statuses with no tasks are
    /// absent from the result
    pub async fn count_by_status<'e, E>(executor: E) -> Result<Vec<(TaskStatus, i64)>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, (TaskStatus, i64)>(
            "SELECT status, COUNT(*) FROM tasks GROUP BY status",
        )
        .fetch_all(executor)
        .await
    }

    /// Tasks past their deadline at `now` that are not done, over all tasks
    pub async fn count_overdue<'e, E>(executor: E, now: DateTime<Utc>) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tasks WHERE deadline < $1 AND status <> $2",
        )
        .bind(now)
        .bind(TaskStatus::Done)
        .fetch_one(executor)
        .await
    }

    pub async fn count_assigned_to<'e, E>(executor: E, user_id: i64) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks WHERE assignee_id = $1")
            .bind(user_id)
            .fetch_one(executor)
            .await
    }

    /// Status breakdown of a project's tasks, overdue evaluated at `now`
    pub async fn counts_for_project<'e, E>(
        executor: E,
        project_id: i64,
        now: DateTime<Utc>,
    ) -> Result<TaskCounts, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TaskCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'Done') AS completed,
                COUNT(*) FILTER (WHERE status = 'In Progress') AS in_progress,
                COUNT(*) FILTER (WHERE status = 'To Do') AS todo,
                COUNT(*) FILTER (WHERE deadline < $2 AND status <> 'Done') AS overdue
            FROM tasks
            WHERE project_id = $1
            "#,
        )
        .bind(project_id)
        .bind(now)
        .fetch_one(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        Task {
            id: 10,
            title: "T1".to_string(),
            description: Some("first".to_string()),
            status: TaskStatus::ToDo,
            priority: Some("Medium".to_string()),
            deadline: None,
            project_id: 1,
            assignee_id: Some(2),
            creator_id: Some(1),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_value(TaskStatus::ToDo).unwrap(), "To Do");
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            "In Progress"
        );
        let done: TaskStatus = serde_json::from_str("\"Done\"").unwrap();
        assert_eq!(done, TaskStatus::Done);
        assert_eq!(TaskStatus::InProgress.as_str(), "In Progress");
    }

    #[test]
    fn test_new_task_defaults() {
        let data: NewTask = serde_json::from_str(r#"{"title": "T1", "project_id": 3}"#).unwrap();

        assert_eq!(data.status, TaskStatus::ToDo);
        assert_eq!(data.priority.as_deref(), Some(DEFAULT_TASK_PRIORITY));
        assert_eq!(data.assignee_id, None);
    }

    #[test]
    fn test_restrict_to_status_drops_other_fields() {
        let patch: TaskPatch = serde_json::from_str(
            r#"{"title": "Hijacked", "status": "Done", "assignee_id": null, "priority": "High"}"#,
        )
        .unwrap();

        let restricted = patch.restrict_to_status();
        assert_eq!(
            restricted,
            TaskPatch {
                status: Some(TaskStatus::Done),
                ..Default::default()
            }
        );

        let mut task = sample_task();
        restricted.apply_to(&mut task);
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.title, "T1");
        assert_eq!(task.assignee_id, Some(2));
        assert_eq!(task.priority.as_deref(), Some("Medium"));
    }

    #[test]
    fn test_patch_can_unassign() {
        let patch: TaskPatch = serde_json::from_str(r#"{"assignee_id": null}"#).unwrap();
        let mut task = sample_task();

        patch.apply_to(&mut task);

        assert_eq!(task.assignee_id, None);
        assert_eq!(patch.assigned_user(), None);
    }

    #[test]
    fn test_filter_defaults() {
        let filter: TaskFilter = serde_json::from_str("{}").unwrap();
        assert_eq!(filter.skip, 0);
        assert_eq!(filter.limit, DEFAULT_LIST_LIMIT);
        assert!(filter.status.is_none());
    }

    #[test]
    fn test_view_embeds_assignee() {
        let view = TaskView {
            task: sample_task(),
            assignee: None,
        };

        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json["title"], "T1");
        assert_eq!(json["status"], "To Do");
        assert!(json["assignee"].is_null());
    }
}
