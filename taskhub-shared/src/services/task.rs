/// Task operations
///
/// Developers create tasks in their own projects, see tasks of those projects
/// plus tasks assigned to them, and may only move the status of tasks
/// assigned to them.

use sqlx::PgConnection;

use super::error::{ServiceError, ServiceResult};
use super::project::ProjectService;
use crate::auth::actor::Actor;
use crate::auth::policy::{authorize, visibility, Access, Operation, Resource, ResourceKind};
use crate::models::membership::Membership;
use crate::models::task::{NewTask, Task, TaskFilter, TaskPatch, TaskView};
use crate::models::user::User;

pub struct TaskService;

impl TaskService {
    /// Loads a task or fails with `NotFound`
    pub(crate) async fn load(conn: &mut PgConnection, task_id: i64) -> ServiceResult<Task> {
        Task::find_by_id(&mut *conn, task_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task"))
    }

    async fn view(conn: &mut PgConnection, task: Task) -> ServiceResult<TaskView> {
        let assignee = match task.assignee_id {
            Some(user_id) => User::find_by_id(&mut *conn, user_id).await?,
            None => None,
        };

        Ok(TaskView { task, assignee })
    }

    async fn views(conn: &mut PgConnection, tasks: Vec<Task>) -> ServiceResult<Vec<TaskView>> {
        let mut views = Vec::with_capacity(tasks.len());
        for task in tasks {
            views.push(Self::view(&mut *conn, task).await?);
        }
        Ok(views)
    }

    async fn ensure_assignee_exists(conn: &mut PgConnection, user_id: i64) -> ServiceResult<()> {
        match User::find_by_id(&mut *conn, user_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::not_found("Assignee")),
        }
    }

    async fn task_resource(
        conn: &mut PgConnection,
        actor: &Actor,
        task: &Task,
    ) -> ServiceResult<Resource> {
        let is_member = Membership::is_member(&mut *conn, task.project_id, actor.id).await?;

        Ok(Resource::Task {
            is_member,
            assignee_id: task.assignee_id,
        })
    }

    /// Creates a task in an existing project, created by the actor
    pub async fn create(
        conn: &mut PgConnection,
        actor: &Actor,
        data: NewTask,
    ) -> ServiceResult<TaskView> {
        let project = ProjectService::load(&mut *conn, data.project_id).await?;
        let is_member = Membership::is_member(&mut *conn, project.id, actor.id).await?;

        authorize(
            actor,
            Operation::Create,
            &Resource::Task {
                is_member,
                assignee_id: None,
            },
        )?;

        if let Some(assignee_id) = data.assignee_id {
            Self::ensure_assignee_exists(&mut *conn, assignee_id).await?;
        }

        let task = Task::create(&mut *conn, data, Some(actor.id)).await?;

        tracing::info!(
            task_id = task.id,
            project_id = task.project_id,
            creator_id = actor.id,
            "Task created"
        );

        Self::view(conn, task).await
    }

    /// Lists tasks matching `filter` among those the actor may see
    pub async fn list(
        conn: &mut PgConnection,
        actor: &Actor,
        filter: &TaskFilter,
    ) -> ServiceResult<Vec<TaskView>> {
        let scope = visibility(actor, ResourceKind::Task);
        let tasks = Task::list(&mut *conn, filter, scope).await?;

        Self::views(conn, tasks).await
    }

    /// Tasks assigned to the actor
    pub async fn my_tasks(conn: &mut PgConnection, actor: &Actor) -> ServiceResult<Vec<TaskView>> {
        let tasks = Task::list_assigned_to(&mut *conn, actor.id).await?;

        Self::views(conn, tasks).await
    }

    pub async fn get(conn: &mut PgConnection, actor: &Actor, task_id: i64) -> ServiceResult<TaskView> {
        let task = Self::load(&mut *conn, task_id).await?;
        let resource = Self::task_resource(&mut *conn, actor, &task).await?;

        authorize(actor, Operation::Read, &resource)?;

        Self::view(conn, task).await
    }

    /// Applies a partial update
    ///
    /// An assigned Developer may only change the status; any other supplied
    /// field is dropped.
    pub async fn update(
        conn: &mut PgConnection,
        actor: &Actor,
        task_id: i64,
        patch: TaskPatch,
    ) -> ServiceResult<TaskView> {
        let mut task = Self::load(&mut *conn, task_id).await?;
        let resource = Self::task_resource(&mut *conn, actor, &task).await?;

        let patch = match authorize(actor, Operation::Update, &resource)? {
            Access::Full => patch,
            Access::StatusOnly => patch.restrict_to_status(),
        };

        if let Some(assignee_id) = patch.assigned_user() {
            Self::ensure_assignee_exists(&mut *conn, assignee_id).await?;
        }

        patch.apply_to(&mut task);
        let task = task.save(&mut *conn).await?;

        tracing::info!(
            task_id = task.id,
            actor_id = actor.id,
            status = task.status.as_str(),
            "Task updated"
        );

        Self::view(conn, task).await
    }

    /// Deletes a task and its comments
    pub async fn delete(conn: &mut PgConnection, actor: &Actor, task_id: i64) -> ServiceResult<()> {
        let task = Self::load(&mut *conn, task_id).await?;
        let resource = Self::task_resource(&mut *conn, actor, &task).await?;

        authorize(actor, Operation::Delete, &resource)?;

        Task::delete(&mut *conn, task.id).await?;

        tracing::info!(task_id = task.id, actor_id = actor.id, "Task deleted");

        Ok(())
    }
}
