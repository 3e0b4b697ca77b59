/// Project operations
///
/// Projects are managed by Admins and Managers. Developers only see the
/// projects whose team they are on.

use sqlx::PgConnection;

use super::error::{ServiceError, ServiceResult};
use crate::auth::actor::Actor;
use crate::auth::policy::{authorize, visibility, Operation, Resource, ResourceKind};
use crate::models::membership::Membership;
use crate::models::project::{NewProject, Project, ProjectPatch, ProjectView};

pub struct ProjectService;

impl ProjectService {
    /// Loads a project or fails with `NotFound`
    pub(crate) async fn load(conn: &mut PgConnection, project_id: i64) -> ServiceResult<Project> {
        Project::find_by_id(&mut *conn, project_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project"))
    }

    /// Builds the response view, with team and task count read fresh
    pub(crate) async fn view(conn: &mut PgConnection, project: Project) -> ServiceResult<ProjectView> {
        let team_members = Membership::members_of(&mut *conn, project.id).await?;
        let task_count = Project::task_count(&mut *conn, project.id).await?;

        Ok(ProjectView {
            project,
            team_members,
            task_count,
        })
    }

    /// Creates a project owned by the actor
    ///
    /// `team_member_ids` becomes the full team; unknown ids are ignored.
    pub async fn create(
        conn: &mut PgConnection,
        actor: &Actor,
        data: NewProject,
    ) -> ServiceResult<ProjectView> {
        authorize(actor, Operation::Create, &Resource::Project { is_member: false })?;

        let team_member_ids = data.team_member_ids.clone();
        let project = Project::create(&mut *conn, data, Some(actor.id)).await?;
        Membership::replace_members(&mut *conn, project.id, &team_member_ids).await?;

        tracing::info!(
            project_id = project.id,
            creator_id = actor.id,
            name = %project.name,
            "Project created"
        );

        Self::view(conn, project).await
    }

    /// Lists the projects the actor may see
    pub async fn list(
        conn: &mut PgConnection,
        actor: &Actor,
        skip: i64,
        limit: i64,
    ) -> ServiceResult<Vec<ProjectView>> {
        let scope = visibility(actor, ResourceKind::Project);
        let projects = Project::list(&mut *conn, scope, skip.max(0), limit.max(0)).await?;

        let mut views = Vec::with_capacity(projects.len());
        for project in projects {
            views.push(Self::view(&mut *conn, project).await?);
        }

        Ok(views)
    }

    pub async fn get(
        conn: &mut PgConnection,
        actor: &Actor,
        project_id: i64,
    ) -> ServiceResult<ProjectView> {
        let project = Self::load(&mut *conn, project_id).await?;
        let is_member = Membership::is_member(&mut *conn, project.id, actor.id).await?;

        authorize(actor, Operation::Read, &Resource::Project { is_member })?;

        Self::view(conn, project).await
    }

    /// Applies a partial update; a present `team_member_ids` replaces the team
    pub async fn update(
        conn: &mut PgConnection,
        actor: &Actor,
        project_id: i64,
        patch: ProjectPatch,
    ) -> ServiceResult<ProjectView> {
        let mut project = Self::load(&mut *conn, project_id).await?;
        let is_member = Membership::is_member(&mut *conn, project.id, actor.id).await?;

        authorize(actor, Operation::Update, &Resource::Project { is_member })?;

        patch.apply_to(&mut project);
        let project = project.save(&mut *conn).await?;

        if let Some(team_member_ids) = &patch.team_member_ids {
            Membership::replace_members(&mut *conn, project.id, team_member_ids).await?;
        }

        tracing::info!(project_id = project.id, actor_id = actor.id, "Project updated");

        Self::view(conn, project).await
    }

    /// Deletes a project with its tasks, comments, user stories and team
    pub async fn delete(conn: &mut PgConnection, actor: &Actor, project_id: i64) -> ServiceResult<()> {
        let project = Self::load(&mut *conn, project_id).await?;
        let is_member = Membership::is_member(&mut *conn, project.id, actor.id).await?;

        authorize(actor, Operation::Delete, &Resource::Project { is_member })?;

        Project::delete(&mut *conn, project.id).await?;

        tracing::info!(project_id = project.id, actor_id = actor.id, "Project deleted");

        Ok(())
    }
}
