/// Dashboard rollups
///
/// Project and task totals follow the caller's project visibility. The
/// status histogram and the overdue count cover every task in the system.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgConnection;

use super::error::ServiceResult;
use super::project::ProjectService;
use crate::auth::actor::Actor;
use crate::auth::policy::{authorize, visibility, Operation, Resource, ResourceKind};
use crate::models::membership::Membership;
use crate::models::project::Project;
use crate::models::task::{Task, TaskCounts, TaskStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_projects: i64,
    pub total_tasks: i64,

    /// Count per status name, every status present
    pub tasks_by_status: BTreeMap<String, i64>,

    pub overdue_tasks: i64,
    pub my_tasks: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectStats {
    pub project_id: i64,
    pub project_name: String,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,
    pub todo_tasks: i64,
    pub overdue_tasks: i64,
    pub completion_percentage: f64,
}

impl ProjectStats {
    fn new(project: &Project, counts: TaskCounts) -> Self {
        Self {
            project_id: project.id,
            project_name: project.name.clone(),
            total_tasks: counts.total,
            completed_tasks: counts.completed,
            in_progress_tasks: counts.in_progress,
            todo_tasks: counts.todo,
            overdue_tasks: counts.overdue,
            completion_percentage: completion_percentage(counts.completed, counts.total),
        }
    }
}

/// `completed / total * 100`, rounded half-up to two decimals; 0 when there
/// are no tasks
pub fn completion_percentage(completed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }

    let hundredths = (completed * 20_000 + total) / (2 * total);
    hundredths as f64 / 100.0
}

pub struct DashboardService;

impl DashboardService {
    pub async fn stats(conn: &mut PgConnection, actor: &Actor) -> ServiceResult<DashboardStats> {
        Self::stats_at(conn, actor, Utc::now()).await
    }

    /// [`DashboardService::stats`] with overdue evaluated at `now`
    pub async fn stats_at(
        conn: &mut PgConnection,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> ServiceResult<DashboardStats> {
        let scope = visibility(actor, ResourceKind::Project);

        let total_projects = Project::count(&mut *conn, scope).await?;
        let total_tasks = Task::count_in_visible_projects(&mut *conn, scope).await?;

        let mut tasks_by_status: BTreeMap<String, i64> = TaskStatus::ALL
            .iter()
            .map(|status| (status.as_str().to_string(), 0))
            .collect();
        for (status, count) in Task::count_by_status(&mut *conn).await? {
            tasks_by_status.insert(status.as_str().to_string(), count);
        }

        let overdue_tasks = Task::count_overdue(&mut *conn, now).await?;
        let my_tasks = Task::count_assigned_to(&mut *conn, actor.id).await?;

        Ok(DashboardStats {
            total_projects,
            total_tasks,
            tasks_by_status,
            overdue_tasks,
            my_tasks,
        })
    }

    /// Stats for every project the actor may see
    pub async fn project_stats(conn: &mut PgConnection, actor: &Actor) -> ServiceResult<Vec<ProjectStats>> {
        let now = Utc::now();
        let scope = visibility(actor, ResourceKind::Project);
        let projects = Project::list(&mut *conn, scope, 0, i64::MAX).await?;

        let mut stats = Vec::with_capacity(projects.len());
        for project in &projects {
            let counts = Task::counts_for_project(&mut *conn, project.id, now).await?;
            stats.push(ProjectStats::new(project, counts));
        }

        Ok(stats)
    }

    /// Stats for one project, subject to the project read rule
    pub async fn single_project_stats(
        conn: &mut PgConnection,
        actor: &Actor,
        project_id: i64,
    ) -> ServiceResult<ProjectStats> {
        let project = ProjectService::load(&mut *conn, project_id).await?;
        let is_member = Membership::is_member(&mut *conn, project.id, actor.id).await?;

        authorize(actor, Operation::Read, &Resource::Project { is_member })?;

        let counts = Task::counts_for_project(&mut *conn, project.id, Utc::now()).await?;

        Ok(ProjectStats::new(&project, counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_percentage_without_tasks() {
        assert_eq!(completion_percentage(0, 0), 0.0);
    }

    #[test]
    fn test_completion_percentage_all_done() {
        assert_eq!(completion_percentage(4, 4), 100.0);
        assert_eq!(completion_percentage(1, 1), 100.0);
    }

    #[test]
    fn test_completion_percentage_rounds_half_up() {
        assert_eq!(completion_percentage(1, 3), 33.33);
        assert_eq!(completion_percentage(2, 3), 66.67);
        assert_eq!(completion_percentage(1, 8), 12.5);
        assert_eq!(completion_percentage(1, 32), 3.13);
    }

    #[test]
    fn test_project_stats_from_counts() {
        let project = Project {
            id: 5,
            name: "Alpha".to_string(),
            description: None,
            status: Some("Active".to_string()),
            start_date: None,
            end_date: None,
            creator_id: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        let counts = TaskCounts {
            total: 3,
            completed: 1,
            in_progress: 1,
            todo: 1,
            overdue: 0,
        };

        let stats = ProjectStats::new(&project, counts);
        assert_eq!(stats.project_name, "Alpha");
        assert_eq!(stats.completion_percentage, 33.33);
        assert_eq!(stats.todo_tasks, 1);
    }
}
