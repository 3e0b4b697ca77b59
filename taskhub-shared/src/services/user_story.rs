/// User story operations
///
/// Generation is reserved for Admins and Managers. Reading saved stories
/// follows project visibility.

use sqlx::PgConnection;

use super::error::ServiceResult;
use super::project::ProjectService;
use crate::auth::actor::Actor;
use crate::auth::policy::{authorize, Operation, Resource};
use crate::models::membership::Membership;
use crate::models::user_story::UserStory;
use crate::storygen::parse::parse_user_stories;
use crate::storygen::StoryGenerator;

pub struct UserStoryService;

impl UserStoryService {
    /// Generates stories for a description without saving them
    pub async fn generate(
        generator: &dyn StoryGenerator,
        actor: &Actor,
        project_description: &str,
    ) -> ServiceResult<Vec<String>> {
        authorize(actor, Operation::Create, &Resource::UserStory { is_member: false })?;

        let text = generator.generate(project_description).await?;
        let stories = parse_user_stories(&text);

        tracing::info!(
            actor_id = actor.id,
            provider = generator.name(),
            count = stories.len(),
            "User stories generated"
        );

        Ok(stories)
    }

    /// Generates stories and saves each one under the project
    ///
    /// A provider failure surfaces before anything is written.
    pub async fn generate_and_save(
        conn: &mut PgConnection,
        generator: &dyn StoryGenerator,
        actor: &Actor,
        project_id: i64,
        project_description: &str,
    ) -> ServiceResult<Vec<UserStory>> {
        let project = ProjectService::load(&mut *conn, project_id).await?;
        let is_member = Membership::is_member(&mut *conn, project.id, actor.id).await?;

        authorize(actor, Operation::Create, &Resource::UserStory { is_member })?;

        let text = generator.generate(project_description).await?;

        let mut saved = Vec::new();
        for story in parse_user_stories(&text) {
            saved.push(UserStory::create(&mut *conn, project.id, Some(actor.id), &story).await?);
        }

        tracing::info!(
            project_id = project.id,
            actor_id = actor.id,
            count = saved.len(),
            "User stories saved"
        );

        Ok(saved)
    }

    pub async fn list_for_project(
        conn: &mut PgConnection,
        actor: &Actor,
        project_id: i64,
    ) -> ServiceResult<Vec<UserStory>> {
        let project = ProjectService::load(&mut *conn, project_id).await?;
        let is_member = Membership::is_member(&mut *conn, project.id, actor.id).await?;

        authorize(actor, Operation::Read, &Resource::UserStory { is_member })?;

        Ok(UserStory::list_for_project(&mut *conn, project.id).await?)
    }
}
