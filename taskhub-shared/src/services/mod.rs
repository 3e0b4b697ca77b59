/// Entity services
///
/// Each operation takes the request's open connection (normally a
/// transaction) and the calling [`Actor`](crate::auth::actor::Actor). It loads
/// what it needs (404), asks the access policy (403), performs the storage
/// work and returns a view with derived fields computed fresh. The caller
/// commits on success; dropping the transaction on error rolls it back.
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::auth::actor::Actor;
/// use taskhub_shared::models::project::NewProject;
/// use taskhub_shared::models::user::UserRole;
/// use taskhub_shared::services::project::ProjectService;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let manager = Actor::new(1, UserRole::Manager);
///
/// let mut tx = pool.begin().await?;
/// let project = ProjectService::create(&mut tx, &manager, NewProject::named("Alpha")).await?;
/// tx.commit().await?;
///
/// println!("{} has {} tasks", project.project.name, project.task_count);
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod dashboard;
pub mod error;
pub mod project;
pub mod task;
pub mod user;
pub mod user_story;

pub use error::{ServiceError, ServiceResult};
