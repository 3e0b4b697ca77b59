/// Comment operations
///
/// Anyone signed in may read and add comments on an existing task.

use std::collections::HashMap;

use sqlx::PgConnection;

use super::error::{ServiceError, ServiceResult};
use super::task::TaskService;
use crate::auth::actor::Actor;
use crate::auth::policy::{authorize, Operation, Resource};
use crate::models::comment::{Comment, CommentView, NewComment};
use crate::models::user::User;

pub struct CommentService;

impl CommentService {
    /// Adds a comment to a task, authored by the actor
    pub async fn create(
        conn: &mut PgConnection,
        actor: &Actor,
        task_id: i64,
        data: NewComment,
    ) -> ServiceResult<CommentView> {
        let task = TaskService::load(&mut *conn, task_id).await?;

        authorize(actor, Operation::Create, &Resource::Comment)?;

        let author = User::find_by_id(&mut *conn, actor.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;
        let comment = Comment::create(&mut *conn, task.id, author.id, &data.content).await?;

        tracing::info!(
            comment_id = comment.id,
            task_id = task.id,
            author_id = author.id,
            "Comment added"
        );

        Ok(CommentView { comment, author })
    }

    /// Comments on a task, oldest first, with their authors
    pub async fn list_for_task(
        conn: &mut PgConnection,
        actor: &Actor,
        task_id: i64,
    ) -> ServiceResult<Vec<CommentView>> {
        let task = TaskService::load(&mut *conn, task_id).await?;

        authorize(actor, Operation::Read, &Resource::Comment)?;

        let comments = Comment::list_for_task(&mut *conn, task.id).await?;

        let mut author_ids: Vec<i64> = comments.iter().map(|c| c.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<i64, User> = User::find_by_ids(&mut *conn, &author_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        Ok(comments
            .into_iter()
            .filter_map(|comment| {
                let author = authors.get(&comment.author_id).cloned()?;
                Some(CommentView { comment, author })
            })
            .collect())
    }
}
