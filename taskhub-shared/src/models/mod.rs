/// Database models for Taskhub
///
/// This module contains the table rows, create inputs and partial-update
/// patches, together with their queries.
///
/// # Models
///
/// - `user`: User accounts and roles
/// - `project`: Projects and their derived response view
/// - `membership`: Project team membership (`project_members`)
/// - `task`: Tasks, list filters and status counts
/// - `comment`: Task comments
/// - `user_story`: Generated user stories
///
/// Query functions accept any [`sqlx::PgExecutor`], so they run the same way
/// against the pool or inside a request transaction.
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::project::{NewProject, Project};
/// use taskhub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let project = Project::create(&pool, NewProject::named("Alpha"), Some(1)).await?;
/// println!("Created project: {}", project.id);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Deserializer};

pub mod comment;
pub mod membership;
pub mod project;
pub mod task;
pub mod user;
pub mod user_story;

/// Deserializes a nullable patch field
///
/// A missing field stays `None` (via `#[serde(default)]`), an explicit
/// `null` becomes `Some(None)` and a value becomes `Some(Some(v))`.
pub(crate) fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        description: Option<Option<String>>,
    }

    #[test]
    fn test_nullable_distinguishes_missing_null_and_value() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.description, None);

        let cleared: Patch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: Patch = serde_json::from_str(r#"{"description": "x"}"#).unwrap();
        assert_eq!(set.description, Some(Some("x".to_string())));
    }
}
