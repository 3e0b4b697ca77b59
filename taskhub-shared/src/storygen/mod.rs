/// User story generation
///
/// Story text comes from an external text-generation provider behind the
/// [`StoryGenerator`] trait. The provider returns free text; [`parse`] turns it
/// into individual stories.
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::storygen::{groq::{GroqConfig, GroqGenerator}, parse::parse_user_stories, StoryGenerator};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let generator = GroqGenerator::new(GroqConfig::new(Some("gsk_...".to_string())))?;
/// let text = generator.generate("Build a login page").await?;
///
/// for story in parse_user_stories(&text) {
///     println!("{story}");
/// }
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;

pub mod groq;
pub mod parse;

/// Errors raised by a text-generation provider
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// No credentials configured for the provider
    #[error("{0}")]
    NotConfigured(String),

    /// Transport failure or an error reported by the provider
    #[error("Error generating user stories: {0}")]
    Provider(String),
}

/// A source of user story text
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Provider name, for logs
    fn name(&self) -> &str;

    /// Generates user stories for a project description
    ///
    /// Returns the provider's raw text, ideally one story per line.
    async fn generate(&self, project_description: &str) -> Result<String, GenerationError>;
}
