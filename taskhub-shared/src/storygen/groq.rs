/// Groq chat-completions client
///
/// Talks to Groq's OpenAI-compatible `/chat/completions` endpoint. Without an
/// API key every call fails with [`GenerationError::NotConfigured`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use super::{GenerationError, StoryGenerator};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

const SYSTEM_PROMPT: &str = "You are a product manager who writes clear, actionable user stories.";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1024;

/// Connection settings for [`GroqGenerator`]
#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GroqConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn user_prompt(project_description: &str) -> String {
    format!(
        "You are a product manager expert. Generate detailed user stories from the following project description.\n\
         \n\
         Project Description:\n\
         {project_description}\n\
         \n\
         Generate user stories in the format: \"As a [role], I want to [action], so that [benefit].\"\n\
         \n\
         Provide 5-10 comprehensive user stories that cover the main features and requirements.\n\
         Return ONLY the user stories, one per line, without numbering or additional text."
    )
}

/// [`StoryGenerator`] backed by Groq
pub struct GroqGenerator {
    client: reqwest::Client,
    config: GroqConfig,
}

impl GroqGenerator {
    pub fn new(config: GroqConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Provider(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}

#[async_trait]
impl StoryGenerator for GroqGenerator {
    fn name(&self) -> &str {
        "groq"
    }

    async fn generate(&self, project_description: &str) -> Result<String, GenerationError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationError::NotConfigured("GROQ API key not configured".to_string()))?;

        let prompt = user_prompt(project_description);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        tracing::debug!(model = %self.config.model, "Requesting user stories");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Groq request failed");
                GenerationError::Provider(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Groq returned an error");
            return Err(GenerationError::Provider(format!(
                "provider returned {}",
                status
            )));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Provider(format!("invalid response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| GenerationError::Provider("empty completion".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_api_key_is_not_configured() {
        let generator = GroqGenerator::new(GroqConfig::new(None)).unwrap();
        assert!(!generator.is_configured());

        let err = generator.generate("Build a login page").await.unwrap_err();
        assert!(matches!(err, GenerationError::NotConfigured(_)));
        assert_eq!(err.to_string(), "GROQ API key not configured");
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_provider_error() {
        let mut config = GroqConfig::new(Some("test-key".to_string()));
        config.base_url = "http://127.0.0.1:9".to_string();
        config.timeout = Duration::from_secs(2);
        let generator = GroqGenerator::new(config).unwrap();

        let err = generator.generate("Build a login page").await.unwrap_err();
        assert!(matches!(err, GenerationError::Provider(_)));
    }

    #[test]
    fn test_prompt_embeds_description() {
        let prompt = user_prompt("Build a login page");
        assert!(prompt.contains("Project Description:\nBuild a login page\n"));
        assert!(prompt.contains("As a [role], I want to [action], so that [benefit]."));
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: DEFAULT_MODEL,
            messages: vec![ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["messages"][0]["role"], "system");
    }
}
