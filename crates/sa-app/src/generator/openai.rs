use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use crate::config::OpenAiConfig;
use crate::generator::provider::{GenerationError, StoryWriter};

const PROVIDER: &str = "openai";
const MAX_TOKENS: u32 = 200;
const SYSTEM_PROMPT: &str =
    "You are a creative writer who creates short, engaging story ideas for YouTube shorts based on keywords.";

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Story prompts through the chat completions API
pub struct OpenAiStoryWriter {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiStoryWriter {
    pub fn new(client: reqwest::Client, config: OpenAiConfig) -> Self {
        Self { client, config }
    }
}

pub fn story_instruction(keywords: &[String]) -> String {
    format!(
        "Create a short story plot with a surprising twist using these keywords: {}",
        keywords.join(", ")
    )
}

#[async_trait]
impl StoryWriter for OpenAiStoryWriter {
    async fn write_story(&self, keywords: &[String]) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let payload = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": story_instruction(keywords)},
            ],
            "max_tokens": MAX_TOKENS,
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GenerationError::upstream(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::upstream(PROVIDER, format!("HTTP {}: {}", status, body)));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| GenerationError::upstream(PROVIDER, format!("unexpected response: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::upstream(PROVIDER, "completion had no content"))
    }
}
