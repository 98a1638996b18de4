use crate::completion::{Completion, CompletionError, Turn};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
    pub role: Option<String>,
}

/// Only text parts are produced or consumed here; other part kinds
/// deserialize with `text: None` and are skipped.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    pub usage_metadata: Option<UsageMetadata>,
    #[serde(rename = "promptFeedback")]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PromptFeedback {
    #[serde(rename = "blockReason")]
    pub block_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    pub prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    pub candidates_token_count: u32,
    #[serde(rename = "totalTokenCount", default)]
    pub total_token_count: u32,
}

impl From<&Turn> for Content {
    fn from(turn: &Turn) -> Self {
        Content {
            parts: vec![Part { text: Some(turn.text.clone()) }],
            role: Some(turn.role.as_str().to_string()),
        }
    }
}

impl GenerateContentRequest {
    pub fn from_turns(turns: &[Turn]) -> Self {
        Self {
            contents: turns.iter().map(Content::from).collect(),
        }
    }
}

impl GenerateContentResponse {
    /// Text of the first candidate, with all of its text parts joined.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            model,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        })
    }

    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, CompletionError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        tracing::debug!("Gemini API Request contents count: {}", request.contents.len());

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(CompletionError::ApiError {
                status: status.as_u16(),
                body: response_text,
            });
        }

        tracing::debug!(
            "Gemini API response (truncated): {}...",
            response_text.chars().take(500).collect::<String>()
        );

        let result: GenerateContentResponse = serde_json::from_str(&response_text)?;

        if let Some(reason) = result.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_ref()) {
            tracing::warn!("Gemini blocked the prompt: {}", reason);
        }
        if let Some(usage) = &result.usage_metadata {
            tracing::debug!(
                prompt_tokens = usage.prompt_token_count,
                completion_tokens = usage.candidates_token_count,
                total_tokens = usage.total_token_count,
                "Gemini token usage"
            );
        }

        Ok(result)
    }
}

#[async_trait]
impl Completion for GeminiClient {
    async fn generate(&self, turns: &[Turn]) -> Result<Option<String>, CompletionError> {
        let request = GenerateContentRequest::from_turns(turns);
        let response = self.generate_content(&request).await?;
        Ok(response.text())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
