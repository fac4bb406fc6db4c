//! Meta description generation through a chat-completion endpoint.
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Request, Url};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::config;
use crate::http;

#[async_trait]
pub trait DescriptionGenerator: Send + Sync {
    /// One short marketing description for the given page.
    async fn generate(&self, title: &str, body: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: Url,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Instruction sent for every page; title and body are embedded verbatim.
pub fn build_prompt(title: &str, body: &str) -> String {
    format!(
        "Act as an SEO specialist copywriter.\n\
         Generate a Meta Description within 155-200 characters.\n\
         Title: {}\n\
         Body: {}",
        title, body
    )
}

impl OpenAiClient {
    pub fn from_config(cfg: &config::OpenAi) -> Result<Self> {
        Ok(Self {
            http: http::build_client()?,
            base_url: http::parse_base_url(&cfg.base_url)?,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
        })
    }

    pub fn completion_request(&self, title: &str, body: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".into(),
                content: Some(build_prompt(title, body)),
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    pub fn build_request(&self, payload: &ChatCompletionRequest) -> Result<Request> {
        let endpoint = self
            .base_url
            .join("v1/chat/completions")
            .context("invalid OpenAI base URL")?;
        self.http
            .post(endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(payload)
            .build()
            .context("failed to build completion request")
    }
}

#[async_trait]
impl DescriptionGenerator for OpenAiClient {
    async fn generate(&self, title: &str, body: &str) -> Result<String> {
        let payload = self.completion_request(title, body);
        let request = self.build_request(&payload)?;
        http::log_request("openai", &request);

        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach completion endpoint")?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            warn!("Completion API error - Status: {}, Body: {}", status, body);
            return Err(anyhow!("completion error {}: {}", status, body));
        }

        let response: ChatCompletionResponse =
            res.json().await.context("invalid completion response")?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| anyhow!("failed to generate content: completion returned no text"))?;

        debug!(chars = content.chars().count(), "generated meta description");
        Ok(content)
    }
}
