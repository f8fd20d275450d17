//! LLM Client: the single point of entry for all Azure OpenAI calls.
//!
//! No other module may call the model service directly. Chat completions go
//! through `LlmClient` (behind the `ChatModel` trait), embeddings through
//! `embeddings::EmbeddingClient` (behind `embeddings::Embedder`).
//!
//! Calls are made exactly once: there is no retry or backoff.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::AzureDeployment;

pub mod embeddings;
pub mod prompts;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A chat model that turns a prompt into a text completion.
///
/// The scorer only sees this trait, so tests can swap in a scripted model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError>;

    /// Name reported in logs.
    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AzureError {
    error: AzureErrorBody,
}

#[derive(Debug, Deserialize)]
struct AzureErrorBody {
    message: String,
}

/// Builds the deployment-scoped URL for an Azure OpenAI operation.
pub(crate) fn deployment_url(deployment: &AzureDeployment, operation: &str) -> String {
    format!(
        "{}/openai/deployments/{}/{}?api-version={}",
        deployment.endpoint.trim_end_matches('/'),
        deployment.deployment,
        operation,
        deployment.api_version
    )
}

pub(crate) fn build_http_client() -> Result<Client, LlmError> {
    Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

/// Reads a non-2xx response into `LlmError::Api`, preferring the service's
/// own error message when the body parses.
pub(crate) async fn api_error(response: reqwest::Response) -> LlmError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<AzureError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    LlmError::Api { status, message }
}

/// Azure OpenAI chat-completions client. Constructed once at startup and
/// shared through `AppState`.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    deployment: AzureDeployment,
    temperature: f32,
    max_tokens: u32,
}

impl LlmClient {
    pub fn new(
        deployment: AzureDeployment,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_http_client()?,
            deployment,
            temperature,
            max_tokens,
        })
    }

    /// Makes a single call to the chat deployment, returning the full response object.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(deployment_url(&self.deployment, "chat/completions"))
            .header("api-key", &self.deployment.api_key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let chat_response: ChatResponse = response.json().await?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat_response)
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, system).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    fn model_name(&self) -> &str {
        &self.deployment.deployment
    }
}
