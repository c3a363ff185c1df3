//! LLM agent module for summarization.
//!
//! Sends the whole document in one prompt to an OpenAI-compatible
//! chat-completions endpoint (Groq by default).

pub use crate::summary::Summary;

use crate::config::{Config, API_KEY_VAR};
use crate::document::LoadedDocument;
use crate::prompt::PromptTemplate;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Model used for every request
pub const MODEL: &str = "llama-3.1-8b-instant";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("rate limit or quota exceeded: {0}")]
    RateLimited(String),
    #[error("could not reach the LLM provider: {0}")]
    Network(String),
    #[error("LLM provider rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("malformed response from LLM provider: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ProviderError::Network("request timed out".to_string())
        } else {
            ProviderError::Network(error.to_string())
        }
    }
}

/// Produces a summary of a loaded document
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        document: &LoadedDocument,
        template: &PromptTemplate,
    ) -> Result<Summary, ProviderError>;
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Chat-completions client for Groq's OpenAI-compatible API
pub struct GroqClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GroqClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            config.agent.endpoint.clone(),
            config.api_key().map(str::to_string),
            config.agent.timeout(),
        )
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl Summarizer for GroqClient {
    async fn summarize(
        &self,
        document: &LoadedDocument,
        template: &PromptTemplate,
    ) -> Result<Summary, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Authentication(format!("{API_KEY_VAR} is not set")))?;

        let prompt = template.render(&document.content());
        info!(model = MODEL, prompt_bytes = prompt.len(), "requesting summary");

        let body = ChatRequest {
            model: MODEL,
            messages: vec![Message {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(%status, bytes = text.len(), "provider responded");

        if !status.is_success() {
            let error = status_error(status, &text);
            warn!(%status, "provider error: {error}");
            return Err(error);
        }

        let content = parse_completion(&text)?;
        Ok(Summary::new(content, MODEL))
    }
}

/// Map a non-success status to the matching error kind
fn status_error(status: StatusCode, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(message),
        other => ProviderError::Rejected {
            status: other.as_u16(),
            message,
        },
    }
}

/// Pull the generated text out of a completion body, unchanged
fn parse_completion(body: &str) -> Result<String, ProviderError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| ProviderError::MalformedResponse("no text in response".to_string()))
}
