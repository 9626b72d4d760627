/// Agent client: the single point of entry for all calls to the external agent service.
///
/// The agent owns conversation threads and performs every piece of content generation.
/// This module only creates threads, runs them synchronously and probes liveness.
/// No retries: a failed call is surfaced to the caller immediately.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub mod prompts;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("agent returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("agent response did not include a thread id")]
    MissingThreadId,
}

/// Result of a synchronous run: the thread's full message history.
/// Entries stay as raw JSON because the agent mixes human, ai and tool message shapes.
#[derive(Debug, Default, Deserialize)]
pub struct RunOutput {
    #[serde(default)]
    pub messages: Vec<Value>,
}

impl RunOutput {
    pub fn reply(&self) -> Option<String> {
        extract_reply(&self.messages)
    }
}

/// Seam between the chat layer and the agent transport. Tests inject fakes here.
#[async_trait]
pub trait AgentService: Send + Sync {
    /// Creates a new conversation thread and returns its opaque id.
    async fn create_thread(&self) -> Result<String, AgentError>;

    /// Posts one user message to the thread and waits for the run to finish.
    async fn run_wait(&self, thread_id: &str, content: &str) -> Result<RunOutput, AgentError>;

    /// Liveness probe.
    async fn info(&self) -> Result<(), AgentError>;
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    assistant_id: &'a str,
    input: RunInput<'a>,
}

#[derive(Debug, Serialize)]
struct RunInput<'a> {
    messages: Vec<RunMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RunMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ThreadResponse {
    thread_id: Option<String>,
}

/// HTTP client for the agent service.
#[derive(Clone)]
pub struct AgentClient {
    client: Client,
    base_url: String,
    assistant_id: String,
}

impl AgentClient {
    pub fn new(
        base_url: impl Into<String>,
        assistant_id: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, AgentError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            assistant_id: assistant_id.into(),
        })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, AgentError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(AgentError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AgentService for AgentClient {
    async fn create_thread(&self) -> Result<String, AgentError> {
        let response = self
            .client
            .post(format!("{}/threads", self.base_url))
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let thread: ThreadResponse = Self::check(response).await?.json().await?;
        let thread_id = thread
            .thread_id
            .filter(|id| !id.is_empty())
            .ok_or(AgentError::MissingThreadId)?;

        debug!("Created agent thread {thread_id}");
        Ok(thread_id)
    }

    async fn run_wait(&self, thread_id: &str, content: &str) -> Result<RunOutput, AgentError> {
        let body = RunRequest {
            assistant_id: &self.assistant_id,
            input: RunInput {
                messages: vec![RunMessage {
                    role: "user",
                    content,
                }],
            },
        };

        let response = self
            .client
            .post(format!("{}/threads/{thread_id}/runs/wait", self.base_url))
            .json(&body)
            .send()
            .await?;

        let output: RunOutput = Self::check(response).await?.json().await?;
        debug!(
            "Run on thread {thread_id} finished with {} messages",
            output.messages.len()
        );
        Ok(output)
    }

    async fn info(&self) -> Result<(), AgentError> {
        let response = self
            .client
            .get(format!("{}/info", self.base_url))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

/// Returns the most recent non-empty assistant message, scanning from the end.
/// Tool-call entries carry list content or an empty string and are skipped.
pub fn extract_reply(messages: &[Value]) -> Option<String> {
    messages.iter().rev().find_map(|msg| {
        let is_assistant = msg.get("type").and_then(Value::as_str) == Some("ai")
            || msg.get("role").and_then(Value::as_str) == Some("assistant");
        if !is_assistant {
            return None;
        }
        msg.get("content")
            .and_then(Value::as_str)
            .filter(|content| !content.trim().is_empty())
            .map(str::to_string)
    })
}
