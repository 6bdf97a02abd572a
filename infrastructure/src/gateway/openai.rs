//! OpenAI-compatible chat completions gateway
//!
//! Works against any endpoint speaking the `/chat/completions` protocol
//! (OpenAI, Ollama, vLLM, OpenRouter, ...). Each invocation is one
//! stateless request: the role's system prompt followed by the transcript
//! mapped onto chat roles.

use crate::config::FileGatewayConfig;
use async_trait::async_trait;
use roundtable_application::ports::llm_gateway::{GatewayError, LlmGateway};
use roundtable_domain::util::preview;
use roundtable_domain::{PromptTemplate, Role, Roster, TranscriptEntry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Sent as the only user message when the transcript is empty
pub const KICKOFF_MESSAGE: &str = "The session is starting.";

const ERROR_BODY_BYTES: usize = 500;

/// Connection settings for [`OpenAiGateway`]
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiGatewayConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl OpenAiGatewayConfig {
    pub fn from_file(config: &FileGatewayConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.resolve_api_key(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
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
    content: Option<String>,
}

/// [`LlmGateway`] over an OpenAI-compatible HTTP API
pub struct OpenAiGateway {
    client: reqwest::Client,
    config: OpenAiGatewayConfig,
    roster: Arc<Roster>,
}

impl OpenAiGateway {
    pub fn new(config: OpenAiGatewayConfig, roster: Arc<Roster>) -> Self {
        info!(
            "Using model {} at {}",
            config.model,
            config.base_url.trim_end_matches('/')
        );
        Self {
            client: reqwest::Client::new(),
            config,
            roster,
        }
    }

    /// System prompt for the invoked role
    fn system_prompt(&self, role: &Role) -> Result<String, GatewayError> {
        match role {
            Role::Moderator => Ok(PromptTemplate::moderator_system(&self.roster)),
            Role::Assistant(name) => self
                .roster
                .get(name)
                .map(|specialist| PromptTemplate::specialist_system(&self.roster, specialist))
                .ok_or_else(|| GatewayError::UnknownRole(role.wire_name())),
            Role::User | Role::Context => Err(GatewayError::UnknownRole(role.wire_name())),
        }
    }

    fn build_messages(
        &self,
        role: &Role,
        transcript: &[TranscriptEntry],
    ) -> Result<Vec<ChatMessage>, GatewayError> {
        let mut messages = vec![ChatMessage {
            role: "system",
            content: self.system_prompt(role)?,
        }];
        messages.extend(map_transcript(role, transcript));
        Ok(messages)
    }
}

/// Map transcript entries onto chat roles from the point of view of
/// `speaker`: its own earlier messages are `assistant`, everyone else is a
/// labelled `user` message.
fn map_transcript(speaker: &Role, transcript: &[TranscriptEntry]) -> Vec<ChatMessage> {
    if transcript.is_empty() {
        return vec![ChatMessage {
            role: "user",
            content: KICKOFF_MESSAGE.to_string(),
        }];
    }

    transcript
        .iter()
        .map(|entry| match &entry.role {
            r if r == speaker => ChatMessage {
                role: "assistant",
                content: entry.content.clone(),
            },
            Role::User | Role::Context => ChatMessage {
                role: "user",
                content: entry.content.clone(),
            },
            other => ChatMessage {
                role: "user",
                content: format!("[{}]: {}", other.label(), entry.content),
            },
        })
        .collect()
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn invoke(
        &self,
        role: &Role,
        transcript: &[TranscriptEntry],
    ) -> Result<String, GatewayError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: self.build_messages(role, transcript)?,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        debug!(
            "POST {} as {} ({} messages)",
            self.config.endpoint(),
            role,
            request.messages.len()
        );

        let mut builder = self.client.post(self.config.endpoint()).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                GatewayError::ConnectionError(e.to_string())
            } else {
                GatewayError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = preview(&body, ERROR_BODY_BYTES);
            return Err(if status == reqwest::StatusCode::NOT_FOUND {
                GatewayError::ModelNotAvailable(format!("{} ({})", self.config.model, body))
            } else {
                GatewayError::RequestFailed(format!("HTTP {}: {}", status, body))
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Other(format!("Invalid response body: {}", e)))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GatewayError::EmptyResponse);
        }
        debug!("{} replied with {} bytes", role, text.len());
        Ok(text)
    }
}
