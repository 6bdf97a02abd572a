//! LLM Gateway port
//!
//! Defines the interface for communicating with the model provider.

use async_trait::async_trait;
use roundtable_domain::{Role, TranscriptEntry};
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("No system prompt for role: {0}")]
    UnknownRole(String),

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("Cancelled")]
    Cancelled,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway for LLM communication
///
/// Given the role being invoked and the transcript so far, returns the role's
/// reply. The adapter owns system prompts and provider settings; the
/// dispatcher only decides who is asked and when.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn invoke(
        &self,
        role: &Role,
        transcript: &[TranscriptEntry],
    ) -> Result<String, GatewayError>;
}
