//! Base LLM trait and shared provider state.
//!
//! Every chat-completion backend implements [`BaseLLM`]: given an ordered
//! list of role-tagged messages it returns one assistant message or an
//! [`LlmError`]. The mentor client only ever talks to this trait, which is
//! also the seam tests use to script provider behavior.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default request timeout for provider HTTP calls, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Role of a message in a provider conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single message in an LLM conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LLMMessage {
    pub role: MessageRole,
    pub content: String,
}

impl LLMMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures while talking to a chat-completion provider.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport failure: connect, TLS, timeout, body read. The request URL
    /// is stripped before the error is stored.
    #[error("{0}")]
    Transport(reqwest::Error),

    /// Non-success HTTP status.
    #[error("{provider} API error ({status}): {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    /// The provider answered with an explicit error object.
    #[error("{provider} API error: {message}")]
    Api { provider: String, message: String },

    /// The response could not be understood.
    #[error("Malformed {provider} response: {message}")]
    MalformedResponse { provider: String, message: String },

    /// Anything else a backend wants to surface.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }
}

// ---------------------------------------------------------------------------
// BaseLLM trait
// ---------------------------------------------------------------------------

/// Interface for chat-completion backends.
#[async_trait]
pub trait BaseLLM: Send + Sync + fmt::Debug {
    /// Get the model identifier/name.
    fn model(&self) -> &str;

    /// Get the optional temperature setting.
    fn temperature(&self) -> Option<f64>;

    /// Get the provider name.
    fn provider(&self) -> &str;

    /// Send `messages` and return the assistant's reply text.
    async fn acall(&self, messages: Vec<LLMMessage>) -> Result<String, LlmError>;
}

// ---------------------------------------------------------------------------
// BaseLLMState - shared state for LLM implementations
// ---------------------------------------------------------------------------

/// Shared configuration for provider implementations.
#[derive(Clone, Serialize, Deserialize)]
pub struct BaseLLMState {
    /// The model identifier/name.
    pub model: String,
    /// Optional temperature setting for response generation.
    pub temperature: Option<f64>,
    /// API key.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Optional base URL override for the API.
    pub base_url: Option<String>,
    /// Provider name (e.g., "gemini").
    pub provider: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl BaseLLMState {
    /// Create a new `BaseLLMState` with the given model name.
    pub fn new(model: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            api_key: None,
            base_url: None,
            provider: provider.into(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

// Hand-written so the API key never reaches logs.
impl fmt::Debug for BaseLLMState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseLLMState")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("provider", &self.provider)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Call events
// ---------------------------------------------------------------------------

pub fn emit_call_started_event(model: &str, messages: &[LLMMessage]) {
    tracing::debug!(model, messages = messages.len(), "LLM call started");
}

pub fn emit_call_completed_event(model: &str, reply_len: usize) {
    tracing::debug!(model, reply_len, "LLM call completed");
}

pub fn emit_call_failed_event(model: &str, error: &LlmError) {
    tracing::warn!(model, error = %error, "LLM call failed");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
