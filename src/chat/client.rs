//! Mentor-facing wrapper around the chat-completion backend.
//!
//! [`MentorClient::complete`] never fails: a missing credential or any
//! provider error is turned into the persona's fixed error text, which the
//! orchestrator stores in the transcript like an ordinary reply.

use std::sync::Arc;

use crate::config::Settings;
use crate::llms::{BaseLLM, GeminiCompletion, LLMMessage};
use crate::persona::Persona;
use crate::prompts::build_system_prompt;
use crate::session::{Message, MessageKind};

/// Result of one completion, ready to append to the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub kind: MessageKind,
}

impl Completion {
    fn reply(content: String) -> Self {
        Self {
            content,
            kind: MessageKind::Reply,
        }
    }

    fn error(content: String) -> Self {
        Self {
            content,
            kind: MessageKind::Error,
        }
    }

    pub fn into_message(self) -> Message {
        match self.kind {
            MessageKind::Reply => Message::assistant(self.content),
            MessageKind::Error => Message::assistant_error(self.content),
        }
    }
}

/// LLM client adapter used by the chat orchestrator.
#[derive(Debug, Clone)]
pub struct MentorClient {
    backend: Option<Arc<dyn BaseLLM>>,
    persona: Persona,
}

impl MentorClient {
    /// Client backed by `backend`.
    pub fn new(backend: Arc<dyn BaseLLM>, persona: Persona) -> Self {
        Self {
            backend: Some(backend),
            persona,
        }
    }

    /// Client with no credential; every turn yields the missing-key reply.
    pub fn unconfigured(persona: Persona) -> Self {
        Self {
            backend: None,
            persona,
        }
    }

    /// Gemini-backed client if the credential is present, unconfigured otherwise.
    pub fn from_settings(settings: &Settings) -> Self {
        match settings.api_key.as_deref() {
            Some(key) => {
                let mut gemini = GeminiCompletion::new(&settings.model, key)
                    .with_temperature(settings.temperature)
                    .with_timeout_secs(settings.request_timeout_secs);
                if let Some(base) = &settings.gemini_base_url {
                    gemini = gemini.with_base_url(base);
                }
                Self::new(Arc::new(gemini), settings.persona)
            }
            None => {
                tracing::warn!(
                    "No provider credential configured; chat turns will report a missing API key"
                );
                Self::unconfigured(settings.persona)
            }
        }
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Ask the backend for the next mentor turn.
    ///
    /// The request is one system message built from `subject` followed by
    /// `history` mapped role-for-role, in order.
    pub async fn complete(&self, subject: &str, history: &[Message]) -> Completion {
        let Some(backend) = &self.backend else {
            return Completion::error(self.persona.missing_credential_message().to_string());
        };

        let messages = build_messages(subject, history);
        match backend.acall(messages).await {
            Ok(text) => Completion::reply(text),
            Err(e) => {
                tracing::error!(subject, error = %e, "mentor completion failed");
                Completion::error(self.persona.provider_error_message(&e))
            }
        }
    }
}

/// System instruction for `subject` followed by the transcript.
pub fn build_messages(subject: &str, history: &[Message]) -> Vec<LLMMessage> {
    std::iter::once(LLMMessage::system(build_system_prompt(subject)))
        .chain(history.iter().map(Message::to_llm_message))
        .collect()
}
