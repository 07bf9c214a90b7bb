//! Chat orchestration.
//!
//! A turn is: accept the user's text, append it, ask the [`MentorClient`]
//! for a reply against the whole transcript, append the reply. The submit
//! handler drives this directly; nothing polls the transcript to decide
//! whether a call is due.

pub mod client;

use thiserror::Error;

use crate::session::{Message, MessageKind, SessionState, View};

pub use client::{Completion, MentorClient};

/// Why a submission was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// Messages can only be submitted from the chat screen.
    #[error("Cannot submit a message from the {view} view")]
    NotInChat { view: View },

    /// The previous user message has not been answered yet.
    #[error("A reply is still pending for the previous message")]
    ReplyPending,
}

/// What a submission did to the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing was appended.
    Ignored,
    /// A user message and an assistant entry of the given kind were appended.
    Replied(MessageKind),
}

/// Runs chat turns against a session.
#[derive(Debug, Clone)]
pub struct ChatOrchestrator {
    client: MentorClient,
    resend_error_turns: bool,
}

impl ChatOrchestrator {
    pub fn new(client: MentorClient) -> Self {
        Self {
            client,
            resend_error_turns: false,
        }
    }

    /// Whether error turns are sent back to the provider as context.
    pub fn with_resend_error_turns(mut self, resend: bool) -> Self {
        self.resend_error_turns = resend;
        self
    }

    pub fn client(&self) -> &MentorClient {
        &self.client
    }

    /// Handle one user submission.
    ///
    /// Blank input is ignored. Otherwise the user message is appended, the
    /// provider is called exactly once, and its reply (or the error text
    /// standing in for it) is appended.
    pub async fn on_user_submit(
        &self,
        state: &mut SessionState,
        text: &str,
    ) -> Result<SubmitOutcome, ChatError> {
        let module = match (state.view(), state.active_module()) {
            (View::Chat, Some(module)) => module,
            (view, _) => return Err(ChatError::NotInChat { view }),
        };

        if text.trim().is_empty() {
            return Ok(SubmitOutcome::Ignored);
        }

        if state.awaiting_reply() {
            return Err(ChatError::ReplyPending);
        }

        state.push(Message::user(text));
        tracing::debug!(module = module.id, messages = state.messages().len(), "user turn accepted");

        let history = state.history(self.resend_error_turns);
        let completion = self.client.complete(module.name, &history).await;
        let kind = completion.kind;
        state.push(completion.into_message());

        Ok(SubmitOutcome::Replied(kind))
    }
}
