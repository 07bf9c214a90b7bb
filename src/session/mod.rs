//! Per-session conversation and navigation state.
//!
//! One [`SessionState`] exists per browser session. It holds the screen the
//! user is on, the module they are chatting with, the transcript, and the
//! category filter of the module grid. Nothing here touches the network;
//! transitions are driven by [`crate::router`] and turns by
//! [`crate::chat::ChatOrchestrator`].

pub mod store;

use std::fmt;

use chrono::Local;
use serde::Serialize;

use crate::catalog::{CategoryFilter, ModuleRecord};
use crate::llms::base_llm::{LLMMessage, MessageRole};

pub use store::{SessionHandle, SessionStore};

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// The three screens of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Onboarding,
    Modules,
    Chat,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Onboarding => write!(f, "onboarding"),
            Self::Modules => write!(f, "modules"),
            Self::Chat => write!(f, "chat"),
        }
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Whether an assistant entry is a real reply or a surfaced failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Reply,
    Error,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Local wall-clock time, `HH:MM`.
    pub timestamp: String,
    pub kind: MessageKind,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: now_hhmm(),
            kind: MessageKind::Reply,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: now_hhmm(),
            kind: MessageKind::Reply,
        }
    }

    /// An assistant entry carrying a configuration or provider failure.
    pub fn assistant_error(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            ..Self::assistant(content)
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }

    /// Provider-facing form of this entry.
    pub fn to_llm_message(&self) -> LLMMessage {
        let role = match self.role {
            Role::User => MessageRole::User,
            Role::Assistant => MessageRole::Assistant,
        };
        LLMMessage::new(role, self.content.clone())
    }
}

fn now_hhmm() -> String {
    Local::now().format("%H:%M").to_string()
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Navigation and transcript state for one session.
///
/// Invariant: when `view == View::Chat`, `active_module` is set and
/// `messages` is non-empty. The mutators below are the only way the router
/// changes the view, and each of them keeps that invariant.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionState {
    view: View,
    active_module: Option<&'static ModuleRecord>,
    messages: Vec<Message>,
    category_filter: CategoryFilter,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn active_module(&self) -> Option<&'static ModuleRecord> {
        self.active_module
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn category_filter(&self) -> CategoryFilter {
        self.category_filter
    }

    /// `onboarding -> modules`, with the filter reset to `All`.
    pub(crate) fn enter_modules(&mut self) {
        self.view = View::Modules;
        self.category_filter = CategoryFilter::All;
    }

    pub(crate) fn set_category_filter(&mut self, filter: CategoryFilter) {
        self.category_filter = filter;
    }

    /// `modules -> chat`: select `module` and seed the transcript with `greeting`.
    pub(crate) fn enter_chat(&mut self, module: &'static ModuleRecord, greeting: String) {
        self.active_module = Some(module);
        self.messages = vec![Message::assistant(greeting)];
        self.view = View::Chat;
    }

    /// `chat -> modules`: drop the module and the whole transcript.
    pub(crate) fn leave_chat(&mut self) {
        self.view = View::Modules;
        self.active_module = None;
        self.messages.clear();
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// True while the last transcript entry is from the user, i.e. a turn
    /// has been accepted but its reply has not landed yet.
    pub fn awaiting_reply(&self) -> bool {
        self.messages
            .last()
            .map(|m| m.role == Role::User)
            .unwrap_or(false)
    }

    /// History to send to the provider. Error turns are skipped unless
    /// `include_errors` is set.
    pub fn history(&self, include_errors: bool) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|m| include_errors || !m.is_error())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn test_defaults() {
        let state = SessionState::new();
        assert_eq!(state.view(), View::Onboarding);
        assert!(state.active_module().is_none());
        assert!(state.messages().is_empty());
        assert_eq!(state.category_filter(), CategoryFilter::All);
        assert!(!state.awaiting_reply());
    }

    #[test]
    fn test_enter_and_leave_chat() {
        let module = catalog::find("sql").unwrap();
        let mut state = SessionState::new();
        state.enter_modules();
        state.enter_chat(module, "hello".to_string());
        assert_eq!(state.view(), View::Chat);
        assert_eq!(state.active_module(), Some(module));
        assert_eq!(state.messages().len(), 1);

        state.push(Message::user("q1"));
        state.push(Message::assistant("a1"));
        state.leave_chat();
        assert_eq!(state.view(), View::Modules);
        assert!(state.active_module().is_none());
        assert!(state.messages().is_empty());
    }

    #[test]
    fn test_awaiting_reply_tracks_last_author() {
        let mut state = SessionState::new();
        state.enter_chat(catalog::find("python").unwrap(), "hi".to_string());
        assert!(!state.awaiting_reply());
        state.push(Message::user("what is a generator?"));
        assert!(state.awaiting_reply());
        state.push(Message::assistant("a lazy iterator"));
        assert!(!state.awaiting_reply());
    }

    #[test]
    fn test_history_excludes_error_turns_by_default() {
        let mut state = SessionState::new();
        state.enter_chat(catalog::find("ml").unwrap(), "hi".to_string());
        state.push(Message::user("q1"));
        state.push(Message::assistant_error("CRITICAL ERROR: boom"));
        state.push(Message::user("q2"));

        let filtered = state.history(false);
        assert_eq!(filtered.len(), 3);
        assert!(filtered.iter().all(|m| !m.is_error()));

        let full = state.history(true);
        assert_eq!(full.len(), 4);
    }

    #[test]
    fn test_message_timestamp_format() {
        let m = Message::user("x");
        assert_eq!(m.timestamp.len(), 5);
        assert_eq!(&m.timestamp[2..3], ":");
    }

    #[test]
    fn test_to_llm_message_maps_roles() {
        assert_eq!(Message::user("a").to_llm_message().role, MessageRole::User);
        assert_eq!(
            Message::assistant_error("b").to_llm_message().role,
            MessageRole::Assistant
        );
    }

    #[test]
    fn test_serializes_view_and_filter_names() {
        let mut state = SessionState::new();
        state.enter_modules();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["view"], "modules");
        assert_eq!(json["category_filter"], "All");
        assert!(json["active_module"].is_null());
    }
}
