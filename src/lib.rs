//! # SkillNexa
//!
//! A browser-based technical mentoring service. A visitor lands on an
//! onboarding screen, picks a learning module from a filterable catalog and
//! then chats with an LLM-backed mentor specialised in that module's subject.
//!
//! The pieces:
//!
//! - [`catalog`] — the fixed set of learning modules
//! - [`prompts`] — the mentor system prompt
//! - [`session`] — per-visitor state and the session store
//! - [`router`] — the onboarding / modules / chat state machine
//! - [`chat`] — chat turns and the mentor client
//! - [`llms`] — LLM provider abstraction and the Gemini backend
//! - [`server`] — axum routes and page rendering

pub mod catalog;
pub mod chat;
pub mod config;
pub mod llms;
pub mod persona;
pub mod prompts;
pub mod router;
pub mod server;
pub mod session;

pub use catalog::{Category, CategoryFilter, ModuleRecord};
pub use chat::{ChatOrchestrator, MentorClient};
pub use config::Settings;
pub use llms::base_llm::BaseLLM;
pub use persona::Persona;
pub use router::{Action, ViewRouter};
pub use session::{SessionState, SessionStore, View};

/// Crate version, reported by `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
