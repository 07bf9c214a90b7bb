//! LLM system.
//!
//! - [`base_llm`] - the provider trait, message type, and error type
//! - [`providers`] - concrete provider implementations (Gemini)

pub mod base_llm;
pub mod providers;

// Re-exports for convenience
pub use base_llm::{BaseLLM, BaseLLMState, LLMMessage, LlmError, MessageRole};
pub use providers::gemini::GeminiCompletion;
