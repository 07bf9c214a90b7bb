//! Google Gemini native completion provider.
//!
//! Talks to the Gemini `generateContent` REST endpoint directly.
//!
//! # Authentication
//!
//! The API key is sent in the `x-goog-api-key` header, never in the URL.
//! Callers supply it explicitly; this provider never reads the environment
//! itself.
//!
//! # Note
//!
//! One request per call. There is no retry loop and no streaming.

use async_trait::async_trait;
use serde_json::Value;

use crate::llms::base_llm::{
    emit_call_completed_event, emit_call_failed_event, emit_call_started_event, BaseLLM,
    BaseLLMState, LLMMessage, LlmError, MessageRole,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Public Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const PROVIDER_NAME: &str = "Gemini";

const API_KEY_HEADER: &str = "x-goog-api-key";

// ---------------------------------------------------------------------------
// GeminiCompletion provider
// ---------------------------------------------------------------------------

/// Google Gemini native completion implementation.
///
/// # Example
///
/// ```ignore
/// let provider = GeminiCompletion::new("gemini-2.5-flash", api_key)
///     .with_temperature(0.7);
/// let reply = provider.acall(vec![LLMMessage::user("hi")]).await?;
/// ```
#[derive(Debug, Clone)]
pub struct GeminiCompletion {
    /// Shared base LLM state.
    pub state: BaseLLMState,
    /// Maximum output tokens.
    pub max_output_tokens: Option<u32>,
}

impl GeminiCompletion {
    /// Create a new Gemini completion provider.
    ///
    /// # Arguments
    ///
    /// * `model` - Gemini model name (e.g., "gemini-2.5-flash").
    /// * `api_key` - API key sent with every request.
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut state = BaseLLMState::new(model, "gemini");
        state.api_key = Some(api_key.into());

        Self {
            state,
            max_output_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.state.temperature = Some(temperature);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.state.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.state.timeout_secs = secs;
        self
    }

    /// Get the API endpoint URL.
    fn api_endpoint(&self) -> String {
        let base = self
            .state
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!("{}/models/{}:generateContent", base, self.state.model)
    }

    /// Build generation config for the Gemini API.
    pub fn generation_config(&self) -> Value {
        let mut config = serde_json::Map::new();
        if let Some(temp) = self.state.temperature {
            config.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = self.max_output_tokens {
            config.insert("maxOutputTokens".to_string(), serde_json::json!(max_tokens));
        }
        Value::Object(config)
    }

    /// Convert role-tagged messages to Gemini `contents`.
    ///
    /// System messages are lifted out into the `systemInstruction` text;
    /// assistant turns become the `model` role.
    fn format_messages(&self, messages: &[LLMMessage]) -> (Option<String>, Vec<Value>) {
        let mut system_parts: Vec<&str> = Vec::new();
        let mut contents: Vec<Value> = Vec::new();

        for msg in messages {
            let gemini_role = match msg.role {
                MessageRole::System => {
                    system_parts.push(&msg.content);
                    continue;
                }
                MessageRole::User => "user",
                MessageRole::Assistant => "model",
            };
            contents.push(serde_json::json!({
                "role": gemini_role,
                "parts": [{ "text": msg.content }],
            }));
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        (system, contents)
    }

    /// Build the complete request body.
    pub fn build_request_body(&self, messages: &[LLMMessage]) -> Value {
        let (system, contents) = self.format_messages(messages);

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": self.generation_config(),
        });

        if let Some(system_text) = system {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": system_text }]
            });
        }

        body
    }

    /// Extract the reply text from a Gemini API response.
    pub fn parse_response(&self, response: &Value) -> Result<String, LlmError> {
        if let Some(error) = response.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown Gemini API error")
                .to_string();
            return Err(LlmError::Api {
                provider: PROVIDER_NAME.to_string(),
                message,
            });
        }

        let candidates = response
            .get("candidates")
            .and_then(|c| c.as_array())
            .filter(|c| !c.is_empty());

        let Some(candidates) = candidates else {
            if let Some(reason) = response
                .get("promptFeedback")
                .and_then(|f| f.get("blockReason"))
                .and_then(|r| r.as_str())
            {
                return Err(LlmError::Api {
                    provider: PROVIDER_NAME.to_string(),
                    message: format!("prompt blocked ({})", reason),
                });
            }
            return Err(malformed("no candidates in response"));
        };

        let parts = candidates[0]
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .map(Vec::as_slice)
            .unwrap_or_default();

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect();

        if text.is_empty() {
            let reason = candidates[0]
                .get("finishReason")
                .and_then(|r| r.as_str())
                .unwrap_or("UNKNOWN");
            return Err(malformed(format!(
                "first candidate has no text (finishReason: {})",
                reason
            )));
        }

        Ok(text)
    }

    /// Log token usage reported in `usageMetadata`.
    fn log_token_usage(response: &Value) {
        if let Some(usage) = response.get("usageMetadata") {
            let prompt = usage
                .get("promptTokenCount")
                .and_then(|v| v.as_i64())
                .unwrap_or(0);
            let completion = usage
                .get("candidatesTokenCount")
                .and_then(|v| v.as_i64())
                .unwrap_or(0);
            tracing::debug!(
                prompt_tokens = prompt,
                completion_tokens = completion,
                total_tokens = prompt + completion,
                "Gemini usage"
            );
        }
    }

    async fn send(&self, messages: &[LLMMessage]) -> Result<String, LlmError> {
        let api_key = self
            .state
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::Other("Gemini API key not set".to_string()))?;

        let body = self.build_request_body(messages);

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.state.timeout_secs))
            .build()?;

        let response = client
            .post(self.api_endpoint())
            .header("content-type", "application/json")
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::Status {
                provider: PROVIDER_NAME.to_string(),
                status: status.as_u16(),
                body: truncate(&response_text, 500).to_string(),
            });
        }

        let response_json: Value = serde_json::from_str(&response_text).map_err(|e| {
            malformed(format!(
                "{} - Body: {}",
                e,
                truncate(&response_text, 500)
            ))
        })?;

        Self::log_token_usage(&response_json);
        self.parse_response(&response_json)
    }
}

fn malformed(message: impl Into<String>) -> LlmError {
    LlmError::MalformedResponse {
        provider: PROVIDER_NAME.to_string(),
        message: message.into(),
    }
}

/// Longest prefix of `s` with at most `max` bytes, cut on a char boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[async_trait]
impl BaseLLM for GeminiCompletion {
    fn model(&self) -> &str {
        &self.state.model
    }

    fn temperature(&self) -> Option<f64> {
        self.state.temperature
    }

    fn provider(&self) -> &str {
        "gemini"
    }

    async fn acall(&self, messages: Vec<LLMMessage>) -> Result<String, LlmError> {
        emit_call_started_event(&self.state.model, &messages);

        match self.send(&messages).await {
            Ok(reply) => {
                emit_call_completed_event(&self.state.model, reply.len());
                Ok(reply)
            }
            Err(e) => {
                emit_call_failed_event(&self.state.model, &e);
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
