//! Runtime configuration.
//!
//! Settings come from the process environment, optionally seeded from a
//! `.env` file by the server binary. A missing provider credential is not an
//! error: the service starts and every chat turn reports the missing key.
//!
//! # Environment Variables
//!
//! - `Gemini` — provider API key
//! - `SKILLNEXA_MODEL` — model id (default: `gemini-2.5-flash`)
//! - `SKILLNEXA_TEMPERATURE` — sampling temperature in `0.0..=2.0` (default: `0.7`)
//! - `SKILLNEXA_PERSONA` — `mentor` (default) or `hud`
//! - `SKILLNEXA_RESEND_ERRORS` — resend error turns as context (default: `false`)
//! - `SKILLNEXA_REQUEST_TIMEOUT_SECS` — provider HTTP timeout (default: `120`)
//! - `SKILLNEXA_GEMINI_BASE_URL` — override the Gemini API base URL
//! - `SKILLNEXA_SESSION_TTL_SECS` — idle time before a session is evicted, `0` keeps sessions forever (default: `3600`)
//! - `PORT` — HTTP port (default: `8080`)

use thiserror::Error;

use crate::llms::base_llm::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::persona::Persona;

/// Environment key holding the provider credential. Used verbatim.
pub const CREDENTIAL_KEY: &str = "Gemini";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Sampling temperatures accepted by the provider.
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2.0;

/// An environment value that could not be parsed.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Service settings.
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub persona: Persona,
    pub resend_error_turns: bool,
    pub request_timeout_secs: u64,
    pub gemini_base_url: Option<String>,
    pub session_ttl_secs: u64,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            persona: Persona::default(),
            resend_error_turns: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            gemini_base_url: None,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            port: DEFAULT_PORT,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("persona", &self.persona)
            .field("resend_error_turns", &self.resend_error_turns)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("port", &self.port)
            .finish()
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a key to its raw value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            api_key: get(CREDENTIAL_KEY),
            model: get("SKILLNEXA_MODEL").unwrap_or(defaults.model),
            temperature: parse_temperature(get("SKILLNEXA_TEMPERATURE"), defaults.temperature)?,
            persona: parse_or("SKILLNEXA_PERSONA", get("SKILLNEXA_PERSONA"), defaults.persona)?,
            resend_error_turns: match get("SKILLNEXA_RESEND_ERRORS") {
                Some(v) => parse_bool("SKILLNEXA_RESEND_ERRORS", &v)?,
                None => defaults.resend_error_turns,
            },
            request_timeout_secs: parse_or(
                "SKILLNEXA_REQUEST_TIMEOUT_SECS",
                get("SKILLNEXA_REQUEST_TIMEOUT_SECS"),
                defaults.request_timeout_secs,
            )?,
            gemini_base_url: get("SKILLNEXA_GEMINI_BASE_URL"),
            session_ttl_secs: parse_or(
                "SKILLNEXA_SESSION_TTL_SECS",
                get("SKILLNEXA_SESSION_TTL_SECS"),
                defaults.session_ttl_secs,
            )?,
            port: parse_or("PORT", get("PORT"), defaults.port)?,
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_temperature(raw: Option<String>, default: f64) -> Result<f64, ConfigError> {
    const KEY: &str = "SKILLNEXA_TEMPERATURE";
    let value = parse_or(KEY, raw, default)?;
    if !TEMPERATURE_RANGE.contains(&value) {
        return Err(ConfigError::InvalidValue {
            key: KEY,
            value: value.to_string(),
            reason: format!(
                "expected a number between {} and {}",
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end()
            ),
        });
    }
    Ok(value)
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
