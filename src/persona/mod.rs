//! Persona variants.
//!
//! The product shipped with two skins of the same oracle: a warm "mentor"
//! that opens by asking the mentee's name, and a terse "hud" that asks for a
//! query straight away. Everything that differs between them (greeting,
//! error wording, transcript labels, busy text) is collected here so the
//! rest of the crate stays variant-agnostic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Prefix shared by every provider failure shown in the transcript.
pub const PROVIDER_ERROR_PREFIX: &str = "CRITICAL ERROR:";

/// Which skin of the oracle to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    /// Asks for the mentee's name before the session starts.
    #[default]
    Mentor,
    /// Invites an architectural query immediately.
    Hud,
}

impl Persona {
    /// Opening assistant message seeded when a module is initialized.
    pub fn greeting(&self, module_name: &str) -> String {
        match self {
            Self::Mentor => format!(
                "System Synchronized. I am the {} Principal Oracle. Before we begin our architectural session, could you tell me your name?",
                module_name
            ),
            Self::Hud => format!(
                "System Synchronized. I am the {} Principal Oracle. Present your architectural query.",
                module_name
            ),
        }
    }

    /// Reply recorded when no provider credential is configured.
    pub fn missing_credential_message(&self) -> &'static str {
        match self {
            Self::Mentor => "ERROR: Neural Link failed. API Key missing.",
            Self::Hud => "ERROR: API key not detected.",
        }
    }

    /// Reply recorded when the provider call fails.
    pub fn provider_error_message(&self, error: &dyn fmt::Display) -> String {
        match self {
            Self::Mentor => format!("{} Neural Link Severed. {}", PROVIDER_ERROR_PREFIX, error),
            Self::Hud => format!("{} Neural link severed. {}", PROVIDER_ERROR_PREFIX, error),
        }
    }

    pub fn assistant_label(&self) -> &'static str {
        match self {
            Self::Mentor => "Principal Oracle",
            Self::Hud => "Oracle",
        }
    }

    pub fn user_label(&self) -> &'static str {
        match self {
            Self::Mentor => "Lead Architect",
            Self::Hud => "Architect",
        }
    }

    /// Text shown next to the busy indicator while a turn is outstanding.
    pub fn busy_text(&self) -> &'static str {
        match self {
            Self::Mentor => "Oracle is processing...",
            Self::Hud => "Accessing Matrix...",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mentor => "mentor",
            Self::Hud => "hud",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mentor" => Ok(Self::Mentor),
            "hud" => Ok(Self::Hud),
            other => Err(format!("unknown persona '{}', expected 'mentor' or 'hud'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentor_greeting_asks_for_name() {
        let g = Persona::Mentor.greeting("Python Mastery");
        assert!(g.starts_with("System Synchronized. I am the Python Mastery Principal Oracle."));
        assert!(g.ends_with("could you tell me your name?"));
    }

    #[test]
    fn test_hud_greeting_invites_query() {
        assert_eq!(
            Persona::Hud.greeting("Generative AI"),
            "System Synchronized. I am the Generative AI Principal Oracle. Present your architectural query."
        );
    }

    #[test]
    fn test_provider_error_messages_share_prefix() {
        for persona in [Persona::Mentor, Persona::Hud] {
            let msg = persona.provider_error_message(&"request timed out");
            assert!(msg.starts_with(PROVIDER_ERROR_PREFIX));
            assert!(msg.ends_with("request timed out"));
        }
    }

    #[test]
    fn test_missing_credential_messages_are_not_provider_errors() {
        for persona in [Persona::Mentor, Persona::Hud] {
            assert!(!persona
                .missing_credential_message()
                .starts_with(PROVIDER_ERROR_PREFIX));
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("HUD".parse::<Persona>().unwrap(), Persona::Hud);
        assert_eq!(" mentor ".parse::<Persona>().unwrap(), Persona::Mentor);
        assert!("oracle".parse::<Persona>().is_err());
    }
}
