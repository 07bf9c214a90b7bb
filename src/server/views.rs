//! Screen rendering.
//!
//! Each [`View`] maps to one tera template. Templates are compiled into the
//! binary and rendered with HTML auto-escaping, so transcript text (which may
//! contain markup from the model or the user) is shown literally.

use serde::Serialize;
use tera::{Context, Tera};
use uuid::Uuid;

use crate::catalog::{self, CategoryFilter, ModuleRecord};
use crate::persona::Persona;
use crate::session::{Role, SessionState, View};

const TEMPLATES: [(&str, &str); 4] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("onboarding.html", include_str!("../../templates/onboarding.html")),
    ("modules.html", include_str!("../../templates/modules.html")),
    ("chat.html", include_str!("../../templates/chat.html")),
];

#[derive(Serialize)]
struct FilterButton {
    name: &'static str,
    active: bool,
}

#[derive(Serialize)]
struct ModuleCard {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    color: &'static str,
    category: &'static str,
    version: &'static str,
    node_id: String,
}

impl From<&ModuleRecord> for ModuleCard {
    fn from(m: &ModuleRecord) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            icon: m.icon,
            color: m.color,
            category: m.category.as_str(),
            version: m.version,
            node_id: m.node_id(),
        }
    }
}

#[derive(Serialize)]
struct TranscriptEntry<'a> {
    role: &'static str,
    label: &'static str,
    content: &'a str,
    timestamp: &'a str,
    is_error: bool,
}

/// Renders the screen for a session's current view.
#[derive(Debug)]
pub struct Views {
    tera: Tera,
    persona: Persona,
}

impl Views {
    pub fn new(persona: Persona) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self { tera, persona })
    }

    /// Template used for `view`.
    pub fn template_for(view: View) -> &'static str {
        match view {
            View::Onboarding => "onboarding.html",
            View::Modules => "modules.html",
            View::Chat => "chat.html",
        }
    }

    /// Render the full page for `state`. Pure: never mutates the session.
    pub fn render(&self, session_id: Uuid, state: &SessionState) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("session_id", &session_id.to_string());

        match state.view() {
            View::Onboarding => {}
            View::Modules => {
                let active = state.category_filter();
                let filters: Vec<FilterButton> = CategoryFilter::ALL
                    .iter()
                    .map(|f| FilterButton {
                        name: f.as_str(),
                        active: *f == active,
                    })
                    .collect();
                let modules: Vec<ModuleCard> = catalog::filter(active)
                    .into_iter()
                    .map(ModuleCard::from)
                    .collect();
                context.insert("filters", &filters);
                context.insert("modules", &modules);
            }
            View::Chat => {
                let module = state.active_module().ok_or_else(|| {
                    tera::Error::msg("chat view rendered without an active module")
                })?;
                let messages: Vec<TranscriptEntry<'_>> = state
                    .messages()
                    .iter()
                    .map(|m| TranscriptEntry {
                        role: match m.role {
                            Role::User => "user",
                            Role::Assistant => "assistant",
                        },
                        label: match m.role {
                            Role::User => self.persona.user_label(),
                            Role::Assistant => self.persona.assistant_label(),
                        },
                        content: &m.content,
                        timestamp: &m.timestamp,
                        is_error: m.is_error(),
                    })
                    .collect();
                context.insert("module", &ModuleCard::from(module));
                context.insert("messages", &messages);
                context.insert("user_label", self.persona.user_label());
                context.insert("busy_text", self.persona.busy_text());
            }
        }

        self.tera.render(Self::template_for(state.view()), &context)
    }
}
