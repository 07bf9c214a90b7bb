//! View router: the navigation state machine.
//!
//! ```text
//! onboarding --start--> modules --initialize(X)--> chat
//!                       modules --filter(c)-----> modules
//!                       modules <-----back------- chat
//! ```
//!
//! `onboarding` is initial and there is no terminal state. Every accepted
//! action is followed by a full re-render of the current view (see
//! [`crate::server::views`]). Chat submissions are not routed here; they go
//! straight to [`crate::chat::ChatOrchestrator`].

use thiserror::Error;

use crate::catalog::{self, CategoryFilter};
use crate::persona::Persona;
use crate::session::{SessionState, View};

/// A navigation action triggered from one of the screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// "Get Started" on the landing screen.
    Start,
    /// Sidebar category button on the module grid.
    SelectCategory(CategoryFilter),
    /// "Initialize <id>" on a module card.
    InitializeModule(String),
    /// "Back to Matrix" on the chat screen.
    Back,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::SelectCategory(_) => "select-category",
            Self::InitializeModule(_) => "initialize-module",
            Self::Back => "back",
        }
    }
}

/// Rejected navigation. The session state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("Action '{action}' is not available from the {view} view")]
    InvalidTransition { view: View, action: &'static str },

    #[error("Module not found: {0}")]
    UnknownModule(String),
}

/// Applies navigation actions to session state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewRouter {
    persona: Persona,
}

impl ViewRouter {
    pub fn new(persona: Persona) -> Self {
        Self { persona }
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    /// Apply `action` to `state`, returning the view to render next.
    pub fn dispatch(&self, state: &mut SessionState, action: Action) -> Result<View, RouterError> {
        let from = state.view();
        match (from, &action) {
            (View::Onboarding, Action::Start) => state.enter_modules(),
            (View::Modules, Action::SelectCategory(filter)) => state.set_category_filter(*filter),
            (View::Modules, Action::InitializeModule(id)) => {
                let module =
                    catalog::find(id).ok_or_else(|| RouterError::UnknownModule(id.clone()))?;
                state.enter_chat(module, self.persona.greeting(module.name));
            }
            (View::Chat, Action::Back) => state.leave_chat(),
            _ => {
                return Err(RouterError::InvalidTransition {
                    view: from,
                    action: action.name(),
                })
            }
        }

        tracing::debug!(from = %from, to = %state.view(), action = action.name(), "view transition");
        Ok(state.view())
    }
}
