//! Axum route handlers for the SkillNexa HTTP server.
//!
//! # Routes
//!
//! - `GET  /health`                      — Returns `{"status": "ok", "version": ...}`
//! - `GET  /`                            — Create a session, redirect to its page
//! - `GET  /s/:id`                       — Render the session's current view
//! - `POST /s/:id/start`                 — onboarding → modules
//! - `POST /s/:id/filter`                — Set the category filter (`category` form field)
//! - `POST /s/:id/modules/:module_id`    — Initialize a module, enter chat
//! - `POST /s/:id/back`                  — chat → modules
//! - `POST /s/:id/messages`              — Run one chat turn (`content` form field)
//! - `GET  /api/modules`                 — Catalog JSON, optional `?category=`
//! - `GET  /api/sessions/:id`            — Session state JSON
//!
//! Every POST answers with a 303 back to `/s/:id`, so the browser always
//! lands on a fresh render of the current view.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::catalog::{self, CategoryFilter, UnknownCategory};
use crate::chat::{ChatError, ChatOrchestrator, MentorClient, SubmitOutcome};
use crate::config::Settings;
use crate::router::{Action, RouterError, ViewRouter};
use crate::server::views::Views;
use crate::session::{SessionHandle, SessionStore};

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Live sessions.
    pub sessions: Arc<SessionStore>,
    /// Navigation state machine.
    pub router: ViewRouter,
    /// Chat turn runner.
    pub orchestrator: Arc<ChatOrchestrator>,
    /// Page renderer.
    pub views: Arc<Views>,
}

impl AppState {
    /// Build state around an existing mentor client.
    pub fn new(client: MentorClient, resend_error_turns: bool) -> Result<Self, tera::Error> {
        let persona = client.persona();
        Ok(Self {
            sessions: Arc::new(SessionStore::new()),
            router: ViewRouter::new(persona),
            orchestrator: Arc::new(
                ChatOrchestrator::new(client).with_resend_error_turns(resend_error_turns),
            ),
            views: Arc::new(Views::new(persona)?),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, tera::Error> {
        Self::new(
            MentorClient::from_settings(settings),
            settings.resend_error_turns,
        )
    }

    fn session(&self, id: &Uuid) -> Result<SessionHandle, ServerError> {
        self.sessions
            .get(id)
            .ok_or(ServerError::SessionNotFound(*id))
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Request failures, mapped onto HTTP status codes.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error(transparent)]
    BadCategory(#[from] UnknownCategory),

    #[error("Render failed: {0}")]
    Render(#[from] tera::Error),

    #[error("Chat turn aborted: {0}")]
    TurnAborted(#[from] tokio::task::JoinError),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::Router(RouterError::UnknownModule(_)) => StatusCode::NOT_FOUND,
            Self::Router(RouterError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            Self::Chat(_) => StatusCode::CONFLICT,
            Self::BadCategory(_) => StatusCode::BAD_REQUEST,
            Self::Render(_) | Self::TurnAborted(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/", get(new_session_handler))
        .route("/s/:id", get(page_handler))
        .route("/s/:id/start", post(start_handler))
        .route("/s/:id/filter", post(filter_handler))
        .route("/s/:id/modules/:module_id", post(initialize_module_handler))
        .route("/s/:id/back", post(back_handler))
        .route("/s/:id/messages", post(submit_message_handler))
        .route("/api/modules", get(list_modules_handler))
        .route("/api/sessions/:id", get(session_state_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn session_page(id: &Uuid) -> Redirect {
    Redirect::to(&format!("/s/{}", id))
}

/// GET /health — liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "skillnexa",
    }))
}

/// GET / — start a new session.
async fn new_session_handler(State(state): State<AppState>) -> Redirect {
    let id = state.sessions.create();
    session_page(&id)
}

/// GET /s/:id — render the current view.
///
/// Unknown sessions (e.g. after a restart) are sent back to `/` for a fresh one.
async fn page_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServerError> {
    let Some(handle) = state.sessions.get(&id) else {
        return Ok(Redirect::to("/").into_response());
    };
    let session = handle.lock().await;
    let html = state.views.render(id, &session)?;
    Ok(Html(html).into_response())
}

async fn dispatch(state: &AppState, id: Uuid, action: Action) -> Result<Redirect, ServerError> {
    let handle = state.session(&id)?;
    let mut session = handle.lock().await;
    state.router.dispatch(&mut session, action)?;
    Ok(session_page(&id))
}

/// POST /s/:id/start
async fn start_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, ServerError> {
    dispatch(&state, id, Action::Start).await
}

#[derive(Debug, Deserialize)]
struct FilterForm {
    category: String,
}

/// POST /s/:id/filter
async fn filter_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<FilterForm>,
) -> Result<Redirect, ServerError> {
    let filter: CategoryFilter = form.category.parse()?;
    dispatch(&state, id, Action::SelectCategory(filter)).await
}

/// POST /s/:id/modules/:module_id
async fn initialize_module_handler(
    State(state): State<AppState>,
    Path((id, module_id)): Path<(Uuid, String)>,
) -> Result<Redirect, ServerError> {
    dispatch(&state, id, Action::InitializeModule(module_id)).await
}

/// POST /s/:id/back
async fn back_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, ServerError> {
    dispatch(&state, id, Action::Back).await
}

#[derive(Debug, Deserialize)]
struct MessageForm {
    #[serde(default)]
    content: String,
}

/// POST /s/:id/messages — run one chat turn.
///
/// The turn runs on its own task holding the session lock, so it completes
/// and records the reply even if the browser disconnects mid-call.
async fn submit_message_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<MessageForm>,
) -> Result<Redirect, ServerError> {
    let handle = state.session(&id)?;
    let orchestrator = Arc::clone(&state.orchestrator);

    let turn = tokio::spawn(async move {
        let mut session = handle.lock_owned().await;
        orchestrator.on_user_submit(&mut session, &form.content).await
    });

    match turn.await?? {
        SubmitOutcome::Ignored => tracing::debug!(session = %id, "blank submission ignored"),
        SubmitOutcome::Replied(kind) => {
            tracing::info!(session = %id, kind = ?kind, "chat turn completed")
        }
    }
    Ok(session_page(&id))
}

#[derive(Debug, Deserialize)]
struct ModulesQuery {
    category: Option<String>,
}

/// GET /api/modules — catalog, optionally filtered by category.
async fn list_modules_handler(
    Query(query): Query<ModulesQuery>,
) -> Result<Json<Value>, ServerError> {
    let filter = match query.category.as_deref() {
        Some(raw) => raw.parse()?,
        None => CategoryFilter::All,
    };
    let modules: Vec<Value> = catalog::filter(filter)
        .into_iter()
        .map(|m| {
            serde_json::json!({
                "id": m.id,
                "name": m.name,
                "description": m.description,
                "icon": m.icon,
                "color": m.color,
                "category": m.category,
                "version": m.version,
                "node_id": m.node_id(),
            })
        })
        .collect();

    Ok(Json(serde_json::json!({ "category": filter, "modules": modules })))
}

/// GET /api/sessions/:id — current session state.
async fn session_state_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ServerError> {
    let handle = state.session(&id)?;
    let session = handle.lock().await;
    Ok(Json(serde_json::json!({
        "id": id,
        "awaiting_reply": session.awaiting_reply(),
        "state": &*session,
    })))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::testing::ScriptedLLM;
    use crate::llms::LlmError;
    use crate::persona::Persona;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn app_with(client: MentorClient) -> (AppState, Router) {
        let state = AppState::new(client, false).unwrap();
        let app = app_router(state.clone());
        (state, app)
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn location(response: &Response) -> String {
        response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string()
    }

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    async fn new_session(app: &Router) -> String {
        let response = send(app, get("/")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        location(&response)
    }

    async fn session_json(app: &Router, page: &str) -> Value {
        let id = page.trim_start_matches("/s/");
        body_json(send(app, get(&format!("/api/sessions/{}", id))).await).await
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (_, app) = app_with(MentorClient::unconfigured(Persona::Mentor));
        let response = send(&app, get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::VERSION);
        assert_eq!(json["service"], "skillnexa");
    }

    #[tokio::test]
    async fn test_new_session_starts_on_onboarding() {
        let (state, app) = app_with(MentorClient::unconfigured(Persona::Mentor));
        let page = new_session(&app).await;
        assert!(page.starts_with("/s/"));
        assert_eq!(state.sessions.len(), 1);

        let html = body_text(send(&app, get(&page)).await).await;
        assert!(html.contains("Get Started"));

        let json = session_json(&app, &page).await;
        assert_eq!(json["state"]["view"], "onboarding");
    }

    #[tokio::test]
    async fn test_full_navigation_flow() {
        let llm = Arc::new(ScriptedLLM::replying(["Use a comprehension: [x*x for x in xs]"]));
        let (_, app) = app_with(MentorClient::new(llm.clone(), Persona::Mentor));
        let page = new_session(&app).await;

        let response = send(&app, post_form(&format!("{}/start", page), "")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), page);
        let json = session_json(&app, &page).await;
        assert_eq!(json["state"]["view"], "modules");
        assert_eq!(json["state"]["category_filter"], "All");

        let response = send(&app, post_form(&format!("{}/filter", page), "category=AI")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let html = body_text(send(&app, get(&page)).await).await;
        assert!(html.contains("Initialize gen-ai"));
        assert!(!html.contains("Initialize python"));

        let response = send(&app, post_form(&format!("{}/modules/python", page), "")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let json = session_json(&app, &page).await;
        assert_eq!(json["state"]["view"], "chat");
        assert_eq!(json["state"]["active_module"]["id"], "python");
        assert_eq!(json["state"]["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["state"]["messages"][0]["role"], "assistant");

        let response = send(
            &app,
            post_form(
                &format!("{}/messages", page),
                "content=What+is+a+list+comprehension%3F",
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let json = session_json(&app, &page).await;
        let messages = json["state"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "What is a list comprehension?");
        assert_eq!(messages[2]["content"], "Use a comprehension: [x*x for x in xs]");
        assert_eq!(json["awaiting_reply"], false);

        // Re-rendering does not trigger another provider call.
        for _ in 0..3 {
            let response = send(&app, get(&page)).await;
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(llm.calls().len(), 1);

        let response = send(&app, post_form(&format!("{}/back", page), "")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let json = session_json(&app, &page).await;
        assert_eq!(json["state"]["view"], "modules");
        assert!(json["state"]["active_module"].is_null());
        assert!(json["state"]["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_turn() {
        let (_, app) = app_with(MentorClient::unconfigured(Persona::Mentor));
        let page = new_session(&app).await;
        send(&app, post_form(&format!("{}/start", page), "")).await;
        send(&app, post_form(&format!("{}/modules/sql", page), "")).await;
        send(&app, post_form(&format!("{}/messages", page), "content=hello")).await;

        let json = session_json(&app, &page).await;
        let messages = json["state"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2]["content"], "ERROR: Neural Link failed. API Key missing.");
        assert_eq!(messages[2]["kind"], "error");
    }

    #[tokio::test]
    async fn test_provider_failure_turn_renders_error_entry() {
        let llm = Arc::new(ScriptedLLM::new(vec![Err(LlmError::Other(
            "deadline exceeded".to_string(),
        ))]));
        let (_, app) = app_with(MentorClient::new(llm, Persona::Hud));
        let page = new_session(&app).await;
        send(&app, post_form(&format!("{}/start", page), "")).await;
        send(&app, post_form(&format!("{}/modules/ml", page), "")).await;
        send(&app, post_form(&format!("{}/messages", page), "content=hi")).await;

        let html = body_text(send(&app, get(&page)).await).await;
        assert!(html.contains("CRITICAL ERROR: Neural link severed. deadline exceeded"));
        assert!(html.contains("entry assistant error"));
    }

    #[tokio::test]
    async fn test_blank_message_is_ignored() {
        let llm = Arc::new(ScriptedLLM::default());
        let (_, app) = app_with(MentorClient::new(llm.clone(), Persona::Mentor));
        let page = new_session(&app).await;
        send(&app, post_form(&format!("{}/start", page), "")).await;
        send(&app, post_form(&format!("{}/modules/python", page), "")).await;

        let response = send(&app, post_form(&format!("{}/messages", page), "content=++++")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let json = session_json(&app, &page).await;
        assert_eq!(json["state"]["messages"].as_array().unwrap().len(), 1);
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_transition_is_conflict() {
        let (_, app) = app_with(MentorClient::unconfigured(Persona::Mentor));
        let page = new_session(&app).await;

        let response = send(&app, post_form(&format!("{}/back", page), "")).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = send(&app, post_form(&format!("{}/messages", page), "content=hi")).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("onboarding"));
    }

    #[tokio::test]
    async fn test_unknown_module_and_category() {
        let (_, app) = app_with(MentorClient::unconfigured(Persona::Mentor));
        let page = new_session(&app).await;
        send(&app, post_form(&format!("{}/start", page), "")).await;

        let response = send(&app, post_form(&format!("{}/modules/cobol", page), "")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, post_form(&format!("{}/filter", page), "category=Web")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let (_, app) = app_with(MentorClient::unconfigured(Persona::Mentor));
        let missing = Uuid::new_v4();

        let response = send(&app, get(&format!("/s/{}", missing))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let response = send(&app, post_form(&format!("/s/{}/start", missing), "")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, get(&format!("/api/sessions/{}", missing))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_evicted_session_restarts_from_landing_page() {
        let (state, app) = app_with(MentorClient::unconfigured(Persona::Mentor));
        for _ in 0..3 {
            new_session(&app).await;
        }
        let page = new_session(&app).await;
        assert_eq!(state.sessions.len(), 4);

        assert_eq!(state.sessions.evict_idle(std::time::Duration::ZERO), 4);
        assert!(state.sessions.is_empty());

        let response = send(&app, get(&page)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_list_modules_api() {
        let (_, app) = app_with(MentorClient::unconfigured(Persona::Mentor));

        let json = body_json(send(&app, get("/api/modules")).await).await;
        assert_eq!(json["category"], "All");
        assert_eq!(json["modules"].as_array().unwrap().len(), 6);
        assert_eq!(json["modules"][0]["id"], "python");
        assert_eq!(json["modules"][0]["node_id"], "PYTHON_4.2.0");

        let json = body_json(send(&app, get("/api/modules?category=Data")).await).await;
        let ids: Vec<_> = json["modules"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["sql"]);

        let response = send(&app, get("/api/modules?category=Mobile")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
