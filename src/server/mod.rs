//! HTTP surface for SkillNexa.
//!
//! Serves the three screens as server-rendered pages plus a small JSON API
//! over the catalog and session state.
//!
//! # Endpoints
//!
//! - `GET  /health`           — Liveness probe
//! - `GET  /`                 — New session
//! - `GET  /s/:id`            — Current screen for a session
//! - `POST /s/:id/...`        — Navigation actions and chat turns
//! - `GET  /api/modules`      — Catalog JSON
//! - `GET  /api/sessions/:id` — Session state JSON

pub mod routes;
pub mod views;

pub use routes::{app_router, AppState, ServerError};
pub use views::Views;
