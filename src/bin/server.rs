//! SkillNexa HTTP server binary.
//!
//! Loads `.env` if present, reads [`Settings`] from the environment and
//! serves the mentoring UI.
//!
//! # Environment Variables
//!
//! - `Gemini` — provider API key (chat turns report it missing otherwise)
//! - `PORT` — HTTP port (default: 8080)
//! - `RUST_LOG` — Tracing filter (default: "info,skillnexa=debug")
//!
//! See [`skillnexa::config`] for the remaining `SKILLNEXA_*` settings.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use std::time::Duration;

use anyhow::Context;
use skillnexa::config::Settings;
use skillnexa::server::{app_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,skillnexa=debug".into()),
        )
        .init();

    let settings = Settings::from_env()?;
    tracing::debug!(?settings, "settings loaded");

    let state = AppState::from_settings(&settings).context("failed to compile templates")?;
    if settings.session_ttl_secs > 0 {
        state
            .sessions
            .spawn_sweeper(Duration::from_secs(settings.session_ttl_secs));
    }
    let app = app_router(state);

    let bind_addr = format!("0.0.0.0:{}", settings.port);
    tracing::info!(
        persona = %settings.persona,
        model = %settings.model,
        "skillnexa server starting on {}",
        bind_addr
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
