//! Asai web front-end.
//!
//! Routes:
//! - `GET /`: start a fresh conversation and show the welcome message
//! - `POST /send`: run one chat turn (form field `user_input`)
//! - `GET /healthz`: liveness probe
//!
//! Each browser is identified by the `asai_session` cookie; conversations
//! live server-side in the [`SessionManager`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use asai_agent::TurnProcessor;
use asai_core::session::SessionManager;

mod chat;
mod cookies;
mod errors;
mod health;
mod page;

#[cfg(test)]
mod tests;

pub use cookies::SESSION_COOKIE;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub processor: Arc<TurnProcessor>,
    /// Shown above the conversation on every page.
    pub welcome_message: Arc<str>,
}

impl AppState {
    pub fn new(
        sessions: Arc<SessionManager>,
        processor: Arc<TurnProcessor>,
        welcome_message: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            sessions,
            processor,
            welcome_message: welcome_message.into(),
        }
    }
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(chat::home))
        .route("/send", post(chat::send_message))
        .route("/healthz", get(health::healthz))
        .with_state(app_state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, app_state: AppState) -> std::io::Result<()> {
    let app = build_router(app_state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("asai web listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}
