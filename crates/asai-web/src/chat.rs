use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use tracing::{debug, error, info};

use asai_agent::render_conversation;
use asai_core::types::Conversation;
use asai_core::utils::truncate_string;

use super::cookies::{session_id_or_new, set_cookie_header};
use super::errors::bad_gateway_response;
use super::page::chat_page;
use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct SendForm {
    #[serde(default)]
    user_input: String,
}

fn page_response(
    state: &AppState,
    conversation: &Conversation,
    new_session: Option<&str>,
) -> Response {
    let html = chat_page(&state.welcome_message, &render_conversation(conversation));
    let mut response = Html(html).into_response();
    attach_cookie(state, &mut response, new_session);
    response
}

fn attach_cookie(state: &AppState, response: &mut Response, new_session: Option<&str>) {
    let max_age = state.sessions.idle_ttl_secs();
    if let Some(value) = new_session.and_then(|id| set_cookie_header(id, max_age)) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
}

/// `GET /`: reset the browser's conversation and show the welcome page.
pub(super) async fn home(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (session_id, is_new) = session_id_or_new(&headers);
    state.sessions.clear(&session_id);
    debug!(session = %session_id, is_new, "conversation reset");

    // Always refresh the cookie so the reset session is the one in use.
    page_response(&state, &Conversation::new(), Some(&session_id))
}

/// `POST /send`: run one turn and show the updated conversation.
pub(super) async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SendForm>,
) -> Response {
    let (session_id, is_new) = session_id_or_new(&headers);
    let new_session = is_new.then_some(session_id.as_str());
    let history = state.sessions.conversation(&session_id);

    if form.user_input.trim().is_empty() {
        debug!(session = %session_id, "empty input ignored");
        return page_response(&state, &history, new_session);
    }

    let prior_turns = history.len();
    debug!(
        session = %session_id,
        prior_turns,
        input = %truncate_string(&form.user_input, 80),
        "turn received"
    );
    match state.processor.process(&form.user_input, history).await {
        Ok(conversation) => {
            info!(
                session = %session_id,
                added = conversation.len() - prior_turns,
                total = conversation.len(),
                "turn processed"
            );
            let response = page_response(&state, &conversation, new_session);
            state.sessions.save(&session_id, conversation);
            response
        }
        Err(err) => {
            error!(session = %session_id, error = %err, "model call failed");
            let mut response = bad_gateway_response(&err);
            attach_cookie(&state, &mut response, new_session);
            response
        }
    }
}
