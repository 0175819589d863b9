use axum::http::{header, HeaderMap, HeaderValue};
use uuid::Uuid;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "asai_session";

/// The session id sent by the browser, if it is a well-formed UUID.
pub(crate) fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
        .map(|id| id.to_string())
}

/// Reuse the browser's session id or mint a new one.
///
/// The flag is `true` when the id is new and must be sent back.
pub(crate) fn session_id_or_new(headers: &HeaderMap) -> (String, bool) {
    match session_id(headers) {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    }
}

/// `Set-Cookie` value for `session_id`; `max_age_secs == 0` makes it a
/// browser-session cookie.
pub(crate) fn set_cookie_header(session_id: &str, max_age_secs: u64) -> Option<HeaderValue> {
    let mut value = format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax");
    if max_age_secs > 0 {
        value.push_str(&format!("; Max-Age={max_age_secs}"));
    }
    HeaderValue::from_str(&value).ok()
}
