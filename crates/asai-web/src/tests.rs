use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use asai_agent::TurnProcessor;
use asai_core::session::SessionManager;
use asai_core::types::{Conversation, HistoryEntry, LlmResponse, Turn};
use asai_providers::{LlmProvider, LlmRequestConfig, PlaceholderSynthesizer, ProviderError};

use super::{build_router, AppState, SESSION_COOKIE};

const SESSION: &str = "6f1c2d3e-4a5b-4c6d-8e7f-901a2b3c4d5e";
const WELCOME: &str = "¡Hola! Soy Asai-Gen.";

struct StubProvider {
    reply: Option<&'static str>,
    calls: AtomicUsize,
}

#[async_trait]
impl LlmProvider for StubProvider {
    async fn chat(
        &self,
        _history: &[HistoryEntry],
        _message: &str,
        _config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Some(text) => Ok(LlmResponse {
                content: text.to_string(),
                ..Default::default()
            }),
            None => Err(ProviderError::EmptyResponse {
                provider: "Stub",
                reason: "upstream unavailable".into(),
            }),
        }
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    fn display_name(&self) -> &str {
        "Stub"
    }
}

struct TestApp {
    router: Router,
    sessions: Arc<SessionManager>,
    provider: Arc<StubProvider>,
}

fn test_app(reply: Option<&'static str>) -> TestApp {
    test_app_with(reply, SessionManager::in_memory())
}

fn test_app_with(reply: Option<&'static str>, sessions: SessionManager) -> TestApp {
    let provider = Arc::new(StubProvider {
        reply,
        calls: AtomicUsize::new(0),
    });
    let sessions = Arc::new(sessions);
    let processor = TurnProcessor::new(
        provider.clone(),
        Arc::new(PlaceholderSynthesizer::default()),
    );
    let state = AppState::new(sessions.clone(), Arc::new(processor), WELCOME);

    TestApp {
        router: build_router(state),
        sessions,
        provider,
    }
}

fn send_request(cookie: Option<&str>, user_input: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/send")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(id) = cookie {
        builder = builder.header(header::COOKIE, format!("{SESSION_COOKIE}={id}"));
    }
    let body = format!("user_input={}", form_encode(user_input));
    builder.body(Body::from(body)).expect("request should build")
}

fn form_encode(text: &str) -> String {
    let mut out = String::new();
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, String) {
    let response: Response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should succeed");
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should read");
    (status, cookie, String::from_utf8_lossy(&body).into_owned())
}

#[tokio::test]
async fn healthz_returns_ok() {
    let app = test_app(Some("hi"));
    let request = Request::builder()
        .uri("/healthz")
        .body(Body::empty())
        .expect("request should build");

    let (status, _, body) = call(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    let value: serde_json::Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(value, serde_json::json!({"ok": true}));
}

#[tokio::test]
async fn home_sets_cookie_and_shows_welcome() {
    let app = test_app(Some("hi"));
    let request = Request::builder()
        .uri("/")
        .body(Body::empty())
        .expect("request should build");

    let (status, cookie, body) = call(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    let cookie = cookie.expect("cookie set");
    assert!(cookie.starts_with(SESSION_COOKIE));
    assert!(cookie.contains("Max-Age=86400"));
    assert!(body.contains(WELCOME));
    assert!(body.contains("<div id=\"chat-history\"></div>"));
}

#[tokio::test]
async fn home_resets_existing_conversation() {
    let app = test_app(Some("hi"));
    app.sessions.save(
        SESSION,
        Conversation::from(vec![Turn::user("old"), Turn::model("older")]),
    );

    let request = Request::builder()
        .uri("/")
        .header(header::COOKIE, format!("{SESSION_COOKIE}={SESSION}"))
        .body(Body::empty())
        .expect("request should build");

    let (status, _, body) = call(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("<p>old</p>"));
    assert!(!body.contains("<p>older</p>"));
    assert!(app.sessions.conversation(SESSION).is_empty());
}

#[tokio::test]
async fn send_appends_turns_newest_first() {
    let app = test_app(Some("Hola, ¿en qué puedo ayudarte?"));

    let (status, cookie, body) = call(&app.router, send_request(Some(SESSION), "hola")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie.is_none());

    let ai = body.find("en qué puedo ayudarte").expect("reply rendered");
    let user = body.find("<p>hola</p>").expect("user turn rendered");
    assert!(ai < user);

    let stored = app.sessions.conversation(SESSION);
    assert_eq!(stored.len(), 2);
    assert_eq!(stored.turns()[0], Turn::user("hola"));
}

#[tokio::test]
async fn send_keyword_adds_render_turn() {
    let app = test_app(Some("Propuesta: salón nórdico"));

    let (status, _, body) = call(&app.router, send_request(Some(SESSION), "idea?")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("class=\"message ai render\""));
    assert_eq!(app.sessions.conversation(SESSION).len(), 3);
}

#[tokio::test]
async fn send_escapes_user_markup() {
    let app = test_app(Some("ok"));

    let (_, _, body) = call(
        &app.router,
        send_request(Some(SESSION), "<script>alert(1)</script>"),
    )
    .await;
    assert!(body.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!body.contains("<script>alert(1)</script>"));
}

#[tokio::test]
async fn send_whitespace_leaves_history_unchanged() {
    let app = test_app(Some("ok"));
    app.sessions
        .save(SESSION, Conversation::from(vec![Turn::model("previous")]));

    let (status, _, body) = call(&app.router, send_request(Some(SESSION), "   ")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("previous"));
    assert_eq!(app.provider.calls.load(Ordering::SeqCst), 0);
    assert_eq!(app.sessions.conversation(SESSION).len(), 1);
}

#[tokio::test]
async fn send_provider_failure_returns_bad_gateway() {
    let app = test_app(None);
    let before = Conversation::from(vec![Turn::user("a"), Turn::model("b")]);
    app.sessions.save(SESSION, before.clone());

    let (status, _, body) = call(&app.router, send_request(Some(SESSION), "c")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("upstream unavailable"));
    assert_eq!(app.sessions.conversation(SESSION), before);
}

#[tokio::test]
async fn send_without_cookie_starts_session() {
    let app = test_app(Some("ok"));

    let (status, cookie, _) = call(&app.router, send_request(None, "hola")).await;
    assert_eq!(status, StatusCode::OK);

    let cookie = cookie.expect("cookie set");
    let id = cookie
        .strip_prefix(&format!("{SESSION_COOKIE}="))
        .and_then(|rest| rest.split(';').next())
        .expect("cookie value");
    assert_eq!(app.sessions.conversation(id).len(), 2);
}

#[tokio::test]
async fn anonymous_traffic_does_not_store_sessions() {
    let app = test_app(Some("ok"));

    for _ in 0..20 {
        let request = Request::builder()
            .uri("/")
            .body(Body::empty())
            .expect("request should build");
        let (status, _, _) = call(&app.router, request).await;
        assert_eq!(status, StatusCode::OK);
    }
    for _ in 0..20 {
        let id = uuid::Uuid::new_v4().to_string();
        let (status, _, _) = call(&app.router, send_request(Some(&id), "  ")).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert!(app.sessions.is_empty());
    assert_eq!(app.provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn session_cap_bounds_stored_conversations() {
    let app = test_app_with(Some("ok"), SessionManager::in_memory().with_limits(3, 0));

    for _ in 0..10 {
        let (status, _, _) = call(&app.router, send_request(None, "hola")).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(app.sessions.len(), 3);
}
