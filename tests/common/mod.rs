//! Common test utilities for the Web API integration tests.
//!
//! Builds the real router over an in-memory database, records outgoing mail
//! instead of sending it, and simulates the analytics service with a small
//! axum app bound to a random local port.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use axum_test::TestServer;
use serde_json::{json, Value};

use storelens::mail::{Email, Mailer, MailerError};
use storelens::user::UserService;
use storelens::web::{create_app, AppState};
use storelens::{Config, Database};

pub const PASSWORD: &str = "password123";

// ============================================================================
// Mail
// ============================================================================

/// Mailer that keeps every message in memory.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }

    /// Wait for the background delivery of the `count`-th message.
    pub async fn wait_for(&self, count: usize) -> Vec<Email> {
        for _ in 0..100 {
            let sent = self.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {count} sent mails, got {}", self.sent().len());
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// The six-digit code in a verification mail.
pub fn code_in(email: &Email) -> u32 {
    email
        .text_body()
        .split(|c: char| !c.is_ascii_digit())
        .find(|part| part.len() == 6)
        .and_then(|part| part.parse().ok())
        .expect("no verification code in mail")
}

// ============================================================================
// Analytics mock
// ============================================================================

/// A request received by the analytics mock.
#[derive(Debug, Clone)]
pub struct UpstreamCall {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub body: Value,
}

pub type CallLog = Arc<Mutex<Vec<UpstreamCall>>>;

async fn analytics_mock(
    State(log): State<CallLog>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let path = uri.path().to_string();
    log.lock().unwrap().push(UpstreamCall {
        method,
        path: path.clone(),
        query: uri.query().map(str::to_string),
        body: body.clone(),
    });

    match path.as_str() {
        "/api/chat" => Json(json!({
            "session_id": "session-1",
            "bot_message": "안녕하세요",
            "message_type": "text"
        }))
        .into_response(),
        "/api/store/register-with-business" => (
            StatusCode::CREATED,
            Json(json!({ "store_id": 12, "user_id": body["user_id"] })),
        )
            .into_response(),
        "/api/store/list" => Json(json!({
            "stores": [
                { "store_id": 11, "store_name": "cafe" },
                { "store_id": 12, "store_name": "bakery" }
            ]
        }))
        .into_response(),
        "/api/eda/results/broken" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "analysis crashed" })),
        )
            .into_response(),
        _ => Json(json!({ "path": path, "body": body })).into_response(),
    }
}

/// Start the analytics mock; returns its base URL and the call log.
pub async fn spawn_analytics_mock() -> (String, CallLog) {
    let log: CallLog = Arc::default();
    let app = Router::new()
        .fallback(analytics_mock)
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), log)
}

// ============================================================================
// Application
// ============================================================================

/// Create a test configuration.
pub fn create_test_config(analytics_url: &str) -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.server.login_rate_limit = 100;
    config.server.api_rate_limit = 1000;
    config.jwt.secret = "test-secret-key-for-testing-only".to_string();
    config.id_cipher.secret = "test-id-secret".to_string();
    config.analytics.base_url = analytics_url.to_string();
    config.analytics.timeout_secs = 5;
    config
}

/// The router under test plus handles to its collaborators.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub mailer: Arc<RecordingMailer>,
    pub upstream: CallLog,
}

/// Create a test app with default limits and a running analytics mock.
pub async fn create_test_app() -> TestApp {
    let (analytics_url, upstream) = spawn_analytics_mock().await;
    create_test_app_with(create_test_config(&analytics_url), upstream).await
}

pub async fn create_test_app_with(config: Config, upstream: CallLog) -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let mailer = Arc::new(RecordingMailer::default());
    let state = Arc::new(
        AppState::new(&config, db, mailer.clone()).expect("Failed to create app state"),
    );

    let router = create_app(state.clone(), &config.server);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        mailer,
        upstream,
    }
}

impl TestApp {
    /// Sign up through the API.
    pub async fn sign_up(&self, mail: &str, name: &str) {
        self.server
            .post("/api/user")
            .json(&json!({ "mail": mail, "name": name, "password": PASSWORD }))
            .await
            .assert_status_ok();
    }

    /// Log in through the API and return the response body.
    pub async fn login(&self, mail: &str, password: &str) -> Value {
        let response = self
            .server
            .post("/api/user/login")
            .json(&json!({ "mail": mail, "password": password }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()
    }

    /// Sign up and log in; returns the access token.
    pub async fn member_token(&self, mail: &str, name: &str) -> String {
        self.sign_up(mail, name).await;
        self.login(mail, PASSWORD).await["accessToken"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Create an administrator and return its access token.
    pub async fn admin_token(&self) -> String {
        UserService::new(&self.state.db)
            .bootstrap_admin("admin@example.com", "admin", PASSWORD)
            .await
            .unwrap();
        self.login("admin@example.com", PASSWORD).await["accessToken"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub fn encrypt(&self, id: i64) -> String {
        self.state.ids.encrypt(id).unwrap()
    }

    pub fn upstream_calls(&self) -> Vec<UpstreamCall> {
        self.upstream.lock().unwrap().clone()
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
