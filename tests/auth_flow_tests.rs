//! End-to-end tests for the authentication and integrity stack.
//!
//! Each fixture starts the real router on an ephemeral port and drives it
//! with a cookie-keeping HTTP client, exercising the full middleware
//! pipeline: CSRF guard, session gate, and action-token gate.
//!
//! Run with: `cargo test --test auth_flow_tests`
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::TcpListener;
use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tokio::time::sleep;

use prosepolish::{AppState, Config, SigningSecret, build_router};

const ADMIN_USER: &str = "admin";
const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Find an available port for the test server
fn find_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to ephemeral port")
        .local_addr()
        .expect("Failed to get local address")
        .port()
}

/// Test fixture that runs the app server on an ephemeral port
struct TestFixture {
    base_url: String,
    client: Client,
}

impl TestFixture {
    /// Start a server with the given config and connect a cookie-keeping client
    async fn with_config(mut config: Config) -> Self {
        let port = find_available_port();
        config.host = "127.0.0.1".to_string();
        config.port = port;
        config.metrics_port = 0;

        let state = AppState::new(
            SigningSecret::from_bytes(b"integration-test-secret".to_vec()),
            config,
        );
        let app = build_router(state);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .expect("Failed to bind test listener");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        // Give the server a moment to start accepting
        sleep(Duration::from_millis(50)).await;

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            client,
        }
    }

    /// Start a server with login configured and default everything else
    async fn new() -> Self {
        Self::with_config(Self::default_config()).await
    }

    fn default_config() -> Config {
        Config {
            admin_user: Some(ADMIN_USER.to_string()),
            admin_password: Some(ADMIN_PASSWORD.to_string()),
            ..Config::default()
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Fetch `/api/health` so the client picks up a CSRF cookie, and return
    /// the minted value (read off the Set-Cookie header; the client's own
    /// jar keeps a copy for subsequent requests)
    async fn prime_csrf(&self) -> String {
        let response = self
            .client
            .get(self.url("/api/health"))
            .send()
            .await
            .expect("health request failed");
        assert_eq!(response.status(), StatusCode::OK);

        response
            .headers()
            .get_all("set-cookie")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| v.strip_prefix("_csrf="))
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
            .expect("no CSRF cookie after priming")
    }

    /// Log in with the fixture's admin credentials, priming CSRF first.
    /// Returns the CSRF token for subsequent unsafe requests.
    async fn login(&self) -> String {
        let csrf = self.prime_csrf().await;

        let response = self
            .client
            .post(self.url("/api/login"))
            .header("x-csrf-token", &csrf)
            .json(&json!({"username": ADMIN_USER, "password": ADMIN_PASSWORD}))
            .send()
            .await
            .expect("login request failed");
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = response.json().await.expect("login body not JSON");
        assert_eq!(body["success"], json!(true));

        csrf
    }
}

// =============================================================================
// Health & Public Surface
// =============================================================================

#[tokio::test]
async fn health_requires_no_cookies() {
    let fixture = TestFixture::new().await;

    // A client with no cookies of any kind gets 200
    let bare_client = Client::new();
    let response = bare_client
        .get(fixture.url("/api/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], json!("ok"));
}

#[tokio::test]
async fn first_visit_sets_csrf_cookie() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .client
        .get(fixture.url("/api/health"))
        .send()
        .await
        .unwrap();

    let set_cookie = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("_csrf="))
        .expect("no _csrf Set-Cookie on first visit")
        .to_string();

    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(!set_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn unauthenticated_api_request_gets_401_json() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .client
        .get(fixture.url("/api/token"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn unauthenticated_browser_request_redirects_to_login() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .client
        .get(fixture.url("/anything"))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get("location").unwrap(), "/login");
}

// =============================================================================
// CSRF
// =============================================================================

#[tokio::test]
async fn first_post_without_header_is_rejected_even_with_fresh_cookie() {
    let fixture = TestFixture::new().await;

    // The very first request is a POST: the response mints the cookie, but
    // the check necessarily fails because no header could have been set yet.
    let response = fixture
        .client
        .post(fixture.url("/api/login"))
        .json(&json!({"username": ADMIN_USER, "password": ADMIN_PASSWORD}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn post_with_matching_cookie_and_header_passes_csrf() {
    let fixture = TestFixture::new().await;
    let csrf = fixture.prime_csrf().await;

    let response = fixture
        .client
        .post(fixture.url("/api/login"))
        .header("x-csrf-token", &csrf)
        .json(&json!({"username": ADMIN_USER, "password": ADMIN_PASSWORD}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn post_with_wrong_header_is_rejected() {
    let fixture = TestFixture::new().await;
    let _ = fixture.prime_csrf().await;

    let response = fixture
        .client
        .post(fixture.url("/api/login"))
        .header("x-csrf-token", "not-the-cookie-value")
        .json(&json!({"username": ADMIN_USER, "password": ADMIN_PASSWORD}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn exempt_path_accepts_post_without_header() {
    let config = Config {
        csrf_exempt_paths: vec!["/api/logout".to_string()],
        ..TestFixture::default_config()
    };
    let fixture = TestFixture::with_config(config).await;

    let response = fixture
        .client
        .post(fixture.url("/api/logout"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn login_with_wrong_password_gets_401() {
    let fixture = TestFixture::new().await;
    let csrf = fixture.prime_csrf().await;

    let response = fixture
        .client
        .post(fixture.url("/api/login"))
        .header("x-csrf-token", &csrf)
        .json(&json!({"username": ADMIN_USER, "password": "wrong"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_without_configured_credentials_gets_403() {
    let config = Config {
        admin_user: None,
        admin_password: None,
        ..Config::default()
    };
    let fixture = TestFixture::with_config(config).await;
    let csrf = fixture.prime_csrf().await;

    let response = fixture
        .client
        .post(fixture.url("/api/login"))
        .header("x-csrf-token", &csrf)
        .json(&json!({"username": "anyone", "password": "anything"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_sets_session_and_user_name_cookies() {
    let fixture = TestFixture::new().await;
    let csrf = fixture.prime_csrf().await;

    let response = fixture
        .client
        .post(fixture.url("/api/login"))
        .header("x-csrf-token", &csrf)
        .json(&json!({"username": ADMIN_USER, "password": ADMIN_PASSWORD}))
        .send()
        .await
        .unwrap();

    let cookies: Vec<String> = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect();

    let session = cookies
        .iter()
        .find(|c| c.starts_with("session="))
        .expect("no session cookie");
    assert!(session.contains("HttpOnly"));

    let user_name = cookies
        .iter()
        .find(|c| c.starts_with("user_name="))
        .expect("no user_name cookie");
    assert!(!user_name.contains("HttpOnly"));
}

#[tokio::test]
async fn repeated_login_failures_are_rate_limited() {
    let config = Config {
        login_failure_limit: 2,
        login_failure_burst: 2,
        ..TestFixture::default_config()
    };
    let fixture = TestFixture::with_config(config).await;
    let csrf = fixture.prime_csrf().await;

    let mut last_status = StatusCode::OK;
    for _ in 0..6 {
        let response = fixture
            .client
            .post(fixture.url("/api/login"))
            .header("x-csrf-token", &csrf)
            .header("x-forwarded-for", "203.0.113.50")
            .json(&json!({"username": ADMIN_USER, "password": "wrong"}))
            .send()
            .await
            .unwrap();
        last_status = response.status();
    }

    assert_eq!(last_status, StatusCode::TOO_MANY_REQUESTS);
}

// =============================================================================
// End-to-End: login → token → gated endpoint
// =============================================================================

#[tokio::test]
async fn full_flow_login_token_rewrite() {
    let fixture = TestFixture::new().await;
    let csrf = fixture.login().await;

    // Fetch an action token
    let response = fixture
        .client
        .get(fixture.url("/api/token"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let token = body["token"].as_str().expect("no token").to_string();
    let timestamp = body["timestamp"].as_i64().expect("no timestamp");
    assert!(body["expiresIn"].as_u64().is_some());

    // Spend it on the gated endpoint
    let response = fixture
        .client
        .post(fixture.url("/api/rewrite"))
        .header("x-csrf-token", &csrf)
        .header("x-request-token", &token)
        .header("x-request-timestamp", timestamp.to_string())
        .json(&json!({"text": "This prose was assembled by a machine."}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn rewrite_without_action_token_gets_403() {
    let fixture = TestFixture::new().await;
    let csrf = fixture.login().await;

    let response = fixture
        .client
        .post(fixture.url("/api/rewrite"))
        .header("x-csrf-token", &csrf)
        .json(&json!({"text": "no token attached"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn expired_action_token_gets_403() {
    let config = Config {
        request_token_ttl: Duration::from_millis(50),
        ..TestFixture::default_config()
    };
    let fixture = TestFixture::with_config(config).await;
    let csrf = fixture.login().await;

    let response = fixture
        .client
        .get(fixture.url("/api/token"))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();
    let timestamp = body["timestamp"].as_i64().unwrap();

    // Let the token lapse before spending it
    sleep(Duration::from_millis(150)).await;

    let response = fixture
        .client
        .post(fixture.url("/api/rewrite"))
        .header("x-csrf-token", &csrf)
        .header("x-request-token", &token)
        .header("x-request-timestamp", timestamp.to_string())
        .json(&json!({"text": "too late"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn logout_clears_cookies_and_session_stops_working() {
    let fixture = TestFixture::new().await;
    let csrf = fixture.login().await;

    // Session works
    let response = fixture
        .client
        .get(fixture.url("/api/token"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Logout clears both cookies
    let response = fixture
        .client
        .post(fixture.url("/api/logout"))
        .header("x-csrf-token", &csrf)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let removals: Vec<String> = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect();
    assert!(removals.iter().any(|c| c.starts_with("session=")));
    assert!(removals.iter().any(|c| c.starts_with("user_name=")));

    // The cookie store dropped the session, so the gate rejects again
    let response = fixture
        .client
        .get(fixture.url("/api/token"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rewrite_rejects_oversized_text() {
    let config = Config {
        max_text_length: 20,
        ..TestFixture::default_config()
    };
    let fixture = TestFixture::with_config(config).await;
    let csrf = fixture.login().await;

    let response = fixture
        .client
        .get(fixture.url("/api/token"))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();
    let timestamp = body["timestamp"].as_i64().unwrap();

    let response = fixture
        .client
        .post(fixture.url("/api/rewrite"))
        .header("x-csrf-token", &csrf)
        .header("x-request-token", &token)
        .header("x-request-timestamp", timestamp.to_string())
        .json(&json!({"text": "this text is definitely longer than twenty characters"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
