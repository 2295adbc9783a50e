//! Integration tests for registration and the session lifecycle

use chirpy::auth::verify_access_token;
use chirpy::configuration::{AuthSettings, Platform};
use chirpy::startup::{run, Stores};
use chirpy::store::{
    InMemoryChirpStore, InMemoryRefreshTokenStore, InMemoryUserStore, RefreshTokenStore,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::Arc;

const SIGNING_KEY: &str = "integration-test-signing-key";

pub struct TestApp {
    pub address: String,
    pub refresh_tokens: Arc<InMemoryRefreshTokenStore>,
    pub client: reqwest::Client,
}

fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let refresh_tokens = Arc::new(InMemoryRefreshTokenStore::new());
    let stores = Stores {
        users: Arc::new(InMemoryUserStore::new()),
        refresh_tokens: refresh_tokens.clone(),
        chirps: Arc::new(InMemoryChirpStore::new()),
    };

    let server = run(listener, stores, AuthSettings::new(SIGNING_KEY), Platform::Production)
        .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        refresh_tokens,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", &self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    async fn post_bearer(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", &self.address, path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    async fn create_user(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_json("/api/users", &json!({ "email": email, "password": password }))
            .await
    }

    async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_json("/api/login", &json!({ "email": email, "password": password }))
            .await
    }

    async fn login_ok(&self, email: &str, password: &str) -> Value {
        let response = self.login(email, password).await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }
}

// --- Registration Tests ---

#[tokio::test]
async fn create_user_returns_201_without_password_digest() {
    let app = spawn_app();

    let response = app.create_user("a@b.com", "correct").await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "a@b.com");
    assert!(body.get("id").is_some());
    assert!(body.get("hashed_password").is_none());
}

#[tokio::test]
async fn create_user_returns_409_for_duplicate_email() {
    let app = spawn_app();
    app.create_user("a@b.com", "correct").await;

    let response = app.create_user("a@b.com", "other").await;

    assert_eq!(409, response.status().as_u16());
}

#[tokio::test]
async fn create_user_returns_400_for_invalid_input() {
    let app = spawn_app();
    let cases = vec![
        ("not-an-email", "correct", "invalid email"),
        ("a@b.com", "", "empty password"),
    ];

    for (email, password, description) in cases {
        let response = app.create_user(email, password).await;
        assert_eq!(400, response.status().as_u16(), "case: {}", description);
    }
}

// --- Login Tests ---

#[tokio::test]
async fn login_issues_access_and_refresh_tokens() {
    let app = spawn_app();
    app.create_user("a@b.com", "correct").await;

    let body = app.login_ok("a@b.com", "correct").await;

    assert_eq!(body["email"], "a@b.com");
    assert_eq!(body["expires_in"], 3600);
    assert_eq!(body["token_type"], "Bearer");

    let user_id = verify_access_token(body["token"].as_str().unwrap(), SIGNING_KEY)
        .expect("access token should verify");
    assert_eq!(user_id.to_string(), body["id"].as_str().unwrap());

    let refresh_token = body["refresh_token"].as_str().unwrap();
    assert_eq!(refresh_token.len(), 64);
    assert!(refresh_token.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));

    let stored = app
        .refresh_tokens
        .find_by_token(refresh_token)
        .await
        .unwrap()
        .expect("refresh token should be stored");
    assert_eq!(stored.user_id, Some(user_id));
    assert!(stored.revoked_at.is_none());
    let drift = (stored.expires_at - (Utc::now() + Duration::days(60))).num_seconds().abs();
    assert!(drift < 5);
}

#[tokio::test]
async fn login_returns_same_401_for_wrong_password_and_unknown_email() {
    let app = spawn_app();
    app.create_user("a@b.com", "correct").await;

    let wrong_password = app.login("a@b.com", "wrong").await;
    let unknown_email = app.login("nobody@b.com", "correct").await;

    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_email.status().as_u16());

    let first: Value = wrong_password.json().await.unwrap();
    let second: Value = unknown_email.json().await.unwrap();
    assert_eq!(first["code"], second["code"]);
    assert_eq!(first["message"], second["message"]);
}

#[tokio::test]
async fn login_accepts_email_with_surrounding_whitespace() {
    let app = spawn_app();
    app.create_user(" a@b.com ", "correct").await;

    let body = app.login_ok(" a@b.com ", "correct").await;

    assert_eq!(body["email"], "a@b.com");
}

// --- Refresh Tests ---

#[tokio::test]
async fn refresh_returns_new_access_token() {
    let app = spawn_app();
    app.create_user("a@b.com", "correct").await;
    let login = app.login_ok("a@b.com", "correct").await;
    let refresh_token = login["refresh_token"].as_str().unwrap();
    let before = app.refresh_tokens.find_by_token(refresh_token).await.unwrap().unwrap();

    let response = app.post_bearer("/api/refresh", refresh_token).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let user_id = verify_access_token(body["token"].as_str().unwrap(), SIGNING_KEY).unwrap();
    assert_eq!(user_id.to_string(), login["id"].as_str().unwrap());

    let after = app.refresh_tokens.find_by_token(refresh_token).await.unwrap().unwrap();
    assert_eq!(before.expires_at, after.expires_at);
}

#[tokio::test]
async fn refresh_returns_401_for_unknown_token() {
    let app = spawn_app();

    let response = app.post_bearer("/api/refresh", "deadbeef").await;

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn refresh_returns_401_for_expired_token() {
    let app = spawn_app();
    app.create_user("a@b.com", "correct").await;
    let login = app.login_ok("a@b.com", "correct").await;
    let user_id = login["id"].as_str().unwrap().parse().unwrap();
    app.refresh_tokens
        .create("expired-token", Some(user_id), Utc::now() - Duration::seconds(1))
        .await
        .unwrap();

    let response = app.post_bearer("/api/refresh", "expired-token").await;

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn refresh_returns_401_without_authorization_header() {
    let app = spawn_app();

    let response = app
        .client
        .post(&format!("{}/api/refresh", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

// --- Revoke Tests ---

#[tokio::test]
async fn revoked_token_can_no_longer_refresh() {
    let app = spawn_app();
    app.create_user("a@b.com", "correct").await;
    let login = app.login_ok("a@b.com", "correct").await;
    let refresh_token = login["refresh_token"].as_str().unwrap();

    let revoke = app.post_bearer("/api/revoke", refresh_token).await;
    assert_eq!(204, revoke.status().as_u16());

    let refresh = app.post_bearer("/api/refresh", refresh_token).await;
    assert_eq!(401, refresh.status().as_u16());

    let again = app.post_bearer("/api/revoke", refresh_token).await;
    assert_eq!(401, again.status().as_u16());
}

// --- Credential Update Tests ---

#[tokio::test]
async fn update_user_requires_access_token() {
    let app = spawn_app();

    let response = app
        .client
        .put(&format!("{}/api/users", &app.address))
        .json(&json!({ "email": "c@d.com", "password": "new" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn update_user_rejects_refresh_token_as_access_token() {
    let app = spawn_app();
    app.create_user("a@b.com", "correct").await;
    let login = app.login_ok("a@b.com", "correct").await;

    let response = app
        .client
        .put(&format!("{}/api/users", &app.address))
        .bearer_auth(login["refresh_token"].as_str().unwrap())
        .json(&json!({ "email": "c@d.com", "password": "new" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn update_user_changes_login_credentials() {
    let app = spawn_app();
    app.create_user("a@b.com", "correct").await;
    let login = app.login_ok("a@b.com", "correct").await;

    let response = app
        .client
        .put(&format!("{}/api/users", &app.address))
        .bearer_auth(login["token"].as_str().unwrap())
        .json(&json!({ "email": "c@d.com", "password": "new" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "c@d.com");
    assert_eq!(body["id"], login["id"]);

    assert_eq!(401, app.login("a@b.com", "correct").await.status().as_u16());
    app.login_ok("c@d.com", "new").await;
}
