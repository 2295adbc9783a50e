//! Integration tests for the health check and admin endpoints

use chirpy::configuration::{AuthSettings, Platform};
use chirpy::startup::{run, Stores};
use chirpy::store::{InMemoryChirpStore, InMemoryRefreshTokenStore, InMemoryUserStore};
use std::net::TcpListener;
use std::sync::Arc;

fn spawn_app(platform: Platform) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let stores = Stores {
        users: Arc::new(InMemoryUserStore::new()),
        refresh_tokens: Arc::new(InMemoryRefreshTokenStore::new()),
        chirps: Arc::new(InMemoryChirpStore::new()),
    };
    let server = run(listener, stores, AuthSettings::new("health-check-key"), platform)
        .expect("Failed to create server");

    let _ = tokio::spawn(server);

    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn health_check_works() {
    let addr = spawn_app(Platform::Production);

    let response = reqwest::Client::new()
        .get(&format!("{}/api/healthz", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn app_visits_are_counted() {
    let addr = spawn_app(Platform::Production);
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let response = client
            .get(&format!("{}/app/", addr))
            .send()
            .await
            .expect("Failed to execute request");
        assert!(response.status().is_success());
    }

    let page = client
        .get(&format!("{}/admin/metrics", addr))
        .send()
        .await
        .expect("Failed to execute request")
        .text()
        .await
        .unwrap();

    assert!(page.contains("visited 3 times"), "unexpected page: {}", page);
}

#[tokio::test]
async fn reset_is_forbidden_outside_dev() {
    let addr = spawn_app(Platform::Production);

    let response = reqwest::Client::new()
        .post(&format!("{}/admin/reset", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn reset_clears_counter_in_dev() {
    let addr = spawn_app(Platform::Dev);
    let client = reqwest::Client::new();

    client
        .get(&format!("{}/app/", addr))
        .send()
        .await
        .expect("Failed to execute request");

    let response = client
        .post(&format!("{}/admin/reset", addr))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());

    let page = client
        .get(&format!("{}/admin/metrics", addr))
        .send()
        .await
        .expect("Failed to execute request")
        .text()
        .await
        .unwrap();

    assert!(page.contains("visited 0 times"), "unexpected page: {}", page);
}
