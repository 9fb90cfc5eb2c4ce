//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;
use std::sync::Arc;
use sweetshop_client::{ClientConfig, InMemorySessionStore, Sweet, SweetShopClient};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    is_admin: bool,
    exp: i64,
}

/// Mint an HS256 token the way the backend does
pub fn mint_token(username: &str, is_admin: bool) -> String {
    let claims = TestClaims {
        sub: username.to_string(),
        is_admin,
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn sweet(id: i64, name: &str, category: &str, price: f64, quantity: u32) -> Sweet {
    Sweet {
        id,
        name: name.to_string(),
        category: category.to_string(),
        price,
        quantity,
    }
}

/// Three items, one of them sold out
pub fn inventory() -> Vec<Sweet> {
    vec![
        sweet(1, "Lemon Drops", "candy", 1.5, 12),
        sweet(2, "Carrot Cake", "cake", 4.5, 5),
        sweet(3, "Black Forest", "cake", 6.0, 0),
    ]
}

pub struct TestContext {
    pub server: MockServer,
    pub store: Arc<InMemorySessionStore>,
    pub client: SweetShopClient,
}

pub async fn setup() -> TestContext {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("sweetshop_client=debug")
        .with_test_writer()
        .try_init();

    let server = MockServer::start().await;
    let store = Arc::new(InMemorySessionStore::new());
    let client = SweetShopClient::new(
        ClientConfig::new(format!("{}/api", server.uri())),
        store.clone(),
    )
    .unwrap();

    TestContext {
        server,
        store,
        client,
    }
}

/// Mount a successful login for `username` returning `token`
pub async fn mock_login(server: &MockServer, username: &str, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_string_contains(format!("username={}", username)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": token,
            "token_type": "bearer"
        })))
        .mount(server)
        .await;
}

/// Mount a working profile endpoint
pub async fn mock_me(server: &MockServer, id: i64, username: &str, is_admin: bool) {
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": id,
            "username": username,
            "email": format!("{}@example.com", username),
            "is_admin": is_admin
        })))
        .mount(server)
        .await;
}

/// Mount a profile endpoint that always fails
pub async fn mock_me_unavailable(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(503))
        .mount(server)
        .await;
}
