//! Command handlers against a mocked backend.

use std::sync::Arc;
use sweetshop_cli::{App, Commands};
use sweetshop_cli::cli::{ItemArgs, SearchArgs};
use sweetshop_client::store::{ADMIN_FLAG_KEY, TOKEN_KEY};
use sweetshop_client::{ClientConfig, InMemorySessionStore, SessionStore, SweetShopClient};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn inventory() -> serde_json::Value {
    serde_json::json!([
        { "id": 1, "name": "Lemon Drops", "category": "candy", "price": 1.5, "quantity": 12 },
        { "id": 2, "name": "Carrot Cake", "category": "cake", "price": 4.5, "quantity": 0 }
    ])
}

async fn app_with_session(server: &MockServer, is_admin: bool) -> App {
    let store = Arc::new(InMemorySessionStore::new());
    store.set(TOKEN_KEY, "opaque-token").await.unwrap();

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 1,
            "username": if is_admin { "admin" } else { "shopper" },
            "email": "someone@example.com",
            "is_admin": is_admin
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sweets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(inventory()))
        .mount(server)
        .await;

    let client = SweetShopClient::new(
        ClientConfig::new(format!("{}/api", server.uri())),
        store,
    )
    .unwrap();
    App::new(client)
}

#[tokio::test]
async fn test_catalog_commands_require_login() {
    let server = MockServer::start().await;
    let client = SweetShopClient::new(
        ClientConfig::new(format!("{}/api", server.uri())),
        Arc::new(InMemorySessionStore::new()),
    )
    .unwrap();
    let app = App::new(client);

    let err = app.execute(Commands::List).await.unwrap_err();
    assert!(err.to_string().contains("Not logged in"));
}

#[tokio::test]
async fn test_admin_commands_refused_for_shoppers() {
    let server = MockServer::start().await;
    let app = app_with_session(&server, false).await;

    Mock::given(method("POST"))
        .and(path("/api/sweets/1/restock"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/sweets/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = app
        .execute(Commands::Restock {
            id: 1,
            quantity: Some(5),
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("admin"));

    assert!(
        app.execute(Commands::Delete { id: 1, yes: true })
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_admin_delete_with_yes() {
    let server = MockServer::start().await;
    let app = app_with_session(&server, true).await;

    Mock::given(method("DELETE"))
        .and(path("/api/sweets/1"))
        .and(header("Authorization", "Bearer opaque-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    app.execute(Commands::Delete { id: 1, yes: true })
        .await
        .unwrap();
    assert!(app.client().session.is_admin().await);
}

#[tokio::test]
async fn test_purchase_of_sold_out_item_fails_locally() {
    let server = MockServer::start().await;
    let app = app_with_session(&server, false).await;

    Mock::given(method("POST"))
        .and(path("/api/sweets/2/purchase"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = app
        .execute(Commands::Purchase { id: 2, quantity: 1 })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Sweet 2 is out of stock");
}

#[tokio::test]
async fn test_search_uses_backend_filter() {
    let server = MockServer::start().await;
    let app = app_with_session(&server, false).await;

    Mock::given(method("GET"))
        .and(path("/api/sweets/search"))
        .and(query_param("category", "cake"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": 2, "name": "Carrot Cake", "category": "cake", "price": 4.5, "quantity": 0 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    app.execute(Commands::Search(SearchArgs {
        category: Some("cake".to_string()),
        ..SearchArgs::default()
    }))
    .await
    .unwrap();

    let state = app.client().catalog.state().await;
    assert_eq!(state.displayed.len(), 1);
    assert_eq!(state.canonical.len(), 2);
}

#[tokio::test]
async fn test_edit_without_fields_is_rejected() {
    let server = MockServer::start().await;
    let app = app_with_session(&server, true).await;

    let err = app
        .execute(Commands::Edit {
            id: 1,
            fields: ItemArgs::default(),
        })
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Nothing to update"));
}

#[tokio::test]
async fn test_logout_clears_stored_session() {
    let server = MockServer::start().await;
    let store = Arc::new(InMemorySessionStore::new());
    store.set(TOKEN_KEY, "opaque-token").await.unwrap();
    store.set(ADMIN_FLAG_KEY, "true").await.unwrap();

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(0)
        .mount(&server)
        .await;

    let client = SweetShopClient::new(
        ClientConfig::new(format!("{}/api", server.uri())),
        store.clone(),
    )
    .unwrap();
    let app = App::new(client);

    app.execute(Commands::Logout).await.unwrap();

    assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);
    assert_eq!(store.get(ADMIN_FLAG_KEY).await.unwrap(), None);
}
