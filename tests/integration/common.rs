//! Shared fixtures

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use pustaka_server::{
    config::{AppConfig, DatabaseConfig},
    models::{book::CreateBook, member::CreateMember, Book, Member},
    repository::{self, MIGRATOR},
    AppState,
};

pub const MASTER_KEY: &str = "test-master-key";

fn test_config(database: DatabaseConfig) -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.master_key = MASTER_KEY.to_string();
    config.database = database;
    config
}

async fn state_for(database: DatabaseConfig) -> AppState {
    let config = test_config(database);
    let pool = repository::init_pool(&config.database)
        .await
        .expect("Failed to open database");
    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    AppState::new(config, pool)
}

/// State over a private in-memory database
pub async fn memory_state() -> AppState {
    state_for(DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    })
    .await
}

/// State over a database file, so several pool connections can race
pub async fn file_state(dir: &tempfile::TempDir) -> AppState {
    let path = dir.path().join("pustaka.db");
    state_for(DatabaseConfig {
        url: format!("sqlite://{}", path.display()),
        max_connections: 4,
        min_connections: 1,
    })
    .await
}

pub async fn add_book(state: &AppState, title: &str, stock: i64) -> Book {
    state
        .services
        .catalog
        .create_book(CreateBook {
            title: title.to_string(),
            stock,
        })
        .await
        .expect("Failed to create book")
}

pub async fn add_member(state: &AppState, name: &str) -> Member {
    state
        .services
        .catalog
        .create_member(CreateMember {
            name: name.to_string(),
            address: None,
            phone: "0812-0000-0000".to_string(),
        })
        .await
        .expect("Failed to create member")
}

pub async fn stock_of(state: &AppState, book_id: i64) -> i64 {
    state
        .services
        .catalog
        .get_book(book_id)
        .await
        .expect("Book should exist")
        .stock
}

/// Send one request through the router and decode the JSON body (Null when empty)
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    key: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}
