//! In-memory stand-in for the todo backend.
//!
//! Implements the REST contract the front end consumes: account
//! registration, password-form token issuance (HS256), and per-user todo
//! CRUD behind `Authorization: Bearer`. Errors use `{"detail": ...}` bodies.

pub mod auth;
pub mod error;
pub mod todos;

use std::{collections::HashMap, sync::Arc};

use axum::{
    routing::{get, post},
    Json, Router,
};
use jsonwebtoken::DecodingKey;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

pub use todos::Todo;

/// Settings for the mock backend.
#[derive(Clone, Debug)]
pub struct Config {
    /// HS256 signing secret for issued tokens.
    pub secret: String,
    pub token_ttl: chrono::Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret: "mock-server-development-secret".to_owned(),
            token_ttl: chrono::Duration::minutes(30),
        }
    }
}

impl Config {
    pub(crate) fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.as_bytes())
    }
}

#[derive(Default)]
pub(crate) struct Store {
    /// Username to password. Plaintext: this server only ever holds test data.
    pub users: HashMap<String, String>,
    pub todos: HashMap<String, todos::Owned>,
}

#[derive(Clone)]
pub struct AppState {
    pub(crate) config: Arc<Config>,
    pub(crate) store: Arc<RwLock<Store>>,
}

pub fn app() -> Router {
    app_with(Config::default())
}

pub fn app_with(config: Config) -> Router {
    let state = AppState {
        config: Arc::new(config),
        store: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/health", get(health))
        .route("/register", post(auth::register))
        .route("/token", post(auth::login))
        .route("/todos", get(todos::list_todos).post(todos::create_todo))
        .route(
            "/todos/{id}",
            get(todos::get_todo)
                .put(todos::update_todo)
                .delete(todos::delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Config::default()).await
}

pub async fn run_with(listener: TcpListener, config: Config) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Backend is running" }))
}
