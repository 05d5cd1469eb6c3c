//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the backend's JSON schema. Ids and timestamps are kept
//! as the strings the backend sent; the client never generates or reformats
//! them.

use serde::{Deserialize, Serialize};

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub completed: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Credentials for `POST /register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpParams {
    pub username: String,
    pub password: String,
}

/// Credentials for `POST /token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInParams {
    pub username: String,
    pub password: String,
}

/// The signed-in user, derived from the session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
}

/// Body of a successful `POST /token`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
}

/// Body of a successful `POST /register`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MessageResponse {
    pub message: Option<String>,
}

/// Error body the backend sends on failures: `{detail}` or `{message}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Option<String>,
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}
