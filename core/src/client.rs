//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each CRUD operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//!
//! Every `build_*` takes the session's bearer token. Without one it fails
//! with `ApiError::Unauthenticated` and no request exists to send.
//!
//! Status interpretation lives in one place, `check_status`: 401 is always
//! `Unauthenticated`, 404 is `NotFound` for single-record operations, and
//! everything else is `Transport` with the best message available.

use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, ErrorBody, Todo, UpdateTodo};

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

/// The todo operation a response belongs to; drives status interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn label(self) -> &'static str {
        match self {
            Operation::List => "fetch todos",
            Operation::Get => "fetch todo",
            Operation::Create => "create todo",
            Operation::Update => "update todo",
            Operation::Delete => "delete todo",
        }
    }

    fn maps_not_found(self) -> bool {
        matches!(self, Operation::Get | Operation::Update | Operation::Delete)
    }

    /// Whether a `{detail}` error body replaces the generic message.
    fn surfaces_detail(self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_todos(&self, token: Option<&str>) -> Result<HttpRequest, ApiError> {
        self.request(token, HttpMethod::Get, self.collection_url(), None)
    }

    pub fn build_get_todo(&self, token: Option<&str>, id: &str) -> Result<HttpRequest, ApiError> {
        let token = require_token(token)?;
        self.request(Some(token), HttpMethod::Get, self.item_url(id)?, None)
    }

    pub fn build_create_todo(
        &self,
        token: Option<&str>,
        input: &CreateTodo,
    ) -> Result<HttpRequest, ApiError> {
        let token = require_token(token)?;
        let body = serde_json::to_string(input).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.request(Some(token), HttpMethod::Post, self.collection_url(), Some(body))
    }

    pub fn build_update_todo(
        &self,
        token: Option<&str>,
        id: &str,
        input: &UpdateTodo,
    ) -> Result<HttpRequest, ApiError> {
        let token = require_token(token)?;
        let body = serde_json::to_string(input).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.request(Some(token), HttpMethod::Put, self.item_url(id)?, Some(body))
    }

    pub fn build_delete_todo(&self, token: Option<&str>, id: &str) -> Result<HttpRequest, ApiError> {
        let token = require_token(token)?;
        self.request(Some(token), HttpMethod::Delete, self.item_url(id)?, None)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, Operation::List)?;
        decode(&response.body)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, Operation::Get)?;
        decode(&response.body)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, Operation::Create)?;
        decode(&response.body)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, Operation::Update)?;
        decode(&response.body)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, Operation::Delete)
    }

    fn collection_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    /// `/todos/{id}` with `id` percent-encoded as a single path segment.
    fn item_url(&self, id: &str) -> Result<String, ApiError> {
        let mut url =
            Url::parse(&self.collection_url()).map_err(|e| ApiError::Encode(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Encode(format!("invalid base url: {}", self.base_url)))?
            .push(id);
        Ok(url.into())
    }

    fn request(
        &self,
        token: Option<&str>,
        method: HttpMethod,
        url: String,
        body: Option<String>,
    ) -> Result<HttpRequest, ApiError> {
        let token = require_token(token)?;
        Ok(HttpRequest {
            method,
            path: url,
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("authorization".to_string(), format!("Bearer {token}")),
            ],
            body,
        })
    }
}

fn require_token(token: Option<&str>) -> Result<&str, ApiError> {
    token
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthenticated)
}

fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, op: Operation) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 401 {
        return Err(ApiError::Unauthenticated);
    }
    if response.status == 404 && op.maps_not_found() {
        return Err(ApiError::NotFound);
    }

    let detail = if op.surfaces_detail() {
        ErrorBody::parse(&response.body).and_then(|body| body.detail)
    } else {
        None
    };
    let message =
        detail.unwrap_or_else(|| format!("failed to {}: {}", op.label(), response.status_text()));

    Err(ApiError::Transport {
        status: Some(response.status),
        message,
    })
}
