//! One-call operations: build, execute, parse.
//!
//! `ApiClient` pairs the request builders with a [`Transport`]. Todo
//! operations read the bearer token from the caller's [`Session`]; without
//! one they fail before the transport is touched. Each failure is logged
//! once here and returned to the caller, which decides whether to retry.

use crate::auth::AuthClient;
use crate::client::TodoClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::session::Session;
use crate::transport::{Transport, UreqTransport};
use crate::types::{CreateTodo, SignInParams, SignUpParams, Todo, UpdateTodo};

/// Tracing target for API operations.
pub const TRACING_TARGET: &str = "todo_web_core::api";

#[derive(Debug, Clone)]
pub struct ApiClient<T = UreqTransport> {
    todos: TodoClient,
    auth: AuthClient,
    transport: T,
}

impl ApiClient<UreqTransport> {
    /// Client talking to `config.base_url` over HTTP.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(&config.base_url, UreqTransport::new(config.timeout))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            todos: TodoClient::new(base_url),
            auth: AuthClient::new(base_url),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        self.todos.base_url()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Registers an account and returns the confirmation message.
    pub fn sign_up(&self, params: &SignUpParams) -> Result<String, ApiError> {
        tracing::debug!(target: TRACING_TARGET, username = %params.username, "Signing up");
        let result = self
            .auth
            .build_sign_up(params)
            .and_then(|req| self.send(req))
            .and_then(|resp| self.auth.parse_sign_up(resp));
        logged("sign up", result)
    }

    /// Exchanges credentials for a token and stores it in `session`.
    ///
    /// The session is left untouched on failure.
    pub fn sign_in(&self, session: &mut Session, params: &SignInParams) -> Result<(), ApiError> {
        tracing::debug!(target: TRACING_TARGET, username = %params.username, "Signing in");
        let result = self
            .send(self.auth.build_sign_in(params))
            .and_then(|resp| self.auth.parse_sign_in(resp));
        let token = logged("sign in", result)?;
        session.establish(token);
        Ok(())
    }

    pub fn sign_out(&self, session: &mut Session) {
        session.clear();
    }

    pub fn list_todos(&self, session: &Session) -> Result<Vec<Todo>, ApiError> {
        let result = self
            .todos
            .build_list_todos(session.token())
            .and_then(|req| self.send(req))
            .and_then(|resp| self.todos.parse_list_todos(resp));
        logged("fetch todos", result)
    }

    pub fn get_todo(&self, session: &Session, id: &str) -> Result<Todo, ApiError> {
        let result = self
            .todos
            .build_get_todo(session.token(), id)
            .and_then(|req| self.send(req))
            .and_then(|resp| self.todos.parse_get_todo(resp));
        logged("fetch todo", result)
    }

    pub fn create_todo(&self, session: &Session, input: &CreateTodo) -> Result<Todo, ApiError> {
        let result = self
            .todos
            .build_create_todo(session.token(), input)
            .and_then(|req| self.send(req))
            .and_then(|resp| self.todos.parse_create_todo(resp));
        logged("create todo", result)
    }

    pub fn update_todo(
        &self,
        session: &Session,
        id: &str,
        input: &UpdateTodo,
    ) -> Result<Todo, ApiError> {
        let result = self
            .todos
            .build_update_todo(session.token(), id, input)
            .and_then(|req| self.send(req))
            .and_then(|resp| self.todos.parse_update_todo(resp));
        logged("update todo", result)
    }

    pub fn delete_todo(&self, session: &Session, id: &str) -> Result<(), ApiError> {
        let result = self
            .todos
            .build_delete_todo(session.token(), id)
            .and_then(|req| self.send(req))
            .and_then(|resp| self.todos.parse_delete_todo(resp));
        logged("delete todo", result)
    }

    fn send(&self, request: HttpRequest) -> Result<crate::http::HttpResponse, ApiError> {
        self.transport.execute(request).map_err(|err| match err {
            ApiError::Transport { status: None, message } => ApiError::Transport {
                status: None,
                message: format!(
                    "cannot connect to backend at {}: {message}",
                    self.todos.base_url()
                ),
            },
            other => other,
        })
    }
}

fn logged<R>(operation: &str, result: Result<R, ApiError>) -> Result<R, ApiError> {
    if let Err(err) = &result {
        tracing::warn!(
            target: TRACING_TARGET,
            operation,
            error = %err,
            status = err.status(),
            "Backend operation failed"
        );
    }
    result
}
