use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures the mock backend reports as `{"detail": ...}` bodies.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not authenticated")]
    MissingToken,

    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Incorrect username or password")]
    BadCredentials,

    #[error("Username already registered")]
    UsernameTaken,

    #[error("Todo not found")]
    TodoNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Failed to issue token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Error::MissingToken | Error::InvalidToken | Error::BadCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Error::UsernameTaken => StatusCode::BAD_REQUEST,
            Error::TodoNotFound => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = Json(json!({ "detail": self.to_string() }));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
