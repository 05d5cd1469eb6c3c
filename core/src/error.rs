//! Error taxonomy for the todo API client.
//!
//! # Design
//! Four outcomes matter to callers: the session is missing or rejected
//! (`Unauthenticated`), the record does not exist (`NotFound`), the backend
//! or network failed (`Transport`), or a success body did not match the
//! expected shape (`Decode`). `Transport` keeps the server-provided detail
//! text when there is one, since that is what the user sees.

use thiserror::Error;

/// Errors returned by the auth and todo clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No session token, or the backend answered 401.
    #[error("not authenticated")]
    Unauthenticated,

    /// The backend answered 404 for a single-record operation.
    #[error("todo not found")]
    NotFound,

    /// Any other non-2xx status, or a network-level failure (`status: None`).
    #[error("{message}")]
    Transport { status: Option<u16>, message: String },

    /// A success body could not be deserialized into the expected type.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request payload could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(String),
}

impl ApiError {
    /// Whether the page layer should send the user to sign-in instead of
    /// showing the message.
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthenticated => Some(401),
            ApiError::NotFound => Some(404),
            ApiError::Transport { status, .. } => *status,
            ApiError::Decode(_) | ApiError::Encode(_) => None,
        }
    }
}
