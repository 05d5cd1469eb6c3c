//! Session handling and API client core for the todo web front end.
//!
//! # Overview
//! Signs users up and in against the todo backend, keeps the resulting
//! bearer token in a request-scoped [`Session`], and performs CRUD on todos
//! with that token. HTTP status codes become a four-way [`ApiError`]
//! taxonomy the page layer can match on.
//!
//! # Design
//! - `TodoClient` and `AuthClient` are stateless: they build `HttpRequest`
//!   values and parse `HttpResponse` values without touching the network.
//! - `Transport` executes requests; `UreqTransport` is the HTTP one.
//! - `ApiClient` composes the two and reads the token from the `Session`
//!   passed to each call.
//! - `Session` reads never mutate: an expired token yields no user but stays
//!   until sign-out.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod cookie;
pub mod error;
pub mod http;
pub mod session;
pub mod token;
pub mod transport;
pub mod types;

pub use api::ApiClient;
pub use auth::AuthClient;
pub use client::TodoClient;
pub use config::ClientConfig;
pub use crate::cookie::{CookieConfig, SameSite};
pub use error::ApiError;
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::Session;
pub use token::Claims;
pub use transport::{Transport, UreqTransport};
pub use types::{CreateTodo, SignInParams, SignUpParams, Todo, UpdateTodo, User};
