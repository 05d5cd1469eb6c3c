//! Account endpoints and bearer-token checking.

use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};
use axum::{Form, Json};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::AppState;

/// Claims in tokens issued by `POST /token`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// The username behind a valid `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(Error::MissingToken)?;

        let data = jsonwebtoken::decode::<Claims>(
            token,
            &state.config.decoding_key(),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|err| {
            tracing::debug!(error = %err, "Rejected bearer token");
            Error::InvalidToken
        })?;

        Ok(AuthUser(data.claims.sub))
    }
}

/// Signs an access token for `username`.
pub fn issue_token(state: &AppState, username: &str) -> Result<String> {
    let claims = Claims {
        sub: username.to_owned(),
        exp: (Utc::now() + state.config.token_ttl).timestamp(),
    };
    let key = EncodingKey::from_secret(state.config.secret.as_bytes());
    Ok(jsonwebtoken::encode(&Header::default(), &claims, &key)?)
}

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> Result<Json<Value>> {
    let username = input.username.trim().to_owned();
    if username.is_empty() || input.password.is_empty() {
        return Err(Error::Validation(
            "username and password are required".to_owned(),
        ));
    }

    let mut store = state.store.write().await;
    if store.users.contains_key(&username) {
        return Err(Error::UsernameTaken);
    }
    store.users.insert(username.clone(), input.password);
    tracing::info!(%username, "Registered user");

    Ok(Json(json!({
        "message": "User created successfully",
        "username": username,
    })))
}

pub async fn login(
    State(state): State<AppState>,
    Form(input): Form<Credentials>,
) -> Result<Json<Value>> {
    let known = {
        let store = state.store.read().await;
        store.users.get(&input.username) == Some(&input.password)
    };
    if !known {
        return Err(Error::BadCredentials);
    }

    let access_token = issue_token(&state, &input.username)?;
    Ok(Json(json!({
        "access_token": access_token,
        "token_type": "bearer",
    })))
}
