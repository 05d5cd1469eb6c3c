//! Request builder and response parser for account endpoints.
//!
//! `POST /register` takes JSON; `POST /token` takes an OAuth2 password form
//! and answers with `{access_token}`. Failures surface the backend's
//! `detail` (or `message`) text because that is what the sign-in form shows.
//! A 401 from `/token` means bad credentials, not a missing session, so it
//! is reported as `Transport` like any other rejection.

use url::form_urlencoded;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ErrorBody, MessageResponse, SignInParams, SignUpParams, TokenResponse};

const SIGN_UP_SUCCESS: &str = "Account created successfully. Please sign in.";

#[derive(Debug, Clone)]
pub struct AuthClient {
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_sign_up(&self, params: &SignUpParams) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(params).map_err(|e| ApiError::Encode(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/register", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_sign_in(&self, params: &SignInParams) -> HttpRequest {
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("username", &params.username)
            .append_pair("password", &params.password)
            .finish();
        HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/token", self.base_url),
            headers: vec![(
                "content-type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            )],
            body: Some(body),
        }
    }

    /// Returns the confirmation message to show the user.
    pub fn parse_sign_up(&self, response: HttpResponse) -> Result<String, ApiError> {
        if !response.is_success() {
            return Err(rejection(&response, "failed to create account"));
        }
        let body: MessageResponse = serde_json::from_str(&response.body)
            .map_err(|_| unreadable(&response))?;
        Ok(body.message.unwrap_or_else(|| SIGN_UP_SUCCESS.to_string()))
    }

    /// Returns the issued access token.
    pub fn parse_sign_in(&self, response: HttpResponse) -> Result<String, ApiError> {
        if !response.is_success() {
            return Err(rejection(&response, "failed to log into account"));
        }
        let body: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|_| unreadable(&response))?;
        body.access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Decode("response has no access_token".to_string()))
    }
}

fn rejection(response: &HttpResponse, action: &str) -> ApiError {
    let message = match ErrorBody::parse(&response.body) {
        Some(body) => body
            .detail
            .or(body.message)
            .unwrap_or_else(|| format!("{action} ({})", response.status)),
        None => server_error(response),
    };
    ApiError::Transport {
        status: Some(response.status),
        message,
    }
}

fn unreadable(response: &HttpResponse) -> ApiError {
    ApiError::Transport {
        status: Some(response.status),
        message: server_error(response),
    }
}

fn server_error(response: &HttpResponse) -> String {
    format!("server error: {} {}", response.status, response.status_text())
}
