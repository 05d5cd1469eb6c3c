//! Request-scoped session state.
//!
//! # Design
//! A `Session` is built from the incoming request's `Cookie` header and
//! passed explicitly to every operation that needs the bearer token. Writes
//! (`establish`, `clear`) update the in-memory token immediately and queue a
//! `Set-Cookie` value for the response layer to send back.
//!
//! Reading the current user never mutates the session: an expired or
//! malformed token yields no user but stays in place until `clear`.

use chrono::{DateTime, Utc};

use crate::cookie::{self, CookieConfig};
use crate::token;
use crate::types::User;

/// Tracing target for session operations.
pub const TRACING_TARGET: &str = "todo_web_core::session";

#[derive(Debug, Clone)]
pub struct Session {
    config: CookieConfig,
    token: Option<String>,
    pending: Vec<String>,
}

impl Session {
    /// An empty session with no token.
    pub fn new(config: CookieConfig) -> Self {
        Self {
            config,
            token: None,
            pending: Vec::new(),
        }
    }

    /// Captures the session token from a request `Cookie` header.
    pub fn from_cookie_header(config: CookieConfig, header: Option<&str>) -> Self {
        let token = header
            .and_then(|header| cookie::find_cookie(header, &config.name));
        Self {
            config,
            token,
            pending: Vec::new(),
        }
    }

    /// Stores `token` as the session and queues the cookie that persists it.
    pub fn establish(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.pending.push(self.config.set_cookie(&token));
        self.token = Some(token);
        tracing::debug!(target: TRACING_TARGET, "Session established");
    }

    /// Forgets the token and queues a cookie that deletes it. Idempotent.
    pub fn clear(&mut self) {
        self.token = None;
        self.pending.push(self.config.removal_cookie());
        tracing::debug!(target: TRACING_TARGET, "Session cleared");
    }

    /// The raw bearer token, if one is stored. Not checked for expiry.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The signed-in user, or `None` when the token is absent, expired, or
    /// cannot be decoded.
    pub fn current_user(&self) -> Option<User> {
        self.current_user_at(Utc::now())
    }

    pub fn current_user_at(&self, now: DateTime<Utc>) -> Option<User> {
        let token = self.token.as_deref()?;

        let claims = match token::decode_unverified(token) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %err,
                    "Ignoring undecodable session token"
                );
                return None;
            }
        };

        if claims.is_expired_at(now) {
            tracing::debug!(
                target: TRACING_TARGET,
                username = %claims.sub,
                "Ignoring expired session token"
            );
            return None;
        }

        Some(User {
            username: claims.sub,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// `Set-Cookie` values queued by `establish` and `clear`, oldest first.
    pub fn set_cookie_headers(&self) -> &[String] {
        &self.pending
    }

    /// Drains the queued `Set-Cookie` values.
    pub fn take_set_cookie_headers(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(CookieConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};

    use super::*;

    fn token_for(sub: &str, exp: DateTime<Utc>) -> String {
        let claims = serde_json::json!({"sub": sub, "exp": exp.timestamp()});
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"issued-by-backend"),
        )
        .unwrap()
    }

    fn session_with(token: &str) -> Session {
        let header = format!("session={token}");
        Session::from_cookie_header(CookieConfig::default(), Some(&header))
    }

    #[test]
    fn no_cookie_means_no_user() {
        let session = Session::from_cookie_header(CookieConfig::default(), None);
        assert!(session.token().is_none());
        assert!(session.current_user().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn valid_token_yields_subject() {
        let token = token_for("alice", Utc::now() + Duration::hours(1));
        let session = session_with(&token);
        assert_eq!(session.token(), Some(token.as_str()));
        assert_eq!(
            session.current_user(),
            Some(User {
                username: "alice".to_string()
            })
        );
        assert!(session.is_authenticated());
    }

    #[test]
    fn expired_token_yields_no_user_and_keeps_cookie() {
        let now = Utc::now();
        let token = token_for("alice", now - Duration::minutes(5));
        let session = session_with(&token);

        assert!(session.current_user_at(now).is_none());
        assert_eq!(session.token(), Some(token.as_str()));
        assert!(session.set_cookie_headers().is_empty());
    }

    #[test]
    fn expiry_is_relative_to_check_time() {
        let now = Utc::now();
        let token = token_for("alice", now + Duration::minutes(30));
        let session = session_with(&token);

        assert!(session.current_user_at(now).is_some());
        assert!(session.current_user_at(now + Duration::hours(1)).is_none());
    }

    #[test]
    fn malformed_token_yields_no_user() {
        for garbage in ["not-a-jwt", "a.b.c", "....", "eyJhbGciOiJIUzI1NiJ9.@@@.sig"] {
            let session = session_with(garbage);
            assert!(session.current_user().is_none(), "{garbage}");
            assert!(session.set_cookie_headers().is_empty());
        }
    }

    #[test]
    fn establish_sets_token_and_queues_cookie() {
        let token = token_for("bob", Utc::now() + Duration::days(1));
        let mut session = Session::default();
        session.establish(token.clone());

        assert_eq!(session.current_user().map(|u| u.username).as_deref(), Some("bob"));
        assert_eq!(session.set_cookie_headers(), [CookieConfig::default().set_cookie(&token)]);
        assert!(session.set_cookie_headers()[0].starts_with(&format!("session={token};")));
    }

    #[test]
    fn clear_then_current_user_is_none() {
        let token = token_for("carol", Utc::now() + Duration::days(1));
        let mut session = session_with(&token);
        session.clear();

        assert!(session.token().is_none());
        assert!(session.current_user().is_none());
        assert_eq!(session.set_cookie_headers(), [CookieConfig::default().removal_cookie()]);
        assert!(session.set_cookie_headers()[0].contains("Max-Age=0"));
    }

    #[test]
    fn clear_is_idempotent() {
        let mut session = Session::default();
        session.clear();
        session.clear();
        assert!(session.current_user().is_none());
        let headers = session.take_set_cookie_headers();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0], headers[1]);
        assert!(session.set_cookie_headers().is_empty());
    }
}
