//! Session cookie attributes and header formatting.

use ::cookie::time::Duration;
use ::cookie::Cookie;

pub use ::cookie::SameSite;

/// Default cookie name carrying the bearer token.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Session lifetime: one week, in seconds.
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    pub max_age_secs: i64,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: SESSION_COOKIE_NAME.to_owned(),
            path: "/".to_owned(),
            max_age_secs: SESSION_MAX_AGE_SECS,
            secure: false,
            http_only: true,
            same_site: SameSite::Lax,
        }
    }
}

impl CookieConfig {
    /// `Set-Cookie` value storing `token` for the full session lifetime.
    pub fn set_cookie(&self, token: &str) -> String {
        self.build(token.to_owned(), Duration::seconds(self.max_age_secs))
            .to_string()
    }

    /// `Set-Cookie` value that empties the cookie and expires it immediately.
    pub fn removal_cookie(&self) -> String {
        self.build(String::new(), Duration::ZERO).to_string()
    }

    fn build(&self, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build((self.name.clone(), value))
            .path(self.path.clone())
            .secure(self.secure)
            .http_only(self.http_only)
            .same_site(self.same_site)
            .max_age(max_age)
            .build()
    }
}

/// Finds the value of cookie `name` in a request `Cookie` header.
///
/// Unparseable pairs are skipped. Empty values are treated as absent.
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    Cookie::split_parse(header)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().trim_matches('"').to_owned())
        .filter(|value| !value.is_empty())
}
