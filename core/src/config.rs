//! Client configuration.
//!
//! Values come from the environment:
//!
//! | variable | default |
//! |----------|---------|
//! | `TODO_API_URL` | `http://localhost:8000` |
//! | `TODO_ENV` | unset; `production` marks the session cookie `Secure` |
//! | `TODO_HTTP_TIMEOUT_SECS` | `30` |

use std::time::Duration;

use crate::cookie::CookieConfig;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default timeout for backend requests: 30 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ENV_BASE_URL: &str = "TODO_API_URL";
const ENV_MODE: &str = "TODO_ENV";
const ENV_TIMEOUT: &str = "TODO_HTTP_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
    /// Whether the session cookie is marked `Secure`.
    pub production: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            production: false,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            ..Default::default()
        }
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup(ENV_BASE_URL)
            .map(|url| url.trim().trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        let timeout = lookup(ENV_TIMEOUT)
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let production = lookup(ENV_MODE).is_some_and(|mode| mode.trim() == "production");

        Self {
            base_url,
            timeout,
            production,
        }
    }

    /// Session cookie attributes for this deployment.
    pub fn cookie_config(&self) -> CookieConfig {
        CookieConfig {
            secure: self.production,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_local_backend() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(!config.production);
        assert!(!config.cookie_config().secure);
    }

    #[test]
    fn reads_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("TODO_API_URL", "https://api.example.com/"),
            ("TODO_ENV", "production"),
            ("TODO_HTTP_TIMEOUT_SECS", "5"),
        ]));
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.cookie_config().secure);
    }

    #[test]
    fn blank_url_and_bad_timeout_fall_back() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("TODO_API_URL", "  "),
            ("TODO_HTTP_TIMEOUT_SECS", "soon"),
        ]));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }
}
