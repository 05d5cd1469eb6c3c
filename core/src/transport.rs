//! Execution of plain-data requests.
//!
//! `Transport` is the only place the crate performs I/O. `UreqTransport`
//! disables ureq's status-code-as-error behavior so 4xx/5xx responses come
//! back as data for the clients to interpret.

use std::time::Duration;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Tracing target for transport operations.
pub const TRACING_TARGET: &str = "todo_web_core::transport";

/// Executes an `HttpRequest` and returns the backend's response.
///
/// Implementations return `Err` only when no response was received.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Blocking transport on a shared `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let HttpRequest {
            method,
            path,
            headers,
            body,
        } = request;

        tracing::debug!(
            target: TRACING_TARGET,
            method = method.as_str(),
            path = %path,
            "Sending request"
        );

        let result = match (method, body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&path), &headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(&path), &headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&path), &headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(&path), &headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(&path), &headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(self.agent.put(&path), &headers).send_empty(),
        };

        let mut response = result.map_err(|err| {
            tracing::warn!(
                target: TRACING_TARGET,
                path = %path,
                error = %err,
                "Request failed before a response was received"
            );
            ApiError::Transport {
                status: None,
                message: err.to_string(),
            }
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string().map_err(|err| {
            tracing::warn!(
                target: TRACING_TARGET,
                path = %path,
                status,
                error = %err,
                "Response body could not be read"
            );
            ApiError::Transport {
                status: None,
                message: err.to_string(),
            }
        })?;

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            status,
            "Received response"
        );

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    use super::*;

    /// Answers one connection with `raw` after reading the request head.
    fn serve_once(raw: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            stream.write_all(raw.as_bytes()).unwrap();
        });
        format!("http://{addr}/todos")
    }

    fn get(path: String) -> Result<HttpResponse, ApiError> {
        UreqTransport::new(Duration::from_secs(2)).execute(HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: Vec::new(),
            body: None,
        })
    }

    #[test]
    fn full_body_is_returned_as_data() {
        let path = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
        );
        let response = get(path).unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.body, "{}");
    }

    #[test]
    fn truncated_body_is_transport_without_status() {
        let path = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 1000\r\nConnection: close\r\n\r\n0123456789",
        );
        let err = get(path).unwrap_err();
        assert!(
            matches!(err, ApiError::Transport { status: None, .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn connection_refused_is_transport_without_status() {
        // Bind and drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = UreqTransport::new(Duration::from_secs(2));
        let err = transport
            .execute(HttpRequest {
                method: HttpMethod::Get,
                path: format!("http://{addr}/todos"),
                headers: Vec::new(),
                body: None,
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport { status: None, .. }));
    }
}
