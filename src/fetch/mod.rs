//! Resource fetching over HTTP(S).
//!
//! One GET per call, bounded by a fixed timeout since the caller runs
//! inline with content rendering. There is no retry policy, and failures
//! are never cached as negative results: a failed fetch is retried on
//! the next pipeline invocation. That duplicate work is a deliberate,
//! accepted inefficiency.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use thiserror::Error;
use url::Url;

use crate::debug;

/// Hosts recognized as local/development deployments.
pub const DEFAULT_LOCAL_SUFFIXES: &[&str] = &[".local", ".localhost", ".test"];

/// Fetch failure kinds. All of them are absorbed by the pipeline; only
/// the operator log ever sees the detail.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS or timeout failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx response.
    #[error("http error: status {status}")]
    Http { status: u16 },

    /// 2xx response with nothing in it.
    #[error("empty response body")]
    EmptyBody,
}

/// HTTP fetcher with an optional relaxed-TLS agent for local hosts.
pub struct Fetcher {
    agent: ureq::Agent,
    /// Present only for local/development origins. Scoped strictly to
    /// `.svg`-suffixed locators so the trust relaxation never broadens
    /// to unrelated traffic.
    insecure_agent: Option<ureq::Agent>,
}

impl Fetcher {
    /// Build a fetcher. `relax_tls` should be true only when the
    /// deployment's own origin host is a local/development host; it must
    /// never be set for production origins.
    pub fn new(timeout: Duration, relax_tls: bool) -> Result<Self> {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();

        let insecure_agent = if relax_tls {
            let connector = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .build()
                .context("failed to build relaxed TLS connector")?;
            Some(
                ureq::AgentBuilder::new()
                    .timeout(timeout)
                    .tls_connector(Arc::new(connector))
                    .build(),
            )
        } else {
            None
        };

        Ok(Self {
            agent,
            insecure_agent,
        })
    }

    /// Retrieve the raw markup text behind `locator`.
    pub fn fetch(&self, locator: &Url) -> Result<String, FetchError> {
        let agent = match &self.insecure_agent {
            // Relaxation applies only to SVG locators.
            Some(insecure) if locator.path().ends_with(".svg") => insecure,
            _ => &self.agent,
        };

        debug!("fetch"; "GET {}", locator);

        let response = agent.get(locator.as_str()).call().map_err(|e| match e {
            ureq::Error::Status(status, _) => FetchError::Http { status },
            ureq::Error::Transport(t) => FetchError::Transport(t.to_string()),
        })?;

        let body = response
            .into_string()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(body)
    }
}

/// Check whether a host counts as a local/development deployment.
///
/// Matches loopback names/addresses and the configured suffix list
/// (`shop.local`, `site.test`, ...).
pub fn is_local_host(host: &str, suffixes: &[String]) -> bool {
    if host == "localhost" || host == "127.0.0.1" || host == "::1" || host == "[::1]" {
        return true;
    }
    suffixes.iter().any(|s| host.ends_with(s.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn default_suffixes() -> Vec<String> {
        DEFAULT_LOCAL_SUFFIXES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_is_local_host() {
        let suffixes = default_suffixes();
        assert!(is_local_host("localhost", &suffixes));
        assert!(is_local_host("127.0.0.1", &suffixes));
        assert!(is_local_host("mysite.local", &suffixes));
        assert!(is_local_host("mysite.test", &suffixes));
        assert!(!is_local_host("example.com", &suffixes));
        assert!(!is_local_host("localhost.example.com", &suffixes));
    }

    /// Spawn a loopback server answering every request the same way.
    fn serve_fixed(status: u16, body: &'static str) -> u16 {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        thread::spawn(move || {
            for request in server.incoming_requests() {
                let response = tiny_http::Response::from_string(body).with_status_code(status);
                let _ = request.respond(response);
            }
        });
        port
    }

    #[test]
    fn test_fetch_success() {
        let port = serve_fixed(200, r#"<svg><path d="M0 0"/></svg>"#);
        let fetcher = Fetcher::new(Duration::from_secs(5), false).unwrap();
        let url = Url::parse(&format!("http://127.0.0.1:{port}/icon.svg")).unwrap();
        let body = fetcher.fetch(&url).unwrap();
        assert!(body.contains("<svg>"));
    }

    #[test]
    fn test_fetch_http_error() {
        let port = serve_fixed(404, "not found");
        let fetcher = Fetcher::new(Duration::from_secs(5), false).unwrap();
        let url = Url::parse(&format!("http://127.0.0.1:{port}/missing.svg")).unwrap();
        match fetcher.fetch(&url) {
            Err(FetchError::Http { status }) => assert_eq!(status, 404),
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn test_fetch_empty_body() {
        let port = serve_fixed(200, "");
        let fetcher = Fetcher::new(Duration::from_secs(5), false).unwrap();
        let url = Url::parse(&format!("http://127.0.0.1:{port}/empty.svg")).unwrap();
        assert!(matches!(fetcher.fetch(&url), Err(FetchError::EmptyBody)));
    }

    #[test]
    fn test_fetch_transport_error() {
        // Nothing listens on this port.
        let fetcher = Fetcher::new(Duration::from_secs(1), false).unwrap();
        let url = Url::parse("http://127.0.0.1:1/icon.svg").unwrap();
        assert!(matches!(fetcher.fetch(&url), Err(FetchError::Transport(_))));
    }
}
