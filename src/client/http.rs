//! Reqwest-based HTTP client for a leasegate server.
//!
//! Blocking on purpose: the typical caller is a desktop app or daemon that
//! checks its lease at startup and then once per TTL.

use crate::protocol::models::{parse_token_response, TokenRequest, TokenResponse};
use crate::LeasegateError;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for `POST /v1/token`.
pub struct LeaseClient {
    client: Client,
    base_url: String,
    user_agent: String,
    timeout: Duration,
}

impl LeaseClient {
    /// Create a client for the server at `base_url`, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: &str) -> Result<Self, LeasegateError> {
        Self::build(base_url, DEFAULT_TIMEOUT)
    }

    /// Set request timeout.
    pub fn with_timeout(self, timeout: Duration) -> Result<Self, LeasegateError> {
        let mut client = Self::build(&self.base_url, timeout)?;
        client.user_agent = self.user_agent;
        Ok(client)
    }

    /// Prefix the User-Agent with the calling application, e.g. `myapp/1.2.0`.
    pub fn with_app(mut self, app: &str) -> Self {
        self.user_agent = build_user_agent(Some(app));
        self
    }

    fn build(base_url: &str, timeout: Duration) -> Result<Self, LeasegateError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LeasegateError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: build_user_agent(None),
            timeout,
        })
    }

    /// Ask the server for a lease.
    ///
    /// A denial is a successful call: check [`TokenResponse::is_allowed`].
    ///
    /// # Errors
    /// - `Transport` - connection failure or non-2xx status
    /// - `ProtocolError` - the body is not a token response
    pub fn request_token(&self, request: &TokenRequest) -> Result<TokenResponse, LeasegateError> {
        let url = format!("{}/v1/token", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .map_err(|e| LeasegateError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LeasegateError::Transport(format!(
                "Server answered {} for {}",
                status, url
            )));
        }

        let body = response
            .bytes()
            .map_err(|e| LeasegateError::Transport(format!("Failed to read body: {}", e)))?;
        parse_token_response(&body)
    }

    /// Server base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Build a User-Agent string.
///
/// Format: `leasegate-client/<version>` optionally followed by ` <app>`.
pub fn build_user_agent(app: Option<&str>) -> String {
    let version = env!("CARGO_PKG_VERSION");
    match app {
        Some(app) => format!("leasegate-client/{} {}", version, app),
        None => format!("leasegate-client/{}", version),
    }
}
