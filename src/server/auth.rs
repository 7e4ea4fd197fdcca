//! HTTP Basic authentication for the admin API.

use crate::config::AdminCredentials;
use crate::server::error::ApiError;
use crate::server::AppState;
use crate::LeasegateError;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};
use tracing::warn;

/// Realm announced in `WWW-Authenticate`.
pub const ADMIN_REALM: &str = "leasegate-admin";

/// Expected admin credentials, kept only as SHA-256 digests.
#[derive(Clone)]
pub struct AdminGate {
    username_digest: [u8; 32],
    password_digest: [u8; 32],
}

impl AdminGate {
    /// Digest the configured credentials.
    pub fn new(credentials: &AdminCredentials) -> Self {
        Self {
            username_digest: sha256(credentials.username.as_bytes()),
            password_digest: sha256(credentials.password.as_bytes()),
        }
    }

    /// Check a username/password pair.
    ///
    /// Both comparisons always run, over fixed-length digests.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let user_ok = constant_time_eq(&sha256(username.as_bytes()), &self.username_digest);
        let pass_ok = constant_time_eq(&sha256(password.as_bytes()), &self.password_digest);
        user_ok & pass_ok
    }

    /// Check the `Authorization` header of a request.
    pub fn verify_headers(&self, headers: &HeaderMap) -> bool {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_basic)
            .is_some_and(|(user, pass)| self.verify(&user, &pass))
    }
}

/// Middleware guarding every admin route.
///
/// 503 when no credentials are configured, 401 when they do not match.
pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(gate) = state.admin_gate.as_ref() else {
        return ApiError::from(LeasegateError::AdminDisabled).into_response();
    };

    if !gate.verify_headers(request.headers()) {
        warn!(path = %request.uri().path(), "rejected admin request with bad credentials");
        return ApiError::from(LeasegateError::Unauthorized).into_response();
    }

    next.run(request).await
}

/// Decode `Basic <base64(user:pass)>`.
pub fn parse_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

fn sha256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(data));
    out
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
