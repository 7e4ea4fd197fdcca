//! Maps `LeasegateError` to HTTP responses.

use crate::server::auth::ADMIN_REALM;
use crate::LeasegateError;
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Error body returned by every non-2xx JSON response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable code.
    pub code: String,
}

/// A `LeasegateError` on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub LeasegateError);

impl From<LeasegateError> for ApiError {
    fn from(err: LeasegateError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status and code for the wrapped error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            LeasegateError::InvalidDuration { .. } => (StatusCode::BAD_REQUEST, "invalid_duration"),
            LeasegateError::InvalidKey(_) => (StatusCode::BAD_REQUEST, "invalid_key"),
            LeasegateError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            LeasegateError::DuplicateKey { .. } => (StatusCode::CONFLICT, "duplicate_key"),
            LeasegateError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            LeasegateError::AdminDisabled => (StatusCode::SERVICE_UNAVAILABLE, "admin_disabled"),
            LeasegateError::ConfigError(_)
            | LeasegateError::KeyGenerationExhausted { .. }
            | LeasegateError::StoreIO(_)
            | LeasegateError::Transport(_)
            | LeasegateError::ProtocolError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // System failures are logged in full and reported generically.
        let message = if self.0.is_system() {
            error!(error = %self.0, "request failed");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = ApiErrorBody {
            error: message,
            code: code.to_string(),
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{}\"", ADMIN_REALM)) {
                response.headers_mut().insert(WWW_AUTHENTICATE, value);
            }
        }
        response
    }
}
