//! Leasegate error types.
//!
//! Denials (`not_found`, `disabled`, `expired`) are not errors: they are
//! ordinary values of [`crate::policy::access::Decision`]. Everything here is
//! either a rejected admin mutation or an infrastructure failure.

use thiserror::Error;

/// Errors raised by the store, the admin operations and the transports.
#[derive(Debug, Error)]
pub enum LeasegateError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// License duration is out of range.
    #[error("Duration must be between 1 and {max} days, got {days}", max = crate::license::MAX_DURATION_DAYS)]
    InvalidDuration {
        /// The rejected duration.
        days: i64,
    },

    /// Caller-supplied license key is malformed.
    #[error("Invalid license key: {0}")]
    InvalidKey(String),

    /// A license with this key already exists.
    #[error("License key already exists: {key}")]
    DuplicateKey {
        /// The colliding key.
        key: String,
    },

    /// No license with this key exists.
    #[error("License key not found: {key}")]
    NotFound {
        /// The missing key.
        key: String,
    },

    /// Every generated key collided with an existing one.
    #[error("Failed to generate a unique license key after {attempts} attempts")]
    KeyGenerationExhausted {
        /// Number of candidates tried.
        attempts: usize,
    },

    /// Persistence layer failure.
    #[error("Store I/O error: {0}")]
    StoreIO(String),

    /// Admin credentials are not configured.
    #[error("Admin access is disabled. Set ADMIN_USERNAME and ADMIN_PASSWORD.")]
    AdminDisabled,

    /// Admin credentials were missing or wrong.
    #[error("Invalid admin credentials")]
    Unauthorized,

    /// HTTP transport error talking to a leasegate server.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body did not match the token protocol.
    #[error("Protocol error: {0}")]
    ProtocolError(String),
}

impl LeasegateError {
    /// True for errors caused by caller input at the admin boundary.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidDuration { .. } | Self::InvalidKey(_)
        )
    }

    /// True for infrastructure failures that must never be shown as a denial.
    pub fn is_system(&self) -> bool {
        matches!(
            self,
            Self::ConfigError(_)
                | Self::KeyGenerationExhausted { .. }
                | Self::StoreIO(_)
                | Self::Transport(_)
                | Self::ProtocolError(_)
        )
    }
}
