//! Lease Manager - the token-issuing entry point of leasegate.
//!
//! The `LeaseManager` ties the pieces together for one token request:
//! - Read the license snapshot from the store
//! - Evaluate it at the clock's current instant
//! - Shape the decision into the wire response

use crate::clock::{Clock, SystemClock};
use crate::config::LeasegateConfig;
use crate::policy::access::evaluate;
use crate::protocol::models::{TokenRequest, TokenResponse};
use crate::store::LicenseStore;
use crate::LeasegateError;
use chrono::TimeDelta;
use std::sync::Arc;
use tracing::debug;

/// Issues leases against a license store.
///
/// Create one instance per process and share it between request handlers.
pub struct LeaseManager {
    store: Arc<dyn LicenseStore>,
    clock: Arc<dyn Clock>,
    token_ttl_seconds: u64,
}

impl LeaseManager {
    /// Create a lease manager using the system clock.
    ///
    /// # Errors
    /// Returns `ConfigError` if the configuration does not validate.
    pub fn new(
        store: Arc<dyn LicenseStore>,
        config: &LeasegateConfig,
    ) -> Result<Self, LeasegateError> {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Create a lease manager with an explicit clock.
    pub fn with_clock(
        store: Arc<dyn LicenseStore>,
        config: &LeasegateConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LeasegateError> {
        config.validate()?;
        Ok(Self {
            store,
            clock,
            token_ttl_seconds: config.token_ttl_seconds,
        })
    }

    /// Evaluate a token request.
    ///
    /// Denials come back as `Ok(TokenResponse::Denied(..))`. An `Err` means
    /// no decision was made.
    ///
    /// # Errors
    /// - `InvalidKey` - blank `license_key`
    /// - `StoreIO` - the store could not be read
    pub fn issue_token(&self, request: &TokenRequest) -> Result<TokenResponse, LeasegateError> {
        if request.license_key.trim().is_empty() {
            return Err(LeasegateError::InvalidKey(
                "license_key must be non-empty".to_string(),
            ));
        }

        let license = self.store.get(&request.license_key)?;
        let now = self.clock.now_utc();

        let decision = evaluate(license.as_ref(), now, self.token_ttl());
        debug!(
            license_key = %request.license_key,
            allowed = decision.is_allowed(),
            reason = decision.denial_reason().map(|r| r.as_str()),
            "token request evaluated"
        );

        Ok(TokenResponse::from_decision(
            decision,
            license.as_ref(),
            now,
            self.token_ttl_seconds,
        ))
    }

    /// Configured lease lifetime in seconds.
    pub fn token_ttl_seconds(&self) -> u64 {
        self.token_ttl_seconds
    }

    fn token_ttl(&self) -> TimeDelta {
        // validate() caps the TTL at i64::MAX seconds.
        TimeDelta::try_seconds(self.token_ttl_seconds as i64).unwrap_or(TimeDelta::MAX)
    }
}
