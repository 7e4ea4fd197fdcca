//! Admin operations on licenses.
//!
//! Every transport (admin HTTP API, CLI) goes through [`LicenseAdmin`], so
//! input validation happens in exactly one place. Authentication is the
//! transport's job.

use crate::clock::{Clock, SystemClock};
use crate::license::key::{generate_key, normalize_key};
use crate::license::{License, LicenseStatus, LicenseSummary, MAX_DURATION_DAYS};
use crate::policy::remaining::RemainingTime;
use crate::protocol::timestamp;
use crate::store::{LicenseStore, KEY_GENERATION_ATTEMPTS};
use crate::LeasegateError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Input for `create-license`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLicense {
    /// Lifetime in days; must be in `1..=MAX_DURATION_DAYS`.
    pub days: i64,
    /// Key to use instead of a generated one.
    #[serde(default)]
    pub key: Option<String>,
    /// Free-text note. Blank notes are dropped.
    #[serde(default)]
    pub note: Option<String>,
}

/// Result of enable/disable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Affected license.
    pub license_key: String,
    /// Status after the change.
    pub status: LicenseStatus,
}

/// A license row for the admin listing, with time-left fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseOverview {
    /// Stored fields plus derived expiry.
    #[serde(flatten)]
    pub summary: LicenseSummary,
    /// Whether the license has run out.
    pub is_expired: bool,
    /// Whole days left, never negative.
    pub days_left: u64,
    /// Compact time-left text such as `17d 4h 9s`.
    pub remaining_time: String,
    /// When these fields were computed.
    #[serde(with = "timestamp")]
    pub as_of: DateTime<Utc>,
}

impl LicenseOverview {
    /// Compute the overview of `license` at `now`.
    pub fn at(license: &License, now: DateTime<Utc>) -> Self {
        let expires_at = license.expires_at();
        let left_seconds = (expires_at - now).num_seconds().max(0);

        Self {
            summary: license.summary(),
            is_expired: license.is_expired_at(now),
            days_left: (left_seconds / 86_400) as u64,
            remaining_time: RemainingTime::between(now, expires_at).to_string(),
            as_of: now,
        }
    }
}

/// The admin operations, bound to a store and a clock.
pub struct LicenseAdmin {
    store: Arc<dyn LicenseStore>,
    clock: Arc<dyn Clock>,
}

impl LicenseAdmin {
    /// Admin operations using the system clock.
    pub fn new(store: Arc<dyn LicenseStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Admin operations with an explicit clock.
    pub fn with_clock(store: Arc<dyn LicenseStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Create a license, active from now.
    ///
    /// # Errors
    /// - `InvalidDuration` - `days` outside `1..=MAX_DURATION_DAYS`
    /// - `InvalidKey` - supplied key is blank or malformed
    /// - `DuplicateKey` - supplied key already exists
    /// - `KeyGenerationExhausted` / `StoreIO` - system failures
    pub fn create_license(&self, request: &CreateLicense) -> Result<License, LeasegateError> {
        let duration_days = u32::try_from(request.days)
            .ok()
            .filter(|d| (1..=MAX_DURATION_DAYS).contains(d))
            .ok_or(LeasegateError::InvalidDuration { days: request.days })?;

        let key = request.key.as_deref().map(normalize_key).transpose()?;

        let note = request
            .note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let license =
            self.store
                .create(key.as_deref(), duration_days, note, self.clock.now_utc())?;

        info!(
            license_key = %license.license_key,
            duration_days,
            "license created"
        );
        Ok(license)
    }

    /// Disable a license. Disabling a disabled license is a no-op.
    pub fn disable_license(&self, license_key: &str) -> Result<StatusChange, LeasegateError> {
        self.set_active(license_key, false)
    }

    /// Enable a license. Enabling an active license is a no-op.
    pub fn enable_license(&self, license_key: &str) -> Result<StatusChange, LeasegateError> {
        self.set_active(license_key, true)
    }

    fn set_active(&self, license_key: &str, active: bool) -> Result<StatusChange, LeasegateError> {
        let license = self
            .store
            .set_active(license_key, active)?
            .ok_or_else(|| LeasegateError::NotFound {
                key: license_key.to_string(),
            })?;

        info!(license_key = %license.license_key, status = %license.status, "license status set");
        Ok(StatusChange {
            license_key: license.license_key,
            status: license.status,
        })
    }

    /// A random key not currently present in the store.
    ///
    /// Another admin can still take the key before it is used, in which case
    /// `create_license` reports `DuplicateKey`.
    pub fn suggest_key(&self) -> Result<String, LeasegateError> {
        for _ in 0..KEY_GENERATION_ATTEMPTS {
            let key = generate_key();
            if self.store.get(&key)?.is_none() {
                return Ok(key);
            }
        }
        Err(LeasegateError::KeyGenerationExhausted {
            attempts: KEY_GENERATION_ATTEMPTS,
        })
    }

    /// All licenses in creation order.
    pub fn list_licenses(&self) -> Result<Vec<LicenseSummary>, LeasegateError> {
        Ok(self.store.list()?.iter().map(License::summary).collect())
    }

    /// All licenses with time-left fields computed at the current instant.
    pub fn overview(&self) -> Result<Vec<LicenseOverview>, LeasegateError> {
        let now = self.clock.now_utc();
        Ok(self
            .store
            .list()?
            .iter()
            .map(|license| LicenseOverview::at(license, now))
            .collect())
    }

    /// One license.
    pub fn show_license(&self, license_key: &str) -> Result<LicenseSummary, LeasegateError> {
        self.store
            .get(license_key)?
            .map(|license| license.summary())
            .ok_or_else(|| LeasegateError::NotFound {
                key: license_key.to_string(),
            })
    }
}
