//! License records.
//!
//! A license is the long-lived entitlement an admin creates. Leases are
//! computed against it on every token request and are never stored.

pub mod key;

use crate::protocol::timestamp;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound on `duration_days` (roughly a thousand years).
///
/// Keeps `license_expires_at` well inside chrono's representable range.
pub const MAX_DURATION_DAYS: u32 = 365_000;

/// Admin-controlled enable/disable flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    /// License may be leased while unexpired.
    Active,
    /// License is switched off by an admin.
    Disabled,
}

impl LicenseStatus {
    /// Status string as persisted and serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
        }
    }

    /// Map the boolean `active` flag onto a status.
    pub fn from_active(active: bool) -> Self {
        if active {
            Self::Active
        } else {
            Self::Disabled
        }
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "disabled" => Ok(Self::Disabled),
            other => Err(format!("unknown license status: {}", other)),
        }
    }
}

/// A persisted license.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    /// Unique, immutable key the client presents.
    pub license_key: String,

    /// When the license was created.
    pub issued_at: DateTime<Utc>,

    /// Lifetime in whole days of elapsed time.
    pub duration_days: u32,

    /// Enable/disable flag.
    pub status: LicenseStatus,

    /// Free-text admin note.
    pub note: Option<String>,
}

impl License {
    /// Whether the admin flag allows leasing.
    pub fn is_active(&self) -> bool {
        self.status == LicenseStatus::Active
    }

    /// `issued_at + duration_days`, counting every day as 86400 seconds.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at
            .checked_add_signed(TimeDelta::days(i64::from(self.duration_days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether the license has run out at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    /// Admin-facing view of this license.
    pub fn summary(&self) -> LicenseSummary {
        LicenseSummary {
            license_key: self.license_key.clone(),
            issued_at: self.issued_at,
            duration_days: self.duration_days,
            license_expires_at: self.expires_at(),
            status: self.status,
            note: self.note.clone(),
        }
    }
}

/// License as shown by `list-licenses`, `show-license` and the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseSummary {
    /// License key.
    pub license_key: String,
    /// Creation instant.
    #[serde(with = "timestamp")]
    pub issued_at: DateTime<Utc>,
    /// Lifetime in days.
    pub duration_days: u32,
    /// Derived expiry instant.
    #[serde(with = "timestamp")]
    pub license_expires_at: DateTime<Utc>,
    /// Enable/disable flag.
    pub status: LicenseStatus,
    /// Admin note.
    pub note: Option<String>,
}
