//! `/v1/token` request and response structs.

use crate::license::License;
use crate::policy::access::{Decision, DenialReason, Lease};
use crate::policy::remaining::RemainingTime;
use crate::protocol::timestamp;
use crate::LeasegateError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /v1/token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    /// Key the client was given.
    pub license_key: String,
    /// Calling application identifier. Accepted, currently unused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    /// Calling application version. Accepted, currently unused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
}

impl TokenRequest {
    /// Request carrying only a license key.
    pub fn new(license_key: impl Into<String>) -> Self {
        Self {
            license_key: license_key.into(),
            app_id: None,
            app_version: None,
        }
    }
}

/// Lease block of an allowed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseInfo {
    /// Unique lease identifier.
    pub lease_id: String,
    /// Lease start.
    #[serde(with = "timestamp")]
    pub issued_at: DateTime<Utc>,
    /// Lease end.
    #[serde(with = "timestamp")]
    pub expires_at: DateTime<Utc>,
}

impl From<Lease> for LeaseInfo {
    fn from(lease: Lease) -> Self {
        Self {
            lease_id: lease.lease_id,
            issued_at: lease.issued_at,
            expires_at: lease.expires_at,
        }
    }
}

/// License block of an allowed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseInfo {
    /// License key.
    pub license_key: String,
    /// License creation instant.
    #[serde(with = "timestamp")]
    pub issued_at: DateTime<Utc>,
    /// Lifetime in days.
    pub duration_days: u32,
    /// Derived expiry.
    #[serde(with = "timestamp")]
    pub license_expires_at: DateTime<Utc>,
    /// Time left at `server_time`.
    pub remaining_time: RemainingTime,
}

/// Response when a lease was granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAllowed {
    /// Always `true`.
    pub allowed: bool,
    /// The granted lease.
    pub lease: LeaseInfo,
    /// The license it was granted against.
    pub license: LicenseInfo,
    /// Configured lease lifetime.
    pub token_ttl_seconds: u64,
    /// Evaluation instant.
    #[serde(with = "timestamp")]
    pub server_time: DateTime<Utc>,
}

/// Response when no lease was granted.
///
/// Shape is identical for every reason so the response does not reveal
/// anything beyond `reason` itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDenied {
    /// Always `false`.
    pub allowed: bool,
    /// Why the request was refused.
    pub reason: DenialReason,
    /// Evaluation instant.
    #[serde(with = "timestamp")]
    pub server_time: DateTime<Utc>,
}

/// Either token response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenResponse {
    /// Lease granted.
    Allowed(TokenAllowed),
    /// Lease refused.
    Denied(TokenDenied),
}

impl TokenResponse {
    /// Build the wire response for an evaluation.
    ///
    /// `license` is the snapshot that was evaluated; it is only read for
    /// allowed decisions.
    pub fn from_decision(
        decision: Decision,
        license: Option<&License>,
        now: DateTime<Utc>,
        token_ttl_seconds: u64,
    ) -> Self {
        match (decision, license) {
            (Decision::Allowed { lease, remaining_time }, Some(license)) => {
                Self::Allowed(TokenAllowed {
                    allowed: true,
                    lease: lease.into(),
                    license: LicenseInfo {
                        license_key: license.license_key.clone(),
                        issued_at: license.issued_at,
                        duration_days: license.duration_days,
                        license_expires_at: license.expires_at(),
                        remaining_time,
                    },
                    token_ttl_seconds,
                    server_time: now,
                })
            }
            (Decision::Allowed { .. }, None) => Self::denied(DenialReason::NotFound, now),
            (Decision::Denied(reason), _) => Self::denied(reason, now),
        }
    }

    /// A denial at `now`.
    pub fn denied(reason: DenialReason, now: DateTime<Utc>) -> Self {
        Self::Denied(TokenDenied {
            allowed: false,
            reason,
            server_time: now,
        })
    }

    /// Whether a lease was granted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    /// Evaluation instant reported by the server.
    pub fn server_time(&self) -> DateTime<Utc> {
        match self {
            Self::Allowed(a) => a.server_time,
            Self::Denied(d) => d.server_time,
        }
    }
}

/// Parse a raw JSON body into a token response.
pub fn parse_token_response(body: &[u8]) -> Result<TokenResponse, LeasegateError> {
    serde_json::from_slice(body).map_err(|e| {
        LeasegateError::ProtocolError(format!("Failed to parse token response: {}", e))
    })
}
