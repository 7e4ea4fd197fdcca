//! Lease issuance decision.
//!
//! Checks run in a fixed order and the first failing check wins:
//! - License must exist
//! - License must be active
//! - License must not have expired
//!
//! Everything in here is a pure function of the license snapshot, the
//! evaluation instant and the configured TTL.

use crate::license::License;
use crate::policy::remaining::RemainingTime;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Why a token request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// No license has the requested key.
    NotFound,
    /// The license exists but an admin disabled it.
    Disabled,
    /// The license ran out.
    Expired,
}

impl DenialReason {
    /// Wire string for this reason.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Disabled => "disabled",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A short-lived grant. Computed per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    /// Fresh random identifier.
    pub lease_id: String,
    /// Evaluation instant.
    pub issued_at: DateTime<Utc>,
    /// `issued_at + token_ttl`.
    pub expires_at: DateTime<Utc>,
}

impl Lease {
    /// Issue a lease starting at `now`.
    pub fn issue(now: DateTime<Utc>, token_ttl: TimeDelta) -> Self {
        Self {
            lease_id: Uuid::new_v4().to_string(),
            issued_at: now,
            expires_at: now.checked_add_signed(token_ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}

/// Outcome of evaluating a license at an instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// A lease was granted.
    Allowed {
        /// The granted lease.
        lease: Lease,
        /// Time left on the license at evaluation.
        remaining_time: RemainingTime,
    },
    /// No lease; the reason is reported to the client.
    Denied(DenialReason),
}

impl Decision {
    /// Whether a lease was granted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// The denial reason, if any.
    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self {
            Self::Denied(reason) => Some(*reason),
            Self::Allowed { .. } => None,
        }
    }
}

/// Decide whether `license` may be leased at `now`.
///
/// # Arguments
/// * `license` - The stored license, or `None` if the key is unknown
/// * `now` - Evaluation instant
/// * `token_ttl` - Lifetime of the lease on success
pub fn evaluate(license: Option<&License>, now: DateTime<Utc>, token_ttl: TimeDelta) -> Decision {
    // 1. Key must exist
    let Some(license) = license else {
        return Decision::Denied(DenialReason::NotFound);
    };

    // 2. Admin flag must allow it
    if !license.is_active() {
        return Decision::Denied(DenialReason::Disabled);
    }

    // 3. Must not have run out
    let expires_at = license.expires_at();
    if now >= expires_at {
        return Decision::Denied(DenialReason::Expired);
    }

    Decision::Allowed {
        lease: Lease::issue(now, token_ttl),
        remaining_time: RemainingTime::between(now, expires_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, MockClock};
    use crate::license::LicenseStatus;
    use chrono::TimeZone;

    fn ttl() -> TimeDelta {
        TimeDelta::seconds(86_400)
    }

    fn scenario_license(status: LicenseStatus) -> License {
        License {
            license_key: "ABCD-EFGH-JKLM".to_string(),
            issued_at: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
            duration_days: 30,
            status,
            note: None,
        }
    }

    #[test]
    fn test_scenario_allowed() {
        let license = scenario_license(LicenseStatus::Active);
        let clock = MockClock::from_rfc3339("2026-02-13T15:00:00Z");

        let decision = evaluate(Some(&license), clock.now_utc(), ttl());
        let Decision::Allowed { lease, remaining_time } = decision else {
            panic!("expected Allowed, got {:?}", decision);
        };

        assert_eq!(lease.issued_at, clock.now_utc());
        assert_eq!(
            lease.expires_at,
            Utc.with_ymd_and_hms(2026, 2, 14, 15, 0, 0).unwrap()
        );
        assert_eq!(remaining_time.years, 0);
        assert_eq!(remaining_time.months, 0);
        assert_eq!(remaining_time.days, 17);
        assert_eq!(remaining_time.hours, 9);
        assert_eq!(
            remaining_time.apply_to(clock.now_utc()),
            Some(license.expires_at())
        );
    }

    #[test]
    fn test_scenario_expired_one_second_after() {
        let license = scenario_license(LicenseStatus::Active);
        let clock = MockClock::from_rfc3339("2026-03-03T00:00:01Z");

        let decision = evaluate(Some(&license), clock.now_utc(), ttl());
        assert_eq!(decision, Decision::Denied(DenialReason::Expired));
    }

    #[test]
    fn test_expired_exactly_at_boundary() {
        let license = scenario_license(LicenseStatus::Active);
        let clock = MockClock::from_rfc3339("2026-03-03T00:00:00Z");

        let decision = evaluate(Some(&license), clock.now_utc(), ttl());
        assert_eq!(decision.denial_reason(), Some(DenialReason::Expired));
    }

    #[test]
    fn test_last_second_is_allowed() {
        let license = scenario_license(LicenseStatus::Active);
        let clock = MockClock::from_rfc3339("2026-03-02T23:59:59Z");

        let decision = evaluate(Some(&license), clock.now_utc(), ttl());
        let Decision::Allowed { remaining_time, .. } = decision else {
            panic!("expected Allowed");
        };
        assert_eq!(remaining_time.to_string(), "1s");
    }

    #[test]
    fn test_disabled_wins_before_and_after_expiry() {
        let license = scenario_license(LicenseStatus::Disabled);

        for now in ["2026-02-01T00:00:00Z", "2026-02-13T15:00:00Z", "2027-01-01T00:00:00Z"] {
            let clock = MockClock::from_rfc3339(now);
            let decision = evaluate(Some(&license), clock.now_utc(), ttl());
            assert_eq!(decision, Decision::Denied(DenialReason::Disabled), "at {}", now);
        }
    }

    #[test]
    fn test_missing_license_is_not_found() {
        let clock = MockClock::from_rfc3339("2026-02-13T15:00:00Z");
        let decision = evaluate(None, clock.now_utc(), ttl());
        assert_eq!(decision, Decision::Denied(DenialReason::NotFound));
        assert!(!decision.is_allowed());
    }

    #[test]
    fn test_leases_are_request_scoped() {
        let license = scenario_license(LicenseStatus::Active);
        let mut clock = MockClock::from_rfc3339("2026-02-13T15:00:00Z");

        let first = evaluate(Some(&license), clock.now_utc(), ttl());
        clock.advance(TimeDelta::minutes(10));
        let second = evaluate(Some(&license), clock.now_utc(), ttl());

        let (Decision::Allowed { lease: a, .. }, Decision::Allowed { lease: b, .. }) = (first, second)
        else {
            panic!("both evaluations should be allowed");
        };
        assert_ne!(a.lease_id, b.lease_id);
        assert_eq!(b.issued_at - a.issued_at, TimeDelta::minutes(10));
        assert_eq!(b.expires_at - a.expires_at, TimeDelta::minutes(10));
    }

    #[test]
    fn test_ttl_is_respected() {
        let license = scenario_license(LicenseStatus::Active);
        let clock = MockClock::from_rfc3339("2026-02-13T15:00:00Z");

        let decision = evaluate(Some(&license), clock.now_utc(), TimeDelta::seconds(90));
        let Decision::Allowed { lease, .. } = decision else {
            panic!("expected Allowed");
        };
        assert_eq!(lease.expires_at - lease.issued_at, TimeDelta::seconds(90));
    }

    #[test]
    fn test_evaluation_does_not_touch_license() {
        let license = scenario_license(LicenseStatus::Active);
        let before = license.clone();
        let clock = MockClock::from_rfc3339("2026-02-13T15:00:00Z");

        let _ = evaluate(Some(&license), clock.now_utc(), ttl());
        assert_eq!(license, before);
    }

    #[test]
    fn test_reason_strings() {
        assert_eq!(DenialReason::NotFound.as_str(), "not_found");
        assert_eq!(
            serde_json::to_string(&DenialReason::Disabled).unwrap(),
            "\"disabled\""
        );
        assert_eq!(DenialReason::Expired.to_string(), "expired");
    }
}
