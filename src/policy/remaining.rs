//! Calendar-aware breakdown of the time left on a license.
//!
//! Years and months are calendar units counted from `now`; everything below
//! a month is fixed-length. The breakdown is for display only and never
//! feeds back into the allow/deny decision.

use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const MONTHS_PER_YEAR: u32 = 12;
const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Time left until a license expires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingTime {
    /// Whole calendar years.
    pub years: u32,
    /// Whole calendar months after the years.
    pub months: u32,
    /// Whole days after the months.
    pub days: u32,
    /// Hours after the days.
    pub hours: u32,
    /// Minutes after the hours.
    pub minutes: u32,
    /// Seconds after the minutes.
    pub seconds: u32,
}

impl RemainingTime {
    /// Break `expires_at - now` into calendar and clock units.
    ///
    /// Whole years are taken first, as 12-month steps from a moving cursor,
    /// then whole months as 1-month steps from the same cursor. Each step
    /// clamps the day to the target month, so `Jan 31 -> Mar 30` is
    /// `2mo 2d` (via Feb 28 and Mar 28). Returns all zeros when
    /// `expires_at <= now`.
    pub fn between(now: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        if expires_at <= now {
            return Self::default();
        }

        let (years, cursor) = step_while(now, MONTHS_PER_YEAR, expires_at);
        let (months, cursor) = step_while(cursor, 1, expires_at);

        let rest = (expires_at - cursor).num_seconds().max(0);
        let days = rest / SECONDS_PER_DAY;
        let rest = rest % SECONDS_PER_DAY;

        Self {
            years,
            months,
            days: u32::try_from(days).unwrap_or(u32::MAX),
            hours: (rest / SECONDS_PER_HOUR) as u32,
            minutes: ((rest % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE) as u32,
            seconds: (rest % SECONDS_PER_MINUTE) as u32,
        }
    }

    /// Replay the breakdown from `now`: `years` 12-month steps, `months`
    /// 1-month steps, then the clock units.
    ///
    /// For a breakdown produced by [`RemainingTime::between`] this yields the
    /// expiry it was computed from.
    pub fn apply_to(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut cursor = now;
        for _ in 0..self.years {
            cursor = cursor.checked_add_months(Months::new(MONTHS_PER_YEAR))?;
        }
        for _ in 0..self.months {
            cursor = cursor.checked_add_months(Months::new(1))?;
        }

        let clock = TimeDelta::try_days(i64::from(self.days))?
            + TimeDelta::hours(i64::from(self.hours))
            + TimeDelta::minutes(i64::from(self.minutes))
            + TimeDelta::seconds(i64::from(self.seconds));
        cursor.checked_add_signed(clock)
    }

    /// True when every component is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Compact form: non-zero components only, e.g. `17d 4h 9s`; `0s` when empty.
impl fmt::Display for RemainingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0s");
        }

        let units = [
            (self.years, "y"),
            (self.months, "mo"),
            (self.days, "d"),
            (self.hours, "h"),
            (self.minutes, "m"),
            (self.seconds, "s"),
        ];

        let mut first = true;
        for (value, suffix) in units {
            if value == 0 {
                continue;
            }
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}{}", value, suffix)?;
            first = false;
        }
        Ok(())
    }
}

/// Count how many `step`-month hops from `cursor` stay at or before `limit`.
///
/// Returns the count and the cursor after the last accepted hop.
fn step_while(mut cursor: DateTime<Utc>, step: u32, limit: DateTime<Utc>) -> (u32, DateTime<Utc>) {
    let mut count = 0;
    while let Some(next) = cursor.checked_add_months(Months::new(step)) {
        if next > limit {
            break;
        }
        cursor = next;
        count += 1;
    }
    (count, cursor)
}
