//! Time-derived status classification for cabinet items.
//!
//! Pure and total: unparsable expiry text classifies as [`MedicineStatus::None`]
//! rather than failing. Callers re-evaluate on every render so the result
//! always reflects current wall-clock time; nothing here is cached.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Items expiring within this many days (inclusive) are flagged.
const EXPIRING_SOON_WINDOW_DAYS: i64 = 30;

const DAY_MILLIS: f64 = 86_400_000.0;

/// Urgency classification driving the shelf status dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MedicineStatus {
    /// On a recurring schedule; dominates every expiry-based state.
    Scheduled,
    /// Expiry date is in the past.
    Expired,
    /// Expires within the next 30 days (inclusive of today).
    ExpiringSoon,
    /// No schedule and no expiry concern.
    None,
}

/// Classifies an item from its recurring-schedule flag and optional
/// expiry date, evaluated against `now`.
///
/// Precedence: schedule flag first, then expiry. Days until expiry are
/// computed as `ceil((expiry - now) / 1 day)`, so an item expiring later
/// today still counts as day zero, not expired.
pub fn classify(scheduled: bool, expiry_date: Option<&str>, now: DateTime<Utc>) -> MedicineStatus {
    if scheduled {
        return MedicineStatus::Scheduled;
    }
    let Some(raw) = expiry_date else {
        return MedicineStatus::None;
    };
    let Some(expiry) = parse_expiry(raw) else {
        return MedicineStatus::None;
    };

    let days = days_until(expiry, now);
    if days < 0 {
        MedicineStatus::Expired
    } else if days <= EXPIRING_SOON_WINDOW_DAYS {
        MedicineStatus::ExpiringSoon
    } else {
        MedicineStatus::None
    }
}

/// [`classify`] against the current wall clock.
pub fn classify_now(scheduled: bool, expiry_date: Option<&str>) -> MedicineStatus {
    classify(scheduled, expiry_date, Utc::now())
}

/// Accepts a full RFC 3339 timestamp or a bare `YYYY-MM-DD` prefix
/// (taken as midnight UTC), the two formats the app stores.
fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

fn days_until(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = expiry.signed_duration_since(now).num_milliseconds();
    (millis as f64 / DAY_MILLIS).ceil() as i64
}
