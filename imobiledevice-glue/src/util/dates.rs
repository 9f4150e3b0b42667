/*!
 Contains date conversion utilities for Apple's reference-date timestamps.

 Both `OPACK` dates and `NSDate` objects store fractional seconds since `2001-01-01T00:00:00Z`.
*/

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, SecondsFormat, Utc};
use plist::Date;

/// Seconds between the Unix epoch and `2001-01-01T00:00:00Z`
pub const APPLE_EPOCH_OFFSET: i64 = 978_307_200;
const MICROS_PER_SECOND: f64 = 1_000_000.;
const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Returns `None` for dates outside of the range `chrono` can represent
fn to_utc(date: &Date) -> Option<DateTime<Utc>> {
    let (seconds, nanos) = match SystemTime::from(date.clone()).duration_since(UNIX_EPOCH) {
        Ok(after) => (i64::try_from(after.as_secs()).ok()?, after.subsec_nanos()),
        Err(before) => {
            let before = before.duration();
            let seconds = i64::try_from(before.as_secs()).ok()?;
            match before.subsec_nanos() {
                0 => (-seconds, 0),
                nanos => (-seconds - 1, NANOS_PER_SECOND - nanos),
            }
        }
    };
    DateTime::<Utc>::from_timestamp(seconds, nanos)
}

/// Get the number of seconds, with microsecond precision, between the Apple reference date and `date`
///
/// Returns `None` for dates outside of the range `chrono` can represent.
pub fn to_apple_seconds(date: &Date) -> Option<f64> {
    let utc = to_utc(date)?;
    Some(
        (utc.timestamp() - APPLE_EPOCH_OFFSET) as f64
            + f64::from(utc.timestamp_subsec_micros()) / MICROS_PER_SECOND,
    )
}

/// Seconds between the Apple reference date and `date` at `f64` precision, for error reports
pub fn lossy_apple_seconds(date: &Date) -> f64 {
    let unix = match SystemTime::from(date.clone()).duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs_f64(),
        Err(before) => -before.duration().as_secs_f64(),
    };
    unix - APPLE_EPOCH_OFFSET as f64
}

/// Build a [`Date`] from seconds since the Apple reference date, rounding to the nearest microsecond
///
/// Returns `None` for non-finite values or values outside of the range `chrono` can represent.
pub fn from_apple_seconds(seconds: f64) -> Option<Date> {
    if !seconds.is_finite() {
        return None;
    }
    let mut whole = seconds.floor();
    let mut micros = ((seconds - whole) * MICROS_PER_SECOND).round();
    if micros >= MICROS_PER_SECOND {
        whole += 1.;
        micros -= MICROS_PER_SECOND;
    }
    let unix = (whole as i64).checked_add(APPLE_EPOCH_OFFSET)?;
    let utc = DateTime::<Utc>::from_timestamp(unix, micros as u32 * 1_000)?;
    Some(Date::from(SystemTime::from(utc)))
}

/// Format a [`Date`] as an RFC 3339 string in UTC
pub fn format(date: &Date) -> Option<String> {
    Some(to_utc(date)?.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}
