//! Resolves the server's configured timezone and the calendar date a cycle runs against.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Get the current UTC offset for a canonical timezone name, e.g. "Pacific/Auckland".
///
/// Returns `None` if the name does not refer to a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The calendar date of `now` as seen from `canonical_timezone`.
///
/// The time of day and offset are discarded, the generator works at day granularity.
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if `canonical_timezone` is not a known timezone.
pub fn date_in_timezone(now: OffsetDateTime, canonical_timezone: &str) -> Result<Date, Error> {
    let timezone = time_tz::timezones::get_by_name(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))?;
    let offset = timezone.get_offset_utc(&now).to_utc();

    Ok(now.to_offset(offset).date())
}

/// Today's date in `canonical_timezone`.
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if `canonical_timezone` is not a known timezone.
pub fn today(canonical_timezone: &str) -> Result<Date, Error> {
    date_in_timezone(OffsetDateTime::now_utc(), canonical_timezone)
}
