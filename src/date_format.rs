//! Parsing and formatting of `yyyy-MM-dd` calendar dates at the edges of the app.
//!
//! Inside the app dates are always [time::Date]. SQLite columns use the same text format via
//! rusqlite's `time` support.

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::Error;

const ISO_DATE: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Parse a `yyyy-MM-dd` date string.
///
/// # Errors
/// Returns [Error::InvalidDateFormat] if `text` is not a valid calendar date in that format.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text, ISO_DATE)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), text.to_owned()))
}

/// Format `date` as a `yyyy-MM-dd` string.
pub fn format_date(date: Date) -> String {
    // Formatting a `Date` with a date-only description cannot fail.
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}
