//! Calendar arithmetic for advancing a template's schedule.

use time::{Date, Month};

use crate::recurring::Frequency;

/// Compute the occurrence after `date` for a template firing at `frequency`.
///
/// | frequency | next occurrence |
/// |---|---|
/// | daily | `date` + 1 day |
/// | weekly | `date` + 7 days |
/// | monthly | same day next month, clamped to the last day of that month |
/// | yearly | same day next year, 29 February clamps to 28 February |
/// | custom | `date` + `custom_interval_days` days, or + 1 day if that is absent or not positive |
/// | unrecognized | `date` unchanged |
///
/// If the result would fall outside the range [Date] supports, `date` is returned unchanged.
pub fn next_occurrence(date: Date, frequency: &Frequency, custom_interval_days: Option<i64>) -> Date {
    let next = match frequency {
        Frequency::Daily => add_days(date, 1),
        Frequency::Weekly => add_days(date, 7),
        Frequency::Monthly => add_months(date, 1),
        Frequency::Yearly => add_years(date, 1),
        Frequency::Custom => {
            let days = match custom_interval_days {
                Some(days) if days > 0 => days,
                _ => 1,
            };
            add_days(date, days)
        }
        Frequency::Unrecognized(text) => {
            tracing::warn!("Unrecognized frequency \"{text}\", the schedule will not advance");
            Some(date)
        }
    };

    next.unwrap_or_else(|| {
        tracing::warn!("Could not advance {date} by {frequency}, the date is out of range");
        date
    })
}

/// Add `days` to `date` through its Julian day number.
///
/// Returns `None` if the result does not fit in [Date], including intervals too large for `i32`.
fn add_days(date: Date, days: i64) -> Option<Date> {
    let days = i32::try_from(days).ok()?;
    let julian_day = date.to_julian_day().checked_add(days)?;

    Date::from_julian_day(julian_day).ok()
}

/// Add calendar `months` to `date`, clamping the day to the length of the resulting month.
fn add_months(date: Date, months: u32) -> Option<Date> {
    let month_index = date.month() as i32 - 1 + months as i32;
    let year = date.year().checked_add(month_index.div_euclid(12))?;
    let month = Month::try_from((month_index.rem_euclid(12) + 1) as u8).ok()?;
    let day = date.day().min(month.length(year));

    Date::from_calendar_date(year, month, day).ok()
}

fn add_years(date: Date, years: i32) -> Option<Date> {
    let year = date.year().checked_add(years)?;
    let day = date.day().min(date.month().length(year));

    Date::from_calendar_date(year, date.month(), day).ok()
}
