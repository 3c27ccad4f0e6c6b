use std::fmt;
use thiserror::Error;
use time::{Date, Duration, Month, OffsetDateTime, UtcOffset};

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub(crate) enum InvalidDateError {
    #[error("month number {0} is not between 1 and 12")]
    Month(u8),
    #[error("{month} {year} is outside the supported calendar range")]
    OutOfRange { month: Month, year: i32 },
}

/// The rules that map moments to local time
pub(crate) trait TimeZone: fmt::Debug {
    /// Returns the UTC offset of local time at `moment`
    fn offset_at(&self, moment: OffsetDateTime) -> UtcOffset;
}

/// A zone that never changes its offset
impl TimeZone for UtcOffset {
    fn offset_at(&self, _moment: OffsetDateTime) -> UtcOffset {
        *self
    }
}

/// The system's time zone, daylight saving included.  Moments whose offset
/// the system can't report use `fallback`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct LocalZone {
    fallback: UtcOffset,
}

impl LocalZone {
    pub(crate) fn new(fallback: UtcOffset) -> LocalZone {
        LocalZone { fallback }
    }
}

impl TimeZone for LocalZone {
    fn offset_at(&self, moment: OffsetDateTime) -> UtcOffset {
        UtcOffset::local_offset_at(moment).unwrap_or(self.fallback)
    }
}

/// Returns the first and last second of the given month in local time.  The
/// first is midnight on day 1; the last is one second before midnight on the
/// first day of the following month.  Each carries the offset in effect at
/// that moment.
pub(crate) fn month_bounds(
    month: u8,
    year: i32,
    zone: &dyn TimeZone,
) -> Result<(OffsetDateTime, OffsetDateTime), InvalidDateError> {
    let month = Month::try_from(month).map_err(|_| InvalidDateError::Month(month))?;
    let out_of_range = || InvalidDateError::OutOfRange { month, year };
    let day1 = Date::from_calendar_date(year, month, 1).map_err(|_| out_of_range())?;
    let next_day1 = day1
        .checked_add(Duration::days(days_in_month(day1).into()))
        .ok_or_else(out_of_range)?;
    let first = local_midnight(day1, zone).ok_or_else(out_of_range)?;
    let last = local_midnight(next_day1, zone)
        .and_then(|t| t.checked_sub(Duration::SECOND))
        .and_then(|t| to_local(t, zone))
        .ok_or_else(out_of_range)?;
    Ok((first, last))
}

/// Returns the month & year containing the second after `last`
pub(crate) fn next_month_of(last: OffsetDateTime) -> Result<(Month, i32), InvalidDateError> {
    let next = last
        .checked_add(Duration::SECOND)
        .ok_or(InvalidDateError::OutOfRange {
            month: last.month(),
            year: last.year(),
        })?;
    Ok((next.month(), next.year()))
}

/// Returns the month & year containing the second before `first`
pub(crate) fn previous_month_of(first: OffsetDateTime) -> Result<(Month, i32), InvalidDateError> {
    let prev = first
        .checked_sub(Duration::SECOND)
        .ok_or(InvalidDateError::OutOfRange {
            month: first.month(),
            year: first.year(),
        })?;
    Ok((prev.month(), prev.year()))
}

/// Local midnight at the start of `date`
pub(crate) fn local_midnight(date: Date, zone: &dyn TimeZone) -> Option<OffsetDateTime> {
    let naive = date.midnight();
    // Guess with the offset at that wall time read as UTC, then settle on the
    // offset in effect at the guessed moment
    let guess = naive.assume_offset(zone.offset_at(naive.assume_utc()));
    let moment = naive.assume_offset(zone.offset_at(guess));
    to_local(moment, zone)
}

/// Converts whole seconds since the epoch to local time.  Returns `None` if
/// the result is not a representable date.
pub(crate) fn from_timestamp(seconds: i64, zone: &dyn TimeZone) -> Option<OffsetDateTime> {
    to_local(OffsetDateTime::from_unix_timestamp(seconds).ok()?, zone)
}

fn to_local(moment: OffsetDateTime, zone: &dyn TimeZone) -> Option<OffsetDateTime> {
    moment.checked_to_offset(zone.offset_at(moment))
}

fn days_in_month(day1: Date) -> u8 {
    (29..=31)
        .rev()
        .find(|&day| day1.replace_day(day).is_ok())
        .unwrap_or(28)
}
