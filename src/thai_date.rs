//! Buddhist-era date handling.
//!
//! Records carry timestamps like `"02/01/2567 10:00"`: day, month and a year that runs
//! [`ERA_OFFSET`] ahead of the Gregorian year, followed by a time of day we ignore.

use crate::error::DashError;
use crate::models::DateRange;
use chrono::{Datelike, Days, NaiveDate};

/// Buddhist era year minus Gregorian year.
pub const ERA_OFFSET: i64 = 543;

/// First Gregorian year treated as a likely Buddhist-era slip in ISO input.
pub const BUDDHIST_ERA_HINT: i32 = 2400;

/// Whether an ISO-entered date carries a year that reads like the Buddhist era.
pub fn looks_buddhist_era(date: NaiveDate) -> bool {
    date.year() >= BUDDHIST_ERA_HINT
}

/// Outcome of parsing a non-empty timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Valid(NaiveDate),
    /// Non-numeric or out-of-range components. Compares false against every bound.
    Invalid,
}

impl ParsedDate {
    pub fn valid(self) -> Option<NaiveDate> {
        match self {
            ParsedDate::Valid(d) => Some(d),
            ParsedDate::Invalid => None,
        }
    }

    /// Inclusive containment. An invalid date is never inside any range, and an
    /// inverted range (`start > end`) contains nothing.
    pub fn within(self, range: &DateRange) -> bool {
        match self {
            ParsedDate::Valid(d) => d >= range.start && d <= range.end,
            ParsedDate::Invalid => false,
        }
    }
}

/// Parse `"DD/MM/YYYY[ HH:MM...]"` into a calendar date.
///
/// Returns `None` for empty input. Components are read like a lenient integer parse
/// (leading whitespace, optional sign, leading digits); a component without digits makes
/// the whole date [`ParsedDate::Invalid`]. Day and month overflow roll into the next
/// month or year, so `32/01/2567` is 1 February 2024.
pub fn parse_thai_date(s: &str) -> Option<ParsedDate> {
    if s.is_empty() {
        return None;
    }
    let date_part = s.split_once(' ').map_or(s, |(d, _)| d);
    let mut parts = date_part.split('/');
    let day = parts.next().and_then(leading_int);
    let month = parts.next().and_then(leading_int);
    let year = parts.next().and_then(leading_int);

    let parsed = match (day, month, year) {
        (Some(d), Some(m), Some(y)) => y
            .checked_sub(ERA_OFFSET)
            .and_then(|gy| normalized_date(gy, m, d))
            .map_or(ParsedDate::Invalid, ParsedDate::Valid),
        _ => ParsedDate::Invalid,
    };
    Some(parsed)
}

/// Render a Gregorian date the way records spell it: `DD/MM/YYYY` in the Buddhist era.
pub fn format_thai_date(date: NaiveDate) -> String {
    format!(
        "{:02}/{:02}/{}",
        date.day(),
        date.month(),
        i64::from(date.year()) + ERA_OFFSET
    )
}

/// Parse a user-supplied bound: ISO `YYYY-MM-DD` (Gregorian only) or `DD/MM/YYYY`
/// (Buddhist era). An ISO year from [`BUDDHIST_ERA_HINT`] on is still read as Gregorian, with
/// a warning, since it most likely meant the Buddhist era.
pub fn parse_date_input(s: &str) -> Result<NaiveDate, DashError> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if looks_buddhist_era(d) {
            log::warn!(
                "{}: ISO dates are Gregorian; year {} looks like Buddhist era (use DD/MM/YYYY or {}-{:02}-{:02})",
                s,
                d.year(),
                i64::from(d.year()) - ERA_OFFSET,
                d.month(),
                d.day()
            );
        }
        return Ok(d);
    }
    parse_thai_date(s)
        .and_then(ParsedDate::valid)
        .ok_or_else(|| DashError::InvalidDate(s.to_string()))
}

/// Build (year, month 1-based, day) with calendar rollover in both directions.
fn normalized_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    let total_months = year.checked_mul(12)?.checked_add(month.checked_sub(1)?)?;
    let y = i32::try_from(total_months.div_euclid(12)).ok()?;
    let m = u32::try_from(total_months.rem_euclid(12) + 1).ok()?;
    let first = NaiveDate::from_ymd_opt(y, m, 1)?;
    let offset = day.checked_sub(1)?;
    if offset >= 0 {
        first.checked_add_days(Days::new(offset.unsigned_abs()))
    } else {
        first.checked_sub_days(Days::new(offset.unsigned_abs()))
    }
}

/// Leading integer of `s`, or `None` when no digit follows the optional sign.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        value = value.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
    }
    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}
