//! Date resolution for placeholder tokens
//!
//! The reference instant is always an explicit argument. Only the binary
//! reads the clock, once, through [`reference_now`].

use jiff::civil::{Date, DateTime};
use jiff::tz::{Offset, TimeZone};
use jiff::{Span, Timestamp, Zoned};

use crate::error::{Error, Result};
use crate::token::{Token, TokenKind};

/// strftime pattern for `{DATEID}`
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// strftime pattern for `{DATETIMEID}`
pub const DATETIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Compute the string that replaces `token`, relative to `reference`
///
/// Offsets are added to the civil (wall clock) date-time of `reference`, so
/// the time of day is preserved across month, year and DST boundaries.
pub fn resolve(token: &Token, reference: &Zoned) -> Result<String> {
    let shifted = shift_days(reference.datetime(), token.offset_days)?;
    let format = match token.kind {
        TokenKind::DateId => DATE_FORMAT,
        TokenKind::DateTimeId => DATETIME_FORMAT,
    };
    Ok(shifted.strftime(format).to_string())
}

fn shift_days(dt: DateTime, days: i64) -> Result<DateTime> {
    if days == 0 {
        return Ok(dt);
    }
    Span::new()
        .try_days(days)
        .and_then(|span| dt.checked_add(span))
        .map_err(|e| Error::DateOutOfRange(format!("{dt} {days:+} days: {e}")))
}

/// Look up a time zone by IANA name or fixed offset (`+05:30`, `-5`)
///
/// `UTC` and fixed offsets never touch the tz database.
pub fn parse_timezone(name: &str) -> Result<TimeZone> {
    if name.eq_ignore_ascii_case("utc") || name == "Z" {
        return Ok(TimeZone::UTC);
    }
    if let Some(offset) = parse_fixed_offset(name) {
        return Ok(TimeZone::fixed(offset));
    }
    TimeZone::get(name).map_err(|e| Error::Config(format!("Unknown time zone '{name}': {e}")))
}

fn parse_fixed_offset(name: &str) -> Option<Offset> {
    let (sign, rest) = match name.as_bytes().first()? {
        b'+' => (1, &name[1..]),
        b'-' => (-1, &name[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let digits = |s: &str| !s.is_empty() && s.len() <= 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(hours) || !digits(minutes) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes > 59 {
        return None;
    }
    Offset::from_seconds(sign * (hours * 3600 + minutes * 60)).ok()
}

/// Parse a user-supplied reference instant
///
/// Accepts an RFC 3339 timestamp (`2024-03-01T00:00:00Z`), a civil date-time
/// (`2024-03-01T10:30:00`) or a civil date (`2024-03-01`, midnight). Civil
/// forms are interpreted in `tz`.
pub fn parse_reference(text: &str, tz: &TimeZone) -> Result<Zoned> {
    let text = text.trim();
    if let Ok(ts) = text.parse::<Timestamp>() {
        return Ok(ts.to_zoned(tz.clone()));
    }

    let civil = match text.parse::<DateTime>() {
        Ok(dt) => dt,
        Err(_) => text
            .parse::<Date>()
            .map(|d| d.at(0, 0, 0, 0))
            .map_err(|e| Error::Config(format!("Invalid reference instant '{text}': {e}")))?,
    };

    civil
        .to_zoned(tz.clone())
        .map_err(|e| Error::Config(format!("Invalid reference instant '{text}': {e}")))
}

/// The current instant in `tz`
pub fn reference_now(tz: &TimeZone) -> Zoned {
    Timestamp::now().to_zoned(tz.clone())
}
