//! Parsing of user-entered durations, deadlines and dates.
//!
//! Entry is digit-oriented: everything that is not an ASCII digit is dropped
//! first, so `01:30:00`, `013000` and `01 30 00` all mean the same.

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::error::ParseError;

/// Digits needed for a countdown (`HHMMSS`).
pub const COUNTDOWN_DIGITS: usize = 6;
/// Digits needed for a deadline (`YYYYMMDDHHMM`).
pub const DEADLINE_DIGITS: usize = 12;

pub fn digits_only(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// Countdown length in seconds from `HHMMSS`.
///
/// # Errors
///
/// Wrong digit count, minutes/seconds above 59, or a zero duration.
pub fn parse_countdown(input: &str) -> Result<u64, ParseError> {
    let digits = digits_only(input);
    if digits.len() != COUNTDOWN_DIGITS {
        return Err(ParseError::DurationDigits { input: input.to_string() });
    }
    let hours = number(&digits[0..2]);
    let minutes = number(&digits[2..4]);
    let seconds = number(&digits[4..6]);
    if minutes > 59 || seconds > 59 {
        return Err(ParseError::DurationRange { input: input.to_string() });
    }
    let total = hours * 3600 + minutes * 60 + seconds;
    if total < 1 {
        return Err(ParseError::DurationTooShort);
    }
    Ok(total)
}

/// Deadline instant from `YYYYMMDDHHMM`, read as wall-clock time in `tz`.
///
/// # Errors
///
/// Wrong digit count, or a date/time that does not exist in `tz`.
pub fn parse_deadline<Tz: TimeZone>(input: &str, tz: &Tz) -> Result<DateTime<Tz>, ParseError> {
    let digits = digits_only(input);
    if digits.len() != DEADLINE_DIGITS {
        return Err(ParseError::DeadlineDigits { input: input.to_string() });
    }
    let invalid = || ParseError::InvalidDateTime { input: input.to_string() };
    let year = i32::try_from(number(&digits[0..4])).map_err(|_| invalid())?;
    let date = NaiveDate::from_ymd_opt(year, number_u32(&digits[4..6]), number_u32(&digits[6..8]))
        .ok_or_else(invalid)?;
    let naive = date
        .and_hms_opt(number_u32(&digits[8..10]), number_u32(&digits[10..12]), 0)
        .ok_or_else(invalid)?;
    tz.from_local_datetime(&naive).earliest().ok_or_else(invalid)
}

/// `YYYY-MM-DD`
///
/// # Errors
///
/// Anything chrono does not accept as that format.
pub fn parse_date(input: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| ParseError::InvalidDate { input: input.to_string() })
}

/// `12:3_:__` style mask of partially entered countdown digits.
pub fn countdown_mask(digits: &str) -> String {
    let s = slots::<COUNTDOWN_DIGITS>(digits);
    format!("{}{}:{}{}:{}{}", s[0], s[1], s[2], s[3], s[4], s[5])
}

/// `2026-1_-__ __:__` style mask of partially entered deadline digits.
pub fn deadline_mask(digits: &str) -> String {
    let s = slots::<DEADLINE_DIGITS>(digits);
    format!(
        "{}{}{}{}-{}{}-{}{} {}{}:{}{}",
        s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7], s[8], s[9], s[10], s[11]
    )
}

fn slots<const N: usize>(digits: &str) -> [char; N] {
    let mut slots = ['_'; N];
    for (slot, ch) in slots.iter_mut().zip(digits.chars()) {
        *slot = ch;
    }
    slots
}

// Callers have already reduced the text to ASCII digits.
fn number(digits: &str) -> u64 {
    digits.parse().unwrap_or(0)
}

fn number_u32(digits: &str) -> u32 {
    digits.parse().unwrap_or(0)
}
