//! Human-readable remaining/elapsed durations.

use chrono::{Datelike, NaiveDateTime};

use super::clamp_ymd;

/// `HH:MM:SS`; hours are not wrapped at 24.
pub fn format_hms(secs: i64) -> String {
    let total = secs.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// `Nd HH:MM:SS`
pub fn format_dhms(secs: i64) -> String {
    let total = secs.max(0);
    let days = total / 86_400;
    format!("{days}d {}", format_hms(total % 86_400))
}

/// `Ny Nm Nd HH:MM:SS` between two local date-times.
pub fn format_ymdhms(start: NaiveDateTime, end: NaiveDateTime) -> String {
    let (years, months, days, hours, minutes, seconds) = calendar_diff(start, end);
    format!("{years}y {months}m {days}d {hours:02}:{minutes:02}:{seconds:02}")
}

/// Calendar difference as (years, months, days, hours, minutes, seconds).
///
/// Whole years and months are stepped forward from `start` with the day of
/// month clamped, so Jan 31 + 1 month lands on the last day of February.
/// Returns all zeros when `end <= start`.
pub fn calendar_diff(start: NaiveDateTime, end: NaiveDateTime) -> (i64, i64, i64, i64, i64, i64) {
    if end <= start {
        return (0, 0, 0, 0, 0, 0);
    }

    let mut years = end.year() - start.year();
    let mut candidate = add_months(start, years * 12);
    if candidate > end {
        years -= 1;
        candidate = add_months(start, years * 12);
    }

    let mut months = end.month() as i32 - candidate.month() as i32;
    if months < 0 {
        months += 12;
    }
    let mut stepped = add_months(candidate, months);
    if stepped > end {
        months -= 1;
        stepped = add_months(candidate, months);
    }

    let delta = end - stepped;
    let days = delta.num_days();
    let rest = delta.num_seconds() - days * 86_400;
    (
        i64::from(years),
        i64::from(months),
        days,
        rest / 3600,
        (rest % 3600) / 60,
        rest % 60,
    )
}

fn add_months(dt: NaiveDateTime, months: i32) -> NaiveDateTime {
    let total = dt.month0() as i32 + months;
    let year = dt.year() + total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    clamp_ymd(year, month, dt.day()).and_time(dt.time())
}
