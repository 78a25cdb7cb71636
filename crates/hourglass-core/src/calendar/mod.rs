//! Calendar math for recurring progress cycles.
//!
//! Every function here is pure: it takes an [`Anchor`] and the instant to
//! evaluate and returns elapsed/total/fraction for the enclosing period. The
//! time zone of `now` decides where local midnight falls, so callers pass
//! `chrono::Local::now()` in production and a fixed offset in tests.
//!
//! ## Periods
//!
//! ```text
//! Day   [local midnight of now's date, next local midnight)
//! Year  [last anniversary of the anchor's month/day, next anniversary)
//! Life  same as Year, anchored on the date of birth; `completed` is the age
//! ```
//!
//! Periods are half-open: the instant of a boundary belongs to the new period
//! and reports a fraction of 0.0.

mod format;

pub use format::{calendar_diff, format_dhms, format_hms, format_ymdhms};

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeDelta, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Life expectancy used for the lifespan window when none is configured.
pub const DEFAULT_LIFESPAN_YEARS: u32 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cycle {
    Day,
    Year,
    Life,
}

impl Cycle {
    pub const ALL: [Cycle; 3] = [Cycle::Day, Cycle::Year, Cycle::Life];
}

/// Fixed reference date a cycle is measured from.
///
/// Anchors are created once (birth date entered by the user, or the date the
/// process started) and never change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Anchor(NaiveDate);

impl Anchor {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Anchor on the local date of `now`.
    pub fn from_instant<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Self(now.date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// January 1st of the anchor's year, so that the Year cycle follows the
    /// calendar year.
    pub fn start_of_year(&self) -> Self {
        Self(clamp_ymd(self.0.year(), 1, 1))
    }

    /// The anchor's month/day in `year`. Feb 29 becomes Feb 28 in common years.
    pub fn anniversary(&self, year: i32) -> NaiveDate {
        clamp_ymd(year, self.0.month(), self.0.day())
    }
}

/// Progress through one period, evaluated at a single instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodProgress {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub elapsed_secs: i64,
    pub remaining_secs: i64,
    pub total_secs: i64,
    /// 0.0 ..= 1.0
    pub fraction: f64,
    /// Whole periods finished since the anchor (days, years, or age).
    pub completed: u32,
}

impl PeriodProgress {
    fn between<Tz: TimeZone>(
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
        now: &DateTime<Tz>,
        completed: u32,
    ) -> Self {
        let elapsed = now.clone().signed_duration_since(start.clone());
        let total = end.clone().signed_duration_since(start.clone());
        let remaining = end.clone().signed_duration_since(now.clone());
        Self {
            start: start.fixed_offset(),
            end: end.fixed_offset(),
            elapsed_secs: elapsed.num_seconds().clamp(0, total.num_seconds().max(0)),
            remaining_secs: remaining.num_seconds().max(0),
            total_secs: total.num_seconds().max(0),
            fraction: fraction(elapsed, total),
            completed,
        }
    }
}

/// Elapsed/total/fraction of `cycle` at `now`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidAnchor`] when `now` is before local midnight
/// of the anchor date.
pub fn progress<Tz: TimeZone>(cycle: Cycle, anchor: Anchor, now: &DateTime<Tz>) -> Result<PeriodProgress> {
    let tz = now.timezone();
    ensure_after_anchor(&tz, anchor, now)?;

    match cycle {
        Cycle::Day => {
            let today = now.date_naive();
            let start = local_midnight(&tz, today);
            let end = local_midnight(&tz, today.succ_opt().unwrap_or(NaiveDate::MAX));
            let completed = today.signed_duration_since(anchor.date()).num_days().max(0);
            Ok(PeriodProgress::between(&start, &end, now, saturating_u32(completed)))
        }
        Cycle::Year | Cycle::Life => Ok(anniversary_window(&tz, anchor, now)),
    }
}

/// Window from the anchor date to its anniversary `years` later.
///
/// Unlike the recurring cycles this saturates at 1.0 once the end has passed.
///
/// # Errors
///
/// Returns [`CoreError::InvalidAnchor`] when `now` is before the anchor.
pub fn lifespan<Tz: TimeZone>(anchor: Anchor, years: u32, now: &DateTime<Tz>) -> Result<PeriodProgress> {
    let tz = now.timezone();
    ensure_after_anchor(&tz, anchor, now)?;

    let start = local_midnight(&tz, anchor.date());
    let end_year = anchor.date().year().saturating_add(i32::try_from(years).unwrap_or(i32::MAX));
    let end = local_midnight(&tz, anchor.anniversary(end_year));
    let age = anniversary_window(&tz, anchor, now).completed;
    Ok(PeriodProgress::between(&start, &end, now, age))
}

/// Local midnight at the start of `date`.
///
/// Where a DST transition skips midnight the first valid instant of the day
/// is used instead.
pub fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + TimeDelta::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// `year-month-day` with the day clamped to the length of that month.
pub fn clamp_ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.min(last_day_of_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MAX)
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    if month >= 12 {
        return 31;
    }
    NaiveDate::from_ymd_opt(year, month + 1, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

fn anniversary_window<Tz: TimeZone>(tz: &Tz, anchor: Anchor, now: &DateTime<Tz>) -> PeriodProgress {
    let year = now.year();
    let this_year = local_midnight(tz, anchor.anniversary(year));
    let (start, end, start_year) = if *now < this_year {
        (local_midnight(tz, anchor.anniversary(year - 1)), this_year, year - 1)
    } else {
        (this_year, local_midnight(tz, anchor.anniversary(year + 1)), year)
    };
    let completed = i64::from(start_year) - i64::from(anchor.date().year());
    PeriodProgress::between(&start, &end, now, saturating_u32(completed.max(0)))
}

fn ensure_after_anchor<Tz: TimeZone>(tz: &Tz, anchor: Anchor, now: &DateTime<Tz>) -> Result<()> {
    if *now < local_midnight(tz, anchor.date()) {
        return Err(CoreError::InvalidAnchor {
            anchor: anchor.date(),
            now: now.naive_local(),
        });
    }
    Ok(())
}

fn fraction(elapsed: TimeDelta, total: TimeDelta) -> f64 {
    let total_ms = total.num_milliseconds();
    if total_ms <= 0 {
        return 1.0;
    }
    (elapsed.num_milliseconds() as f64 / total_ms as f64).clamp(0.0, 1.0)
}

fn saturating_u32(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(tz: &FixedOffset, s: &str) -> DateTime<FixedOffset> {
        let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        tz.from_local_datetime(&naive).single().unwrap()
    }

    fn plus_two() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    #[test]
    fn day_starts_at_local_midnight() {
        let tz = plus_two();
        let anchor = Anchor::new(date(2026, 1, 1));
        let p = progress(Cycle::Day, anchor, &at(&tz, "2026-10-19 00:00:00")).unwrap();
        assert_eq!(p.fraction, 0.0);
        assert_eq!(p.total_secs, 86_400);
        assert_eq!(p.remaining_secs, 86_400);
        assert_eq!(p.start, at(&tz, "2026-10-19 00:00:00"));
    }

    #[test]
    fn day_approaches_but_never_reaches_one() {
        let tz = plus_two();
        let anchor = Anchor::new(date(2026, 1, 1));
        let p = progress(Cycle::Day, anchor, &at(&tz, "2026-10-19 23:59:59")).unwrap();
        assert!(p.fraction > 0.99 && p.fraction < 1.0);
        assert_eq!(p.remaining_secs, 1);

        let next = progress(Cycle::Day, anchor, &at(&tz, "2026-10-20 00:00:00")).unwrap();
        assert_eq!(next.fraction, 0.0);
    }

    #[test]
    fn day_at_noon_is_half() {
        let tz = plus_two();
        let anchor = Anchor::new(date(2026, 10, 1));
        let p = progress(Cycle::Day, anchor, &at(&tz, "2026-10-19 12:00:00")).unwrap();
        assert!((p.fraction - 0.5).abs() < 1e-9);
        assert_eq!(p.elapsed_secs, 43_200);
        assert_eq!(p.completed, 18);
    }

    #[test]
    fn year_follows_calendar_year_from_start_of_year_anchor() {
        let tz = plus_two();
        let anchor = Anchor::new(date(2026, 6, 15)).start_of_year();
        let p = progress(Cycle::Year, anchor, &at(&tz, "2026-07-02 12:00:00")).unwrap();
        assert_eq!(p.start, at(&tz, "2026-01-01 00:00:00"));
        assert_eq!(p.end, at(&tz, "2027-01-01 00:00:00"));
        assert_eq!(p.total_secs, 365 * 86_400);
    }

    #[test]
    fn year_boundary_belongs_to_new_period() {
        let tz = plus_two();
        let anchor = Anchor::new(date(2020, 1, 1));
        let p = progress(Cycle::Year, anchor, &at(&tz, "2027-01-01 00:00:00")).unwrap();
        assert_eq!(p.fraction, 0.0);
        assert_eq!(p.completed, 7);
    }

    #[test]
    fn leap_anchor_clamps_to_feb_28_in_common_years() {
        let anchor = Anchor::new(date(2000, 2, 29));
        assert_eq!(anchor.anniversary(2025), date(2025, 2, 28));
        assert_eq!(anchor.anniversary(2028), date(2028, 2, 29));
    }

    #[test]
    fn life_window_uses_clamped_birthday() {
        let tz = plus_two();
        let anchor = Anchor::new(date(2000, 2, 29));

        let before = progress(Cycle::Life, anchor, &at(&tz, "2025-02-27 12:00:00")).unwrap();
        assert_eq!(before.start, at(&tz, "2024-02-29 00:00:00"));
        assert_eq!(before.end, at(&tz, "2025-02-28 00:00:00"));
        assert_eq!(before.completed, 24);

        let birthday = progress(Cycle::Life, anchor, &at(&tz, "2025-02-28 00:00:00")).unwrap();
        assert_eq!(birthday.fraction, 0.0);
        assert_eq!(birthday.completed, 25);
        assert_eq!(birthday.end, at(&tz, "2026-02-28 00:00:00"));
    }

    #[test]
    fn now_before_anchor_is_rejected() {
        let tz = plus_two();
        let anchor = Anchor::new(date(2030, 1, 1));
        let err = progress(Cycle::Life, anchor, &at(&tz, "2026-10-19 12:00:00")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAnchor { .. }));
    }

    #[test]
    fn anchor_day_itself_is_valid() {
        let tz = plus_two();
        let anchor = Anchor::new(date(2026, 10, 19));
        let p = progress(Cycle::Life, anchor, &at(&tz, "2026-10-19 00:00:00")).unwrap();
        assert_eq!(p.fraction, 0.0);
        assert_eq!(p.completed, 0);
    }

    #[test]
    fn lifespan_saturates_after_end() {
        let now = Utc::now();
        let anchor = Anchor::new(now.date_naive() - Duration::days(366 * 3));
        let p = lifespan(anchor, 1, &now).unwrap();
        assert_eq!(p.fraction, 1.0);
        assert_eq!(p.remaining_secs, 0);
    }

    #[test]
    fn lifespan_reports_age() {
        let tz = plus_two();
        let anchor = Anchor::new(date(1990, 5, 20));
        let p = lifespan(anchor, DEFAULT_LIFESPAN_YEARS, &at(&tz, "2026-10-19 08:00:00")).unwrap();
        assert_eq!(p.completed, 36);
        assert_eq!(p.end, at(&tz, "2075-05-20 00:00:00"));
        assert!(p.fraction > 0.4 && p.fraction < 0.5);
    }

    #[test]
    fn huge_lifespan_with_december_birthday_stays_finite() {
        let tz = plus_two();
        let anchor = Anchor::new(date(1990, 12, 5));
        let p = lifespan(anchor, u32::MAX, &at(&tz, "2026-10-19 08:00:00")).unwrap();
        assert_eq!(p.completed, 35);
        assert!(p.fraction >= 0.0 && p.fraction < 1e-3);
        assert!(p.remaining_secs > 0);
    }

    #[test]
    fn clamp_ymd_handles_short_months() {
        assert_eq!(clamp_ymd(2026, 4, 31), date(2026, 4, 30));
        assert_eq!(clamp_ymd(2026, 12, 31), date(2026, 12, 31));
        assert_eq!(clamp_ymd(i32::MAX, 12, 5), NaiveDate::MAX);
    }
}
