//! Property tests for the calendar windows and the timer state machine.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use hourglass_core::calendar::{self, Anchor, Cycle};
use hourglass_core::{Timer, TimerConfig, TimerKind, TimerStatus};
use proptest::prelude::*;

fn arb_offset() -> impl Strategy<Value = FixedOffset> {
    (-12i32..=14).prop_map(|h| FixedOffset::east_opt(h * 3600).unwrap())
}

/// Instants between 2000-01-01 and roughly 2060, in seconds from the epoch.
fn arb_instant() -> impl Strategy<Value = i64> {
    946_684_800i64..2_840_000_000i64
}

fn arb_birth_date() -> impl Strategy<Value = NaiveDate> {
    (1900i32..2000, 1u32..=12, 1u32..=31).prop_map(|(y, m, d)| calendar::clamp_ymd(y, m, d))
}

fn at(tz: FixedOffset, secs: i64) -> DateTime<FixedOffset> {
    Utc.timestamp_opt(secs, 0).unwrap().with_timezone(&tz)
}

proptest! {
    // =================================================================
    // Calendar windows
    // =================================================================

    #[test]
    fn fractions_stay_in_unit_interval(
        tz in arb_offset(),
        secs in arb_instant(),
        dob in arb_birth_date(),
    ) {
        let now = at(tz, secs);
        let anchor = Anchor::new(dob);
        for cycle in Cycle::ALL {
            let p = calendar::progress(cycle, anchor, &now).unwrap();
            prop_assert!((0.0..1.0).contains(&p.fraction));
            prop_assert!(p.start <= now && now < p.end);
            prop_assert_eq!(p.elapsed_secs + p.remaining_secs, p.total_secs);
        }
        let life = calendar::lifespan(anchor, 85, &now).unwrap();
        prop_assert!((0.0..=1.0).contains(&life.fraction));
    }

    #[test]
    fn fraction_is_monotonic_within_a_period(
        tz in arb_offset(),
        secs in arb_instant(),
        step in 0i64..86_400,
        dob in arb_birth_date(),
    ) {
        let anchor = Anchor::new(dob);
        let earlier = at(tz, secs);
        let later = at(tz, secs + step);
        for cycle in Cycle::ALL {
            let a = calendar::progress(cycle, anchor, &earlier).unwrap();
            let b = calendar::progress(cycle, anchor, &later).unwrap();
            if a.start == b.start {
                prop_assert!(a.fraction <= b.fraction);
            } else {
                // A boundary was crossed: the new period starts where the old ended.
                prop_assert!(b.start >= a.end);
            }
        }
    }

    // =================================================================
    // Timer
    // =================================================================

    #[test]
    fn countdown_ticks_are_path_independent(
        duration in 1u64..100_000,
        steps in proptest::collection::vec(0i64..5_000, 1..20),
    ) {
        let t0 = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
        let mut timer = Timer::new(TimerKind::Countdown);
        timer.configure(TimerConfig::Countdown { duration_secs: duration }, t0);
        timer.start(t0).unwrap();

        let mut now = t0;
        let mut previous = timer.remaining_ms();
        for step in &steps {
            now += Duration::milliseconds(*step);
            timer.tick(now);
            prop_assert!(timer.remaining_ms() <= previous);
            previous = timer.remaining_ms();
        }

        let elapsed: u64 = steps.iter().map(|s| *s as u64).sum();
        let expected = (duration * 1000).saturating_sub(elapsed);
        prop_assert_eq!(timer.remaining_ms(), expected);
        prop_assert_eq!(timer.status() == TimerStatus::Done, expected == 0);
        prop_assert!((0.0..=1.0).contains(&timer.fraction()));
    }
}
