//! Text rows shared by the headless snapshot and the dashboard.

use hourglass_core::calendar::{format_dhms, format_hms, format_ymdhms};
use hourglass_core::{ProgressSnapshot, TimerSnapshot, TimerStatus};

/// One tracked interval, ready to print or draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub label: &'static str,
    pub fraction: f64,
    pub remaining: String,
    /// Trailing note such as the age or a paused timer.
    pub note: Option<String>,
    /// Finished timer; the dashboard flashes its border.
    pub done: bool,
}

impl Row {
    pub fn percent(&self) -> String {
        format!("{:5.1}%", self.fraction * 100.0)
    }

    pub fn line(&self) -> String {
        let mut line = format!("{:<4} done: {}  remaining: {}", self.label, self.percent(), self.remaining);
        if let Some(note) = &self.note {
            line.push_str("  ");
            line.push_str(note);
        }
        line
    }
}

/// `now: ... | day xx.x% | year xx.x% | life xx.x%`
pub fn header(snapshot: &ProgressSnapshot) -> String {
    let life = match &snapshot.life {
        Some(life) => format!("{:5.1}%", life.birthday.fraction * 100.0),
        None => "  --".to_string(),
    };
    format!(
        "now: {} | day {:5.1}% | year {:5.1}% | life {life}",
        snapshot.at.format("%Y-%m-%d %H:%M:%S"),
        snapshot.day.fraction * 100.0,
        snapshot.year.fraction * 100.0,
    )
}

/// DAY, YEAR, LIFE (once a birth date is set), then configured timers.
pub fn rows(snapshot: &ProgressSnapshot) -> Vec<Row> {
    let mut rows = vec![
        Row {
            label: "DAY",
            fraction: snapshot.day.fraction,
            remaining: format_hms(snapshot.day.remaining_secs),
            note: None,
            done: false,
        },
        Row {
            label: "YEAR",
            fraction: snapshot.year.fraction,
            remaining: format_dhms(snapshot.year.remaining_secs),
            note: None,
            done: false,
        },
    ];
    if let Some(life) = &snapshot.life {
        let lifespan_left = format_ymdhms(snapshot.at.naive_local(), life.lifespan.end.naive_local());
        rows.push(Row {
            label: "LIFE",
            fraction: life.birthday.fraction,
            remaining: format_dhms(life.birthday.remaining_secs),
            note: Some(format!(
                "age: {}  lifespan {}y: {:.1}% ({lifespan_left} left)",
                life.birthday.completed,
                life.lifespan_years,
                life.lifespan.fraction * 100.0,
            )),
            done: false,
        });
    }
    rows.extend(snapshot.timers().map(timer_row));
    rows
}

/// Plain-text snapshot, one line per tracked interval.
pub fn lines(snapshot: &ProgressSnapshot) -> Vec<String> {
    let mut lines = vec![format!("now: {}", snapshot.at.format("%Y-%m-%d %H:%M:%S"))];
    let rows = rows(snapshot);
    lines.extend(rows.iter().take(2).map(Row::line));
    if snapshot.life.is_none() {
        lines.push("LIFE not configured (set it with `hourglass dob YYYY-MM-DD`)".to_string());
    }
    lines.extend(rows.iter().skip(2).map(Row::line));
    lines
}

fn timer_row(timer: &TimerSnapshot) -> Row {
    let remaining = if timer.done {
        "DONE".to_string()
    } else if timer.remaining_secs() >= 86_400 {
        format_dhms(timer.remaining_secs())
    } else {
        format_hms(timer.remaining_secs())
    };
    let note = match timer.status {
        TimerStatus::Paused | TimerStatus::Stopped => Some(format!("({})", timer.status)),
        TimerStatus::Running | TimerStatus::Done => None,
    };
    Row {
        label: timer.kind.label(),
        fraction: timer.fraction,
        remaining,
        note,
        done: timer.done,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, NaiveDate, TimeZone};
    use hourglass_core::{MemoryStore, ProgressEngine, TimerKind};

    fn engine_at(now: &chrono::DateTime<FixedOffset>) -> ProgressEngine<MemoryStore> {
        ProgressEngine::open(MemoryStore::new(), now)
    }

    fn noon() -> chrono::DateTime<FixedOffset> {
        FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    #[test]
    fn lines_without_birth_date_or_timers() {
        let mut engine = engine_at(&noon());
        let snapshot = engine.snapshot(&noon()).unwrap();
        let lines = lines(&snapshot);
        assert_eq!(lines[0], "now: 2026-10-19 12:00:00");
        assert_eq!(lines[1], "DAY  done:  50.0%  remaining: 12:00:00");
        assert!(lines[2].starts_with("YEAR done: "));
        assert!(lines[3].starts_with("LIFE not configured"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn timer_lines_follow_cycles() {
        let mut engine = engine_at(&noon());
        engine
            .set_birth_date(NaiveDate::from_ymd_opt(1990, 5, 20).unwrap(), &noon())
            .unwrap();
        engine.configure_countdown(90, &noon());
        engine.start(TimerKind::Countdown, &noon()).unwrap();
        engine.configure_deadline(&(noon() + Duration::minutes(30)), &noon());
        engine.start(TimerKind::Deadline, &noon()).unwrap();

        let snapshot = engine.snapshot(&(noon() + Duration::seconds(90))).unwrap();
        let lines = lines(&snapshot);
        assert!(lines[3].starts_with("LIFE done: "));
        assert!(lines[3].contains("age: 36  lifespan 85y: "));
        assert_eq!(lines[4], "COUNTDOWN done: 100.0%  remaining: DONE");
        assert_eq!(lines[5], "DEADLINE done:   5.0%  remaining: 00:28:30");
    }

    #[test]
    fn paused_timer_is_marked() {
        let mut engine = engine_at(&noon());
        engine.configure_countdown(3600, &noon());
        let snapshot = engine.snapshot(&noon()).unwrap();
        let row = rows(&snapshot).pop().unwrap();
        assert_eq!(row.line(), "COUNTDOWN done:   0.0%  remaining: 01:00:00  (stopped)");
    }

    #[test]
    fn header_shows_placeholder_without_life() {
        let mut engine = engine_at(&noon());
        let snapshot = engine.snapshot(&noon()).unwrap();
        assert!(header(&snapshot).ends_with("| life   --"));
    }
}
