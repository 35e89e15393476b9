//! Mission Control Schedule - Recurrence Calculator
//!
//! Parses the 5-field `minute hour day-of-month month day-of-week` expressions
//! stored on calendar entries and computes the next instant they fire.
//!
//! Only the subset calendar entries use is interpreted: `minute` and `hour`
//! are exact integers, `day-of-week` is `*` or an integer 0-6 (0 = Sunday).
//! The day-of-month and month fields must be present but are not interpreted.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use mission_core::{Timestamp, ValidationError};
use std::fmt;
use std::str::FromStr;

/// Upper bound on days searched: one week plus DST slack.
const MAX_DAYS_AHEAD: u32 = 14;

/// A parsed recurrence expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceExpr {
    minute: u32,
    hour: u32,
    day_of_week: Option<Weekday>,
    source: String,
}

impl RecurrenceExpr {
    pub fn parse(expr: &str) -> Result<Self, ValidationError> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        let [minute, hour, _day_of_month, _month, day_of_week] = fields.as_slice() else {
            return Err(invalid(
                expr,
                format!("expected 5 fields, found {}", fields.len()),
            ));
        };

        let minute = parse_bounded(expr, "minute", minute, 59)?;
        let hour = parse_bounded(expr, "hour", hour, 23)?;
        let day_of_week = match *day_of_week {
            "*" => None,
            dow => Some(weekday_from_sunday(parse_bounded(expr, "day-of-week", dow, 6)?)),
        };

        Ok(Self {
            minute,
            hour,
            day_of_week,
            source: fields.join(" "),
        })
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// `None` when any day matches.
    pub fn day_of_week(&self) -> Option<Weekday> {
        self.day_of_week
    }

    /// First instant strictly after `now` matching the expression, in `now`'s zone.
    ///
    /// The candidate starts on `now`'s calendar day at `hour:minute:00.000`; if
    /// that is not in the future it moves to the next day, then it advances a
    /// day at a time until the day-of-week matches. A wall time skipped by a
    /// DST transition is treated as not occurring that day.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0)?;
        let tz = now.timezone();
        let mut date: NaiveDate = now.date_naive();

        let today = tz.from_local_datetime(&date.and_time(time)).earliest();
        if today.as_ref().map_or(true, |candidate| candidate <= now) {
            date = date.succ_opt()?;
        }

        for _ in 0..MAX_DAYS_AHEAD {
            let day_matches = self
                .day_of_week
                .map_or(true, |dow| date.weekday() == dow);
            if day_matches {
                if let Some(candidate) = tz.from_local_datetime(&date.and_time(time)).earliest() {
                    if candidate > *now {
                        return Some(candidate);
                    }
                }
            }
            date = date.succ_opt()?;
        }
        None
    }
}

impl FromStr for RecurrenceExpr {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RecurrenceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Time zone in which wall-clock fields of an expression are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleZone {
    #[default]
    Utc,
    /// The host's local zone.
    Local,
}

impl ScheduleZone {
    /// Next occurrence after `now`, returned as a UTC timestamp.
    pub fn next_run(&self, expr: &RecurrenceExpr, now: Timestamp) -> Option<Timestamp> {
        match self {
            ScheduleZone::Utc => expr.next_after(&now),
            ScheduleZone::Local => expr
                .next_after(&now.with_timezone(&Local))
                .map(|t| t.with_timezone(&Utc)),
        }
    }
}

/// Parse `expr` and compute its next occurrence after `now`.
pub fn next_occurrence(
    expr: &str,
    now: Timestamp,
    zone: ScheduleZone,
) -> Result<Timestamp, ValidationError> {
    let parsed = RecurrenceExpr::parse(expr)?;
    zone.next_run(&parsed, now)
        .ok_or_else(|| invalid(expr, "no occurrence within two weeks".to_string()))
}

fn parse_bounded(expr: &str, name: &str, raw: &str, max: u32) -> Result<u32, ValidationError> {
    match raw.parse::<u32>() {
        Ok(value) if value <= max => Ok(value),
        _ => Err(invalid(
            expr,
            format!("{} must be an integer 0-{}, got '{}'", name, max, raw),
        )),
    }
}

fn weekday_from_sunday(day: u32) -> Weekday {
    match day {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

fn invalid(expr: &str, reason: String) -> ValidationError {
    ValidationError::InvalidValue {
        field: "cronExpr".to_string(),
        value: expr.to_string(),
        reason,
    }
}
