//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};

use offpeak_planner::schedule::{Calendar, Period, PeriodId};

/// Parses an RFC 3339 instant into UTC.
pub fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid RFC 3339 instant")
        .with_timezone(&Utc)
}

/// Instant `secs` seconds after the Unix epoch.
pub fn epoch_plus(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).expect("instant in range")
}

/// Night (23:00-07:00) and midday (12:00-14:00) periods.
pub fn baseline_periods() -> Vec<Period> {
    vec![
        Period::new(PeriodId(1), 23, 0, 7, 0).unwrap(),
        Period::new(PeriodId(2), 12, 0, 14, 0).unwrap(),
    ]
}

/// Early-morning (02:02-08:02) and mid-afternoon (15:02-17:02) periods.
pub fn split_periods() -> Vec<Period> {
    vec![
        Period::new(PeriodId(1), 2, 2, 8, 2).unwrap(),
        Period::new(PeriodId(2), 15, 2, 17, 2).unwrap(),
    ]
}

pub fn utc() -> Calendar {
    Calendar::utc()
}

pub fn paris() -> Calendar {
    Calendar::from_name("Europe/Paris").unwrap()
}
