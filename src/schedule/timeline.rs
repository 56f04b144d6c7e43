//! Status re-evaluated on a fixed cadence.

use chrono::{DateTime, Utc};

use super::calendar::Calendar;
use super::clock::Ticker;
use super::period::Period;
use super::status::{PeakStatus, status_at};

/// Status observed at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineEntry {
    pub at: DateTime<Utc>,
    pub status: PeakStatus,
}

/// Evaluates the status at every tick of `ticker`.
pub fn status_timeline(periods: &[Period], calendar: &Calendar, mut ticker: Ticker) -> Vec<TimelineEntry> {
    let mut entries = Vec::new();
    ticker.run(|at| {
        entries.push(TimelineEntry {
            at,
            status: status_at(periods, at, calendar),
        });
    });
    entries
}

/// Instants at which the status flips between peak and off-peak.
pub fn transitions(entries: &[TimelineEntry]) -> Vec<DateTime<Utc>> {
    entries
        .windows(2)
        .filter(|pair| pair[0].status.is_off_peak() != pair[1].status.is_off_peak())
        .map(|pair| pair[1].at)
        .collect()
}
