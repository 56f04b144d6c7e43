//! Recurring daily off-peak periods.

use std::fmt;
use std::ops::Range;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Stable identifier of a [`Period`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodId(pub u64);

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A recurring daily off-peak window expressed in wall-clock time.
///
/// When the end is not after the start (by minute of day) the window crosses
/// midnight. A start equal to the end describes a full day.
///
/// # Examples
///
/// ```
/// use offpeak_planner::schedule::period::{Period, PeriodId};
///
/// let night = Period::new(PeriodId(1), 23, 0, 1, 0).unwrap();
/// assert!(night.crosses_midnight());
/// assert_eq!(night.minute_ranges(), vec![-60..60, 1380..1500]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    id: PeriodId,
    start_hour: u32,
    start_minute: u32,
    end_hour: u32,
    end_minute: u32,
}

impl Period {
    /// Creates a period from its wall-clock bounds.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::InvalidPeriod` if an hour is outside 0–23 or a
    /// minute outside 0–59.
    pub fn new(
        id: PeriodId,
        start_hour: u32,
        start_minute: u32,
        end_hour: u32,
        end_minute: u32,
    ) -> Result<Self> {
        check_bound(id, "start_hour", start_hour, 23)?;
        check_bound(id, "start_minute", start_minute, 59)?;
        check_bound(id, "end_hour", end_hour, 23)?;
        check_bound(id, "end_minute", end_minute, 59)?;
        Ok(Self {
            id,
            start_hour,
            start_minute,
            end_hour,
            end_minute,
        })
    }

    pub fn id(&self) -> PeriodId {
        self.id
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn start_minute(&self) -> u32 {
        self.start_minute
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    pub fn end_minute(&self) -> u32 {
        self.end_minute
    }

    /// Start as minutes since midnight.
    pub fn start_minute_of_day(&self) -> i32 {
        minute_of_day(self.start_hour, self.start_minute)
    }

    /// End as minutes since midnight.
    pub fn end_minute_of_day(&self) -> i32 {
        minute_of_day(self.end_hour, self.end_minute)
    }

    /// Returns `true` when the window runs past midnight.
    pub fn crosses_midnight(&self) -> bool {
        self.end_minute_of_day() <= self.start_minute_of_day()
    }

    /// Half-open minute-of-day ranges covered by this period.
    ///
    /// A period within a single day yields one range. A midnight-crossing
    /// period yields two: one starting at a negative minute (the tail that
    /// began the previous day) and one ending past `MINUTES_PER_DAY`.
    pub fn minute_ranges(&self) -> Vec<Range<i32>> {
        let start = self.start_minute_of_day();
        let end = self.end_minute_of_day();
        if self.crosses_midnight() {
            vec![start - MINUTES_PER_DAY..end, start..end + MINUTES_PER_DAY]
        } else {
            vec![start..end]
        }
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        let start = self.start_minute_of_day();
        let mut end = self.end_minute_of_day();
        if self.crosses_midnight() {
            end += MINUTES_PER_DAY;
        }
        Duration::minutes(i64::from(end - start))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}:{:02}-{:02}:{:02}",
            self.id, self.start_hour, self.start_minute, self.end_hour, self.end_minute
        )
    }
}

fn minute_of_day(hour: u32, minute: u32) -> i32 {
    // Bounded by construction: hour <= 23, minute <= 59.
    (hour * 60 + minute) as i32
}

fn check_bound(id: PeriodId, field: &str, value: u32, max: u32) -> Result<()> {
    if value > max {
        return Err(PlannerError::InvalidPeriod(format!(
            "{id}: {field} must be in 0..={max}, got {value}"
        )));
    }
    Ok(())
}
