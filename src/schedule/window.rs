//! Expansion of recurring periods into concrete off-peak windows.

use std::fmt;
use std::ops::Range;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::debug;

use super::calendar::Calendar;
use super::period::{Period, PeriodId};

/// Day offsets, relative to the reference day, each range is anchored on.
const DAY_OFFSETS: [i64; 3] = [-1, 0, 1];

/// A period anchored on a specific day: the closed interval `[start, end]`.
///
/// `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandedWindow {
    period: PeriodId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ExpandedWindow {
    /// Creates a window, pushing the end forward by a day when it is not
    /// after the start.
    pub fn new(period: PeriodId, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let end = if end <= start {
            end + Duration::hours(24)
        } else {
            end
        };
        Self { period, start, end }
    }

    /// Anchors one minute range of a period on `day`.
    ///
    /// Returns `None` when the calendar cannot place either bound.
    fn anchor(
        period: PeriodId,
        range: &Range<i32>,
        day: NaiveDate,
        calendar: &Calendar,
    ) -> Option<Self> {
        let start = calendar.instant_at(day, range.start)?;
        let end = calendar.instant_at(day, range.end)?;
        Some(Self::new(period, start, end))
    }

    pub fn period(&self) -> PeriodId {
        self.period
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Closed-interval containment.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Length of the intersection with `[start, end]`, zero when disjoint.
    pub fn overlap(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Duration {
        let overlap = self.end.min(end) - self.start.max(start);
        overlap.max(Duration::zero())
    }
}

impl fmt::Display for ExpandedWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}",
            self.period,
            self.start.to_rfc3339(),
            self.end.to_rfc3339()
        )
    }
}

/// Expands periods into concrete windows around the local day of `reference`.
///
/// Every minute range of every period is anchored on the previous, current
/// and next local day, so a window covering `reference` is always present
/// whichever day it nominally started on. Candidates the calendar cannot
/// place are dropped and exact duplicates are skipped.
///
/// # Arguments
///
/// * `periods` - Recurring periods to anchor
/// * `reference` - Instant whose local day is the middle of the scan
/// * `calendar` - Time zone the periods' wall-clock times refer to
///
/// # Returns
///
/// The distinct windows, in no particular order.
pub fn expand(
    periods: &[Period],
    reference: DateTime<Utc>,
    calendar: &Calendar,
) -> Vec<ExpandedWindow> {
    let today = calendar.local_date(reference);
    let mut windows = Vec::with_capacity(periods.len() * DAY_OFFSETS.len());

    for period in periods {
        for range in period.minute_ranges() {
            for offset in DAY_OFFSETS {
                let Some(day) = today.checked_add_signed(Duration::days(offset)) else {
                    debug!(period = %period, offset, "day out of calendar range, dropped");
                    continue;
                };
                match ExpandedWindow::anchor(period.id(), &range, day, calendar) {
                    Some(window) if !windows.contains(&window) => windows.push(window),
                    Some(_) => {}
                    None => {
                        debug!(period = %period, %day, ?range, "calendar could not place window, dropped");
                    }
                }
            }
        }
    }

    windows
}

/// Windows that have not ended yet at `now`.
pub fn upcoming(windows: &[ExpandedWindow], now: DateTime<Utc>) -> Vec<ExpandedWindow> {
    windows.iter().filter(|w| w.end > now).copied().collect()
}
