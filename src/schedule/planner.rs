//! Candidate appliance runs and their off-peak coverage.

use std::fmt;
use std::ops::RangeInclusive;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::calendar::Calendar;
use super::delay::Delay;
use super::period::Period;
use super::window::{ExpandedWindow, expand};
use crate::error::{PlannerError, Result};

/// A hypothetical run of a program started after `delay`.
///
/// The run covers the closed interval `[run_start, run_end]`. Only the single
/// window with the largest overlap counts towards off-peak coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateOperation {
    delay: Delay,
    run_start: DateTime<Utc>,
    run_end: DateTime<Utc>,
    best_window: Option<ExpandedWindow>,
}

impl CandidateOperation {
    /// Builds the run for `delay` from `now` and picks its best window.
    ///
    /// Ties between windows keep the first one in `windows` order. Windows
    /// that only touch the run do not count.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::TimeOutOfRange` if the run would start or end
    /// past the range `DateTime<Utc>` can represent.
    pub fn new(
        delay: Delay,
        now: DateTime<Utc>,
        program_duration: Duration,
        windows: &[ExpandedWindow],
    ) -> Result<Self> {
        let out_of_range = || PlannerError::TimeOutOfRange { delay };
        let run_start = now
            .checked_add_signed(delay.as_duration())
            .ok_or_else(out_of_range)?;
        let run_end = run_start
            .checked_add_signed(program_duration)
            .ok_or_else(out_of_range)?;

        let mut best_window = None;
        let mut best_overlap = Duration::zero();
        for window in windows {
            let overlap = window.overlap(run_start, run_end);
            if overlap > best_overlap {
                best_overlap = overlap;
                best_window = Some(*window);
            }
        }

        Ok(Self {
            delay,
            run_start,
            run_end,
            best_window,
        })
    }

    pub fn delay(&self) -> Delay {
        self.delay
    }

    pub fn run_start(&self) -> DateTime<Utc> {
        self.run_start
    }

    pub fn run_end(&self) -> DateTime<Utc> {
        self.run_end
    }

    pub fn run_duration(&self) -> Duration {
        self.run_end - self.run_start
    }

    pub fn best_window(&self) -> Option<&ExpandedWindow> {
        self.best_window.as_ref()
    }

    /// Part of the run before the best window opens.
    fn peak_head(&self) -> Duration {
        self.best_window.map_or(Duration::zero(), |w| {
            (w.start() - self.run_start).max(Duration::zero())
        })
    }

    /// Part of the run after the best window closes.
    fn peak_tail(&self) -> Duration {
        self.best_window.map_or(Duration::zero(), |w| {
            (self.run_end - w.end()).max(Duration::zero())
        })
    }

    /// Time within the run not covered by the best window.
    pub fn peak_duration_within(&self) -> Duration {
        if self.best_window.is_none() {
            return self.run_duration();
        }
        self.peak_head() + self.peak_tail()
    }

    pub fn off_peak_duration(&self) -> Duration {
        (self.run_duration() - self.peak_duration_within()).max(Duration::zero())
    }

    /// Whole off-peak minutes, rounded down.
    pub fn off_peak_minutes(&self) -> i64 {
        self.off_peak_duration().num_minutes()
    }

    /// Fraction of the run spent off-peak, in `[0, 1]`.
    pub fn off_peak_ratio(&self) -> f64 {
        ratio(self.off_peak_duration(), self.run_duration())
    }

    /// Fractions of the run at which off-peak coverage begins and ends, or
    /// `None` when no window overlaps the run.
    pub fn off_peak_range_ratio(&self) -> Option<RangeInclusive<f64>> {
        if self.best_window.is_none() {
            return None;
        }
        let run = self.run_duration();
        let lower = ratio(self.peak_head(), run);
        let upper = ratio(run - self.peak_tail(), run);
        Some(lower..=upper)
    }

    /// Returns `true` when off-peak coverage lasts until the end of the run,
    /// i.e. the upper bound of [`Self::off_peak_range_ratio`] is exactly 1.
    pub fn covers_run_end(&self) -> bool {
        self.best_window.is_some() && self.peak_tail().is_zero()
    }
}

impl fmt::Display for CandidateOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "delay {:>6} | {} -> {} | off-peak {:>4} min ({:>5.1}%)",
            self.delay.to_string(),
            self.run_start.format("%Y-%m-%d %H:%M"),
            self.run_end.format("%Y-%m-%d %H:%M"),
            self.off_peak_minutes(),
            self.off_peak_ratio() * 100.0,
        )
    }
}

fn ratio(part: Duration, whole: Duration) -> f64 {
    let whole_ms = whole.num_milliseconds();
    if whole_ms <= 0 {
        return 0.0;
    }
    (part.num_milliseconds() as f64 / whole_ms as f64).clamp(0.0, 1.0)
}

/// Plans candidate runs of one program against a fixed set of periods.
#[derive(Debug, Clone, Copy)]
pub struct OperationPlanner<'a> {
    periods: &'a [Period],
    calendar: &'a Calendar,
    program_duration: Duration,
}

impl<'a> OperationPlanner<'a> {
    /// Creates a planner for a program of `program_duration`.
    ///
    /// # Arguments
    ///
    /// * `periods` - Recurring off-peak periods to expand around each `now`
    /// * `calendar` - Time zone the periods' wall-clock times refer to
    /// * `program_duration` - Running time of the program
    ///
    /// # Returns
    ///
    /// A planner borrowing `periods` and `calendar`.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::NonPositiveDuration` if the duration is not
    /// strictly positive.
    pub fn new(
        periods: &'a [Period],
        calendar: &'a Calendar,
        program_duration: Duration,
    ) -> Result<Self> {
        if program_duration <= Duration::zero() {
            return Err(PlannerError::NonPositiveDuration {
                seconds: program_duration.num_seconds(),
            });
        }
        Ok(Self {
            periods,
            calendar,
            program_duration,
        })
    }

    pub fn program_duration(&self) -> Duration {
        self.program_duration
    }

    /// One candidate per delay, in input order. Duplicate delays produce
    /// duplicate candidates.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::TimeOutOfRange` for a delay that pushes the run
    /// out of the representable time range.
    pub fn plan(&self, delays: &[Delay], now: DateTime<Utc>) -> Result<Vec<CandidateOperation>> {
        let windows = expand(self.periods, now, self.calendar);
        let operations = delays
            .iter()
            .map(|delay| CandidateOperation::new(*delay, now, self.program_duration, &windows))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            windows = windows.len(),
            candidates = operations.len(),
            "planned candidate operations"
        );
        Ok(operations)
    }

    /// Plans a single delay from `now`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::plan`].
    pub fn candidate(&self, delay: Delay, now: DateTime<Utc>) -> Result<CandidateOperation> {
        let windows = expand(self.periods, now, self.calendar);
        CandidateOperation::new(delay, now, self.program_duration, &windows)
    }
}

/// Plans one candidate per delay.
///
/// # Errors
///
/// Returns `PlannerError::NonPositiveDuration` if `program_duration` is not
/// strictly positive and `PlannerError::TimeOutOfRange` for a delay that
/// pushes a run out of the representable time range.
pub fn plan(
    periods: &[Period],
    program_duration: Duration,
    delays: &[Delay],
    now: DateTime<Utc>,
    calendar: &Calendar,
) -> Result<Vec<CandidateOperation>> {
    OperationPlanner::new(periods, calendar, program_duration)?.plan(delays, now)
}
