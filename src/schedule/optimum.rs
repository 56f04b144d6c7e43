//! Selection of the delay that maximises off-peak usage.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::delay::Delay;
use super::format_duration;
use super::planner::{CandidateOperation, OperationPlanner};
use crate::error::{PlannerError, Result};

/// Recommended start: wait `wait_before_start`, then program the appliance
/// with [`Optimum::delay`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Optimum {
    /// Operation the recommendation is based on.
    pub operation: CandidateOperation,
    /// Time to wait before setting the delay on the appliance (>= 0).
    pub wait_before_start: Duration,
}

impl Optimum {
    pub fn delay(&self) -> Delay {
        self.operation.delay()
    }

    pub fn ratio(&self) -> f64 {
        self.operation.off_peak_ratio()
    }

    /// Instant the program actually starts running.
    pub fn start_at(&self) -> DateTime<Utc> {
        self.operation.run_start()
    }
}

impl fmt::Display for Optimum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.wait_before_start > Duration::zero() {
            write!(
                f,
                "wait {}, then start with delay {} ({:.1}% off-peak)",
                format_duration(self.wait_before_start),
                self.delay(),
                self.ratio() * 100.0
            )
        } else {
            write!(
                f,
                "start now with delay {} ({:.1}% off-peak)",
                self.delay(),
                self.ratio() * 100.0
            )
        }
    }
}

/// Whether `challenger` replaces `current` during the optimum scan.
///
/// A current candidate whose off-peak coverage reaches the end of its run is
/// never replaced by one whose coverage does not, even with a higher ratio.
/// Otherwise the strictly higher ratio wins, so ties keep the earlier one.
pub fn is_surpassed_by(current: &CandidateOperation, challenger: &CandidateOperation) -> bool {
    if current.covers_run_end() && !challenger.covers_run_end() {
        return false;
    }
    current.off_peak_ratio() < challenger.off_peak_ratio()
}

/// Best candidate under [`is_surpassed_by`], scanning in order.
pub fn best_candidate(operations: &[CandidateOperation]) -> Option<&CandidateOperation> {
    let (first, rest) = operations.split_first()?;
    Some(rest.iter().fold(first, |current, challenger| {
        if is_surpassed_by(current, challenger) {
            challenger
        } else {
            current
        }
    }))
}

/// Picks the optimum among `operations` planned at `now`.
///
/// When the best operation's window opens after its run would start, the
/// wait until the window opens is computed and the same delay is planned
/// once more from `now + wait`; that re-check is what gets reported.
/// Returns `Ok(None)` when `operations` is empty.
///
/// # Errors
///
/// Returns `PlannerError::TimeOutOfRange` if the re-check run falls outside
/// the representable time range.
pub fn select_optimum(
    operations: &[CandidateOperation],
    now: DateTime<Utc>,
    planner: &OperationPlanner<'_>,
) -> Result<Option<Optimum>> {
    let Some(best) = best_candidate(operations).copied() else {
        return Ok(None);
    };

    let wait = best
        .best_window()
        .map_or(Duration::zero(), |w| w.start() - best.run_start());
    if wait <= Duration::zero() {
        debug!(delay = %best.delay(), ratio = best.off_peak_ratio(), "optimum starts without waiting");
        return Ok(Some(Optimum {
            operation: best,
            wait_before_start: Duration::zero(),
        }));
    }

    let recheck_at = now
        .checked_add_signed(wait)
        .ok_or(PlannerError::TimeOutOfRange { delay: best.delay() })?;
    let recheck = planner.candidate(best.delay(), recheck_at)?;
    if recheck.best_window() != best.best_window() {
        debug!(
            delay = %best.delay(),
            wait_secs = wait.num_seconds(),
            "waiting shifts the optimum to another window"
        );
    }
    debug!(
        delay = %recheck.delay(),
        wait_secs = wait.num_seconds(),
        ratio = recheck.off_peak_ratio(),
        "optimum requires waiting"
    );
    Ok(Some(Optimum {
        operation: recheck,
        wait_before_start: wait,
    }))
}
