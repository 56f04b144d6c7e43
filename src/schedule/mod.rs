//! Off-peak scheduling engine: periods, window expansion, status and
//! optimum-delay planning.

/// Wall-clock calendar arithmetic in a time zone.
pub mod calendar;
/// Time sources and fixed-cadence tickers.
pub mod clock;
pub mod delay;
/// Optimum selection among candidate operations.
pub mod optimum;
/// Recurring daily off-peak periods.
pub mod period;
pub mod planner;
pub mod status;
pub mod timeline;
/// Expansion of periods into concrete windows.
pub mod window;

pub use calendar::Calendar;
pub use delay::Delay;
pub use optimum::{Optimum, select_optimum};
pub use period::{Period, PeriodId};
pub use planner::{CandidateOperation, OperationPlanner, plan};
pub use status::{PeakStatus, evaluate, status_at};
pub use window::{ExpandedWindow, expand, upcoming};

use chrono::Duration;

/// Formats a duration as `1h05m09s`; negative durations print as zero.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.num_seconds().max(0);
    format!("{}h{:02}m{:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}
