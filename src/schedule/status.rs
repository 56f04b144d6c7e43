//! Current peak/off-peak status.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use super::calendar::Calendar;
use super::format_duration;
use super::period::Period;
use super::window::{ExpandedWindow, expand};

/// Pricing status at an instant and the time left until it flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakStatus {
    /// No reference time or no off-peak window to compare against.
    Unavailable,
    /// Inside an off-peak window for `until` more.
    OffPeak { until: Duration },
    /// Outside every off-peak window; the next one starts in `until`.
    Peak { until: Duration },
}

impl PeakStatus {
    pub fn is_off_peak(&self) -> bool {
        matches!(self, Self::OffPeak { .. })
    }

    /// Time until the status flips, if known.
    pub fn until(&self) -> Option<Duration> {
        match self {
            Self::Unavailable => None,
            Self::OffPeak { until } | Self::Peak { until } => Some(*until),
        }
    }

    /// Short machine-friendly label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::OffPeak { .. } => "off_peak",
            Self::Peak { .. } => "peak",
        }
    }
}

impl fmt::Display for PeakStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "status unavailable"),
            Self::OffPeak { until } => write!(f, "off-peak, ends in {}", format_duration(*until)),
            Self::Peak { until } => write!(f, "peak, off-peak starts in {}", format_duration(*until)),
        }
    }
}

/// Evaluates the status at `now` against concrete windows.
///
/// `now` is inside a window when `start <= now < end`. Inside, the status
/// lasts until the closest end among the windows containing `now`. Outside,
/// it lasts until the closest window start after `now`.
pub fn evaluate(now: DateTime<Utc>, windows: &[ExpandedWindow]) -> PeakStatus {
    let active_end = windows
        .iter()
        .filter(|w| w.start() <= now && now < w.end())
        .map(ExpandedWindow::end)
        .min();
    if let Some(end) = active_end {
        return PeakStatus::OffPeak { until: end - now };
    }

    windows
        .iter()
        .map(ExpandedWindow::start)
        .filter(|start| *start > now)
        .min()
        .map_or(PeakStatus::Unavailable, |start| PeakStatus::Peak {
            until: start - now,
        })
}

/// Expands `periods` around `now` and evaluates the status there.
pub fn status_at(periods: &[Period], now: DateTime<Utc>, calendar: &Calendar) -> PeakStatus {
    evaluate(now, &expand(periods, now, calendar))
}
