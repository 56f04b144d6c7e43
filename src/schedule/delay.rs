//! Appliance start delays.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Offset from "now" at which an appliance program starts, as set on the
/// appliance's delay-start control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Delay {
    #[serde(default)]
    pub hours: u32,
    #[serde(default)]
    pub minutes: u32,
}

impl Delay {
    pub fn new(hours: u32, minutes: u32) -> Self {
        Self { hours, minutes }
    }

    pub fn from_hours(hours: u32) -> Self {
        Self::new(hours, 0)
    }

    /// Splits a duration into whole hours and minutes. Negative durations
    /// clamp to zero and leftover seconds are truncated.
    pub fn from_duration(duration: Duration) -> Self {
        let total = u32::try_from(duration.num_minutes().max(0)).unwrap_or(u32::MAX);
        Self::new(total / 60, total % 60)
    }

    pub fn as_duration(&self) -> Duration {
        Duration::hours(i64::from(self.hours)) + Duration::minutes(i64::from(self.minutes))
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h{:02}", self.hours, self.minutes)
    }
}
