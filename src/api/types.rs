//! API response and query types.
//!
//! Durations are exposed as whole seconds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schedule::{CandidateOperation, ExpandedWindow, Optimum, PeakStatus};

/// Current status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Instant the status was evaluated at.
    pub now: DateTime<Utc>,
    /// `"peak"`, `"off_peak"` or `"unavailable"`.
    pub status: &'static str,
    /// Seconds until the status flips; absent when unavailable.
    pub until_secs: Option<i64>,
}

impl StatusResponse {
    pub fn new(now: DateTime<Utc>, status: &PeakStatus) -> Self {
        Self {
            now,
            status: status.label(),
            until_secs: status.until().map(|d| d.num_seconds()),
        }
    }
}

/// One concrete off-peak window.
#[derive(Debug, Serialize)]
pub struct WindowRecord {
    pub period_id: u64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl From<&ExpandedWindow> for WindowRecord {
    fn from(w: &ExpandedWindow) -> Self {
        Self {
            period_id: w.period().0,
            start: w.start(),
            end: w.end(),
        }
    }
}

/// Query parameters for `/plan`.
#[derive(Debug, Deserialize)]
pub struct PlanQuery {
    pub appliance: String,
    pub program: String,
}

/// One candidate run.
#[derive(Debug, Serialize)]
pub struct CandidateRecord {
    /// Delay in minutes.
    pub delay_minutes: i64,
    pub run_start: DateTime<Utc>,
    pub run_end: DateTime<Utc>,
    pub window: Option<WindowRecord>,
    pub off_peak_minutes: i64,
    pub off_peak_ratio: f64,
}

impl From<&CandidateOperation> for CandidateRecord {
    fn from(op: &CandidateOperation) -> Self {
        Self {
            delay_minutes: op.delay().as_duration().num_minutes(),
            run_start: op.run_start(),
            run_end: op.run_end(),
            window: op.best_window().map(WindowRecord::from),
            off_peak_minutes: op.off_peak_minutes(),
            off_peak_ratio: op.off_peak_ratio(),
        }
    }
}

/// Recommended start.
#[derive(Debug, Serialize)]
pub struct OptimumRecord {
    pub delay_minutes: i64,
    pub ratio: f64,
    pub wait_before_start_secs: i64,
    pub start_at: DateTime<Utc>,
}

impl From<&Optimum> for OptimumRecord {
    fn from(o: &Optimum) -> Self {
        Self {
            delay_minutes: o.delay().as_duration().num_minutes(),
            ratio: o.ratio(),
            wait_before_start_secs: o.wait_before_start.num_seconds(),
            start_at: o.start_at(),
        }
    }
}

/// Candidate runs of one program and the recommended one.
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub appliance: String,
    pub program: String,
    pub now: DateTime<Utc>,
    pub candidates: Vec<CandidateRecord>,
    pub optimum: Option<OptimumRecord>,
}

/// Error body for non-2xx responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn status_response_maps_fields() {
        let now = DateTime::<Utc>::UNIX_EPOCH;
        let peak = StatusResponse::new(now, &PeakStatus::Peak { until: Duration::minutes(2) });
        assert_eq!(peak.status, "peak");
        assert_eq!(peak.until_secs, Some(120));

        let unavailable = StatusResponse::new(now, &PeakStatus::Unavailable);
        assert_eq!(unavailable.status, "unavailable");
        assert_eq!(unavailable.until_secs, None);
    }
}
