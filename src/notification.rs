//! Local notification scheduling at the boundary of the planner.
//!
//! Delivery is left to the platform; this module defines what the planner
//! hands over and keeps an in-memory scheduler for the CLI and tests.

use std::collections::BTreeMap;

use chrono::Duration;
use tracing::info;

use crate::appliance::{Appliance, Program};
use crate::error::{PlannerError, Result};
use crate::schedule::{Optimum, PeakStatus, format_duration};

/// Identifier of the reminder sent when the status flips.
pub const TRANSITION_REMINDER_ID: &str = "peak-transition";

/// A notification to fire once after `fire_in`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub fire_in: Duration,
}

/// Scheduler for one-shot local notifications.
///
/// Scheduling an identifier that is already pending replaces it.
pub trait NotificationScheduler {
    /// # Errors
    ///
    /// Returns `PlannerError::InvalidNotification` if `fire_in` is not
    /// strictly positive.
    fn schedule(&mut self, notification: Notification) -> Result<()>;

    /// Removes a pending notification. Unknown identifiers are ignored.
    fn cancel(&mut self, identifier: &str);

    /// Currently pending notifications, ordered by identifier.
    fn pending(&self) -> Vec<Notification>;
}

/// Keeps pending notifications in memory, keyed by identifier.
#[derive(Debug, Default)]
pub struct InMemoryScheduler {
    pending: BTreeMap<String, Notification>,
}

impl InMemoryScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationScheduler for InMemoryScheduler {
    fn schedule(&mut self, notification: Notification) -> Result<()> {
        if notification.fire_in <= Duration::zero() {
            return Err(PlannerError::InvalidNotification {
                identifier: notification.identifier,
                reason: "fire duration must be > 0".to_string(),
            });
        }
        info!(
            id = %notification.identifier,
            fire_in_secs = notification.fire_in.num_seconds(),
            "notification scheduled"
        );
        self.pending
            .insert(notification.identifier.clone(), notification);
        Ok(())
    }

    fn cancel(&mut self, identifier: &str) {
        if self.pending.remove(identifier).is_some() {
            info!(id = %identifier, "notification cancelled");
        }
    }

    fn pending(&self) -> Vec<Notification> {
        self.pending.values().cloned().collect()
    }
}

/// Reminder to program the appliance once the optimum wait has elapsed.
///
/// Returns `None` when the appliance can be programmed right away.
pub fn start_reminder(appliance: &Appliance, program: &Program, optimum: &Optimum) -> Option<Notification> {
    if optimum.wait_before_start <= Duration::zero() {
        return None;
    }
    Some(Notification {
        identifier: format!("start-{}-{}", slug(&appliance.name), slug(&program.name)),
        title: format!("Start the {}", appliance.name.to_lowercase()),
        body: format!(
            "Program \"{}\" with a {} delay to run {:.0}% off-peak.",
            program.name,
            optimum.delay(),
            optimum.ratio() * 100.0
        ),
        fire_in: optimum.wait_before_start,
    })
}

/// Reminder firing when the current status flips.
///
/// Returns `None` when the status is unavailable or flips immediately.
pub fn transition_reminder(status: &PeakStatus) -> Option<Notification> {
    let (title, until) = match status {
        PeakStatus::Unavailable => return None,
        PeakStatus::OffPeak { until } => ("Off-peak hours are over", *until),
        PeakStatus::Peak { until } => ("Off-peak hours have started", *until),
    };
    if until <= Duration::zero() {
        return None;
    }
    Some(Notification {
        identifier: TRANSITION_REMINDER_ID.to_string(),
        title: title.to_string(),
        body: format!("Status changes {} from now.", format_duration(until)),
        fire_in: until,
    })
}

fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect()
}
