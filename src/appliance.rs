//! Appliances, their programs and delay-start options.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::schedule::{Calendar, Delay, OperationPlanner, Optimum, Period, select_optimum};

/// A named program with a fixed running time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Program {
    pub name: String,
    pub duration_minutes: u32,
}

impl Program {
    pub fn new(name: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            name: name.into(),
            duration_minutes,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// An appliance with a delay-start control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Appliance {
    pub name: String,
    /// Delays offered by the appliance, in display order.
    #[serde(default)]
    pub delays: Vec<Delay>,
    #[serde(default)]
    pub programs: Vec<Program>,
}

impl Appliance {
    pub fn dishwasher() -> Self {
        Self {
            name: "Dishwasher".to_string(),
            delays: (0..=9).map(Delay::from_hours).collect(),
            programs: vec![
                Program::new("Eco", 210),
                Program::new("Intensive", 130),
                Program::new("Quick", 45),
            ],
        }
    }

    pub fn washing_machine() -> Self {
        Self {
            name: "Washing machine".to_string(),
            delays: (0..=12).map(Delay::from_hours).collect(),
            programs: vec![
                Program::new("Cotton", 180),
                Program::new("Synthetics", 110),
                Program::new("Quick 30", 30),
            ],
        }
    }

    pub fn program(&self, name: &str) -> Option<&Program> {
        self.programs.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Looks up `program` and recommends the best of this appliance's delays.
    ///
    /// # Arguments
    ///
    /// * `program` - Program name, matched case-insensitively
    /// * `periods` - Recurring off-peak periods
    /// * `calendar` - Time zone the periods refer to
    /// * `now` - Instant the delays are counted from
    ///
    /// # Returns
    ///
    /// The recommended start, or `None` when the appliance offers no delays.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::UnknownProgram` for an unknown program name,
    /// `PlannerError::NonPositiveDuration` for a zero-length program and
    /// `PlannerError::TimeOutOfRange` for a delay too large to plan.
    pub fn optimum(
        &self,
        program: &str,
        periods: &[Period],
        calendar: &Calendar,
        now: DateTime<Utc>,
    ) -> Result<Option<Optimum>> {
        let program = self.program(program).ok_or_else(|| PlannerError::UnknownProgram {
            appliance: self.name.clone(),
            program: program.to_string(),
        })?;
        let planner = OperationPlanner::new(periods, calendar, program.duration())?;
        let operations = planner.plan(&self.delays, now)?;
        select_optimum(&operations, now, &planner)
    }
}

/// Case-insensitive lookup by appliance name.
pub fn find<'a>(appliances: &'a [Appliance], name: &str) -> Result<&'a Appliance> {
    appliances
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| PlannerError::UnknownAppliance(name.to_string()))
}
