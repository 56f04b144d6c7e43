//! TOML-based planner configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::appliance::Appliance;
use crate::error::PlannerError;
use crate::ids::IdGenerator;
use crate::schedule::{Calendar, Period, PeriodId};

/// Longest delay an appliance may offer, in hours.
pub const MAX_DELAY_HOURS: u32 = 48;

/// Top-level planner configuration parsed from TOML.
///
/// All sections have defaults matching the baseline preset. Load from TOML
/// with [`PlannerConfig::from_toml_file`] or use [`PlannerConfig::baseline`]
/// for the built-in default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlannerConfig {
    /// Identifier seed and timeline cadence.
    #[serde(default)]
    pub planner: PlannerSection,
    /// Time zone used for wall-clock periods.
    #[serde(default)]
    pub calendar: CalendarConfig,
    /// Recurring off-peak periods.
    #[serde(default = "default_periods")]
    pub periods: Vec<PeriodConfig>,
    /// Appliances with their programs and delays.
    #[serde(default = "default_appliances")]
    pub appliances: Vec<Appliance>,
}

/// Global planner parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerSection {
    /// Seed for identifiers of periods configured without an `id`.
    pub seed: u64,
    /// Interval between timeline entries (minutes, must be > 0).
    pub timeline_step_minutes: u32,
    /// Number of timeline entries.
    pub timeline_steps: usize,
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            seed: 42,
            timeline_step_minutes: 15,
            timeline_steps: 96,
        }
    }
}

/// Calendar parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
    /// IANA time zone name.
    pub timezone: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            timezone: "Europe/Paris".to_string(),
        }
    }
}

/// One recurring off-peak period record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeriodConfig {
    /// Stable identifier; generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub start_hour: u32,
    #[serde(default)]
    pub start_minute: u32,
    pub end_hour: u32,
    #[serde(default)]
    pub end_minute: u32,
}

impl PeriodConfig {
    pub fn new(start_hour: u32, start_minute: u32, end_hour: u32, end_minute: u32) -> Self {
        Self {
            id: None,
            start_hour,
            start_minute,
            end_hour,
            end_minute,
        }
    }
}

fn default_periods() -> Vec<PeriodConfig> {
    vec![PeriodConfig::new(23, 0, 7, 0), PeriodConfig::new(12, 0, 14, 0)]
}

fn default_appliances() -> Vec<Appliance> {
    vec![Appliance::dishwasher(), Appliance::washing_machine()]
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"periods[0].start_hour"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl PlannerConfig {
    /// Returns the baseline configuration: a night and a midday window in
    /// Europe/Paris, with a dishwasher and a washing machine.
    pub fn baseline() -> Self {
        Self {
            planner: PlannerSection::default(),
            calendar: CalendarConfig::default(),
            periods: default_periods(),
            appliances: default_appliances(),
        }
    }

    /// Returns the split preset: an early-morning and a mid-afternoon window.
    pub fn split() -> Self {
        Self {
            periods: vec![PeriodConfig::new(2, 2, 8, 2), PeriodConfig::new(15, 2, 17, 2)],
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "split"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "split" => Ok(Self::split()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.planner.timeline_step_minutes == 0 {
            errors.push(ConfigError {
                field: "planner.timeline_step_minutes".into(),
                message: "must be > 0".into(),
            });
        }

        if Calendar::from_name(&self.calendar.timezone).is_err() {
            errors.push(ConfigError {
                field: "calendar.timezone".into(),
                message: format!("unknown time zone \"{}\"", self.calendar.timezone),
            });
        }

        let mut ids = HashSet::new();
        for (i, p) in self.periods.iter().enumerate() {
            for (name, value, max) in [
                ("start_hour", p.start_hour, 23),
                ("start_minute", p.start_minute, 59),
                ("end_hour", p.end_hour, 23),
                ("end_minute", p.end_minute, 59),
            ] {
                if value > max {
                    errors.push(ConfigError {
                        field: format!("periods[{i}].{name}"),
                        message: format!("must be in [0, {max}], got {value}"),
                    });
                }
            }
            if let Some(id) = p.id {
                if !ids.insert(id) {
                    errors.push(ConfigError {
                        field: format!("periods[{i}].id"),
                        message: format!("duplicate id {id}"),
                    });
                }
            }
        }

        let mut names = HashSet::new();
        for (i, a) in self.appliances.iter().enumerate() {
            if !names.insert(a.name.to_lowercase()) {
                errors.push(ConfigError {
                    field: format!("appliances[{i}].name"),
                    message: format!("duplicate appliance \"{}\"", a.name),
                });
            }
            for (j, d) in a.delays.iter().enumerate() {
                if d.as_duration() > Duration::hours(i64::from(MAX_DELAY_HOURS)) {
                    errors.push(ConfigError {
                        field: format!("appliances[{i}].delays[{j}]"),
                        message: format!("must be at most {MAX_DELAY_HOURS}h, got {d}"),
                    });
                }
            }
            let mut programs = HashSet::new();
            for (j, p) in a.programs.iter().enumerate() {
                if p.duration_minutes == 0 {
                    errors.push(ConfigError {
                        field: format!("appliances[{i}].programs[{j}].duration_minutes"),
                        message: "must be > 0".into(),
                    });
                }
                if !programs.insert(p.name.to_lowercase()) {
                    errors.push(ConfigError {
                        field: format!("appliances[{i}].programs[{j}].name"),
                        message: format!("duplicate program \"{}\"", p.name),
                    });
                }
            }
        }

        for e in &errors {
            warn!(field = %e.field, "{}", e.message);
        }
        errors
    }

    /// Builds the calendar for the configured time zone.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::UnknownTimeZone` for an unknown zone name.
    pub fn calendar(&self) -> Result<Calendar, PlannerError> {
        Calendar::from_name(&self.calendar.timezone)
    }

    /// Converts period records into periods, drawing ids from `ids` for
    /// records without one.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::InvalidPeriod` for out-of-range fields.
    pub fn periods(&self, ids: &mut IdGenerator) -> Result<Vec<Period>, PlannerError> {
        self.periods
            .iter()
            .map(|p| {
                let id = p.id.map_or_else(|| ids.next_period_id(), PeriodId);
                Period::new(id, p.start_hour, p.start_minute, p.end_hour, p.end_minute)
            })
            .collect()
    }

    /// Identifier generator seeded from `planner.seed`.
    pub fn id_generator(&self) -> IdGenerator {
        IdGenerator::seeded(self.planner.seed)
    }
}
