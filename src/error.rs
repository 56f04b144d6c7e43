//! Error types for the planner.

use thiserror::Error;

use crate::config::ConfigError;
use crate::schedule::Delay;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    #[error("program duration must be > 0, got {seconds}s")]
    NonPositiveDuration { seconds: i64 },

    #[error("delay {delay} moves the run past the representable time range")]
    TimeOutOfRange { delay: Delay },

    #[error("unknown time zone \"{0}\"")]
    UnknownTimeZone(String),

    #[error("invalid notification \"{identifier}\": {reason}")]
    InvalidNotification { identifier: String, reason: String },

    #[error("unknown appliance \"{0}\"")]
    UnknownAppliance(String),

    #[error("appliance \"{appliance}\" has no program \"{program}\"")]
    UnknownProgram { appliance: String, program: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
