//! Persistence of periods and appliances.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::PlannerConfig;
use crate::error::Result;

/// Loads and stores the planner's structured records.
pub trait ConfigStore {
    /// # Errors
    ///
    /// Returns an error if the records cannot be read or parsed.
    fn load(&self) -> Result<PlannerConfig>;

    /// # Errors
    ///
    /// Returns an error if the records cannot be written.
    fn save(&mut self, config: &PlannerConfig) -> Result<()>;
}

/// Stores the configuration as a TOML file.
#[derive(Debug, Clone)]
pub struct TomlFileStore {
    path: PathBuf,
}

impl TomlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for TomlFileStore {
    fn load(&self) -> Result<PlannerConfig> {
        Ok(PlannerConfig::from_toml_file(&self.path)?)
    }

    fn save(&mut self, config: &PlannerConfig) -> Result<()> {
        let text = toml::to_string_pretty(config)?;
        fs::write(&self.path, text)?;
        info!(path = %self.path.display(), "configuration saved");
        Ok(())
    }
}

/// Keeps the configuration in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    config: Option<PlannerConfig>,
}

impl MemoryStore {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config: Some(config),
        }
    }
}

impl ConfigStore for MemoryStore {
    /// Falls back to the baseline preset when nothing was saved.
    fn load(&self) -> Result<PlannerConfig> {
        Ok(self.config.clone().unwrap_or_else(PlannerConfig::baseline))
    }

    fn save(&mut self, config: &PlannerConfig) -> Result<()> {
        self.config = Some(config.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlannerError;

    #[test]
    fn toml_store_round_trips_through_disk() {
        let path = std::env::temp_dir().join(format!("offpeak-store-{}.toml", std::process::id()));
        let mut store = TomlFileStore::new(&path);
        let mut cfg = PlannerConfig::split();
        cfg.calendar.timezone = "UTC".to_string();

        store.save(&cfg).unwrap();
        let loaded = store.load().unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let store = TomlFileStore::new("/nonexistent/offpeak/config.toml");
        assert!(matches!(store.load(), Err(PlannerError::Config(_))));
    }

    #[test]
    fn memory_store_defaults_to_baseline() {
        let mut store = MemoryStore::default();
        assert_eq!(store.load().unwrap(), PlannerConfig::baseline());

        store.save(&PlannerConfig::split()).unwrap();
        assert_eq!(store.load().unwrap(), PlannerConfig::split());
    }
}
