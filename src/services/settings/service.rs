use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::models::settings::PlannerSettings;

pub const CONFIG_FILE_NAME: &str = "config.toml";
const FALLBACK_DATA_DIR: &str = "planner-data";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "MonthPlanner", "MonthPlanner")
}

pub struct SettingsService {
    config_path: Option<PathBuf>,
}

impl SettingsService {
    /// Uses `<config dir>/config.toml` of the platform.
    pub fn new() -> Self {
        Self {
            config_path: project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME)),
        }
    }

    /// Uses an explicit config file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Reads and validates the config file. A missing file yields defaults.
    pub fn get(&self) -> Result<PlannerSettings> {
        let Some(path) = &self.config_path else {
            return Ok(PlannerSettings::default());
        };
        if !path.exists() {
            return Ok(PlannerSettings::default());
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let settings: PlannerSettings = toml::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;
        Ok(settings)
    }

    /// Like [`get`](Self::get), but falls back to defaults with a warning.
    pub fn load_or_default(&self) -> PlannerSettings {
        match self.get() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to load settings: {:#}, using defaults", e);
                PlannerSettings::default()
            }
        }
    }

    /// Writes validated settings back to the config file.
    pub fn update(&self, settings: &PlannerSettings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;
        let path = self
            .config_path
            .as_ref()
            .ok_or_else(|| anyhow!("No config directory available"))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Where planner state lives: the configured override, else the platform
    /// data directory.
    pub fn data_dir(settings: &PlannerSettings) -> PathBuf {
        if let Some(dir) = &settings.data_dir {
            return dir.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
    }
}

impl Default for SettingsService {
    fn default() -> Self {
        Self::new()
    }
}
