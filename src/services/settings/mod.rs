// Settings service module
// Loads PlannerSettings from config.toml and resolves platform directories

mod service;

pub use service::{SettingsService, CONFIG_FILE_NAME};
