// Settings module
// User configuration read from config.toml

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::utils::date::parse_hhmm;

/// Fallback reminder time when an event has neither a reminder nor a start time.
pub const DEFAULT_REMINDER_TIME: &str = "09:00";
/// Longest allowed pause between reminder scans (one day).
pub const MAX_CHECK_INTERVAL_SECS: u64 = 24 * 60 * 60;
/// Longest allowed late-firing window (one week).
pub const MAX_WINDOW_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Overrides the platform data directory for stored state.
    pub data_dir: Option<PathBuf>,
    pub notifications: NotificationSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Desktop stand-in for the browser notification permission.
    pub enabled: bool,
    pub default_time: String,
    pub check_interval_secs: u64,
    /// How long after the reminder time a missed reminder still fires.
    pub window_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DisplaySettings {
    /// Platform hint consumed when migrating documents without `compatMode`.
    pub compat_mode: bool,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            notifications: NotificationSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            default_time: DEFAULT_REMINDER_TIME.to_string(),
            check_interval_secs: 60,
            window_minutes: 60,
        }
    }
}

impl PlannerSettings {
    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        if parse_hhmm(&self.notifications.default_time).is_none() {
            return Err(format!(
                "default_time must be HH:MM, got {:?}",
                self.notifications.default_time
            ));
        }
        let interval = self.notifications.check_interval_secs;
        if interval == 0 || interval > MAX_CHECK_INTERVAL_SECS {
            return Err(format!(
                "check_interval_secs must be between 1 and {}, got {}",
                MAX_CHECK_INTERVAL_SECS, interval
            ));
        }
        let window = self.notifications.window_minutes;
        if window <= 0 || window > MAX_WINDOW_MINUTES {
            return Err(format!(
                "window_minutes must be between 1 and {}, got {}",
                MAX_WINDOW_MINUTES, window
            ));
        }
        Ok(())
    }
}
