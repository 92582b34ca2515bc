use anyhow::Result;
use notify_rust::{Notification, Timeout};

/// Whether the platform lets us show notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    Granted,
    Denied,
}

impl NotificationPermission {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Self::Granted
        } else {
            Self::Denied
        }
    }

    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

/// Anything that can put a notification in front of the user.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn permission(&self) -> NotificationPermission;
    fn show(&self, title: &str, body: &str) -> Result<()>;
}

/// Message shown once when notifications are requested but blocked.
pub const PERMISSION_DENIED_ADVISORY: &str =
    "Notifications are blocked. Enable them in the planner settings to receive reminders.";

/// Result of asking for notification permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionOutcome {
    /// Granted; a confirmation notification was shown.
    Granted,
    /// Denied; carries the advisory the first time only.
    Denied { advisory: Option<&'static str> },
}

/// Service for displaying system notifications
pub struct NotificationService {
    enabled: bool,
    advisory_shown: bool,
}

impl NotificationService {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            advisory_shown: false,
        }
    }

    /// Asks for permission. A grant is confirmed with a notification; a
    /// denial returns the advisory text on the first request only.
    pub fn request_permission(&mut self) -> Result<PermissionOutcome> {
        if self.enabled {
            self.show(
                "Notifications enabled",
                "Reminders will appear on this device at their scheduled time.",
            )?;
            return Ok(PermissionOutcome::Granted);
        }

        let advisory = (!self.advisory_shown).then_some(PERMISSION_DENIED_ADVISORY);
        self.advisory_shown = true;
        Ok(PermissionOutcome::Denied { advisory })
    }
}

impl Notifier for NotificationService {
    fn permission(&self) -> NotificationPermission {
        NotificationPermission::from_enabled(self.enabled)
    }

    fn show(&self, title: &str, body: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        Notification::new()
            .summary(title)
            .body(body)
            .timeout(Timeout::Milliseconds(5000))
            .show()
            .map_err(|e| anyhow::anyhow!("Failed to show notification: {}", e))?;

        Ok(())
    }
}
