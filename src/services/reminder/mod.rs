//! Reminder due-check.
//!
//! Every (cell, resolved reminder time) pair moves from pending to fired at
//! most once. Fired pairs are kept in a [`NotifiedLog`] that is persisted
//! between scans, so re-running a scan with the same clock and log fires
//! nothing new.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::document::Document;
use crate::models::event::{CellKey, EventRecord};
use crate::models::settings::{NotificationSettings, DEFAULT_REMINDER_TIME};
use crate::services::notification::Notifier;
use crate::services::storage::{read_json, write_json, KeyValueStore, NOTIFIED_KEY};
use crate::utils::date::{first_of_month, format_date, parse_hhmm, shift_month};

mod scheduler;

pub use scheduler::{run_reminder_loop, ReminderScheduler};

/// Title of every reminder notification.
pub const NOTIFICATION_TITLE: &str = "Planner reminder";
const UNTITLED: &str = "Event";

/// Fired reminders, keyed `"<cellKey>|<reminderTime>"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotifiedLog {
    entries: BTreeMap<String, bool>,
}

impl NotifiedLog {
    /// Loads the log; anything unreadable counts as an empty log.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        read_json(store, NOTIFIED_KEY)
            .and_then(|value| match serde_json::from_value(value) {
                Ok(entries) => Some(entries),
                Err(e) => {
                    log::warn!("Ignoring malformed reminder log: {}", e);
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> anyhow::Result<()> {
        write_json(store, NOTIFIED_KEY, self)
    }

    pub fn entry_key(cell: &CellKey, reminder_time: &str) -> String {
        format!("{cell}|{reminder_time}")
    }

    pub fn has_fired(&self, cell: &CellKey, reminder_time: &str) -> bool {
        self.entries
            .get(&Self::entry_key(cell, reminder_time))
            .copied()
            .unwrap_or(false)
    }

    pub fn mark_fired(&mut self, cell: &CellKey, reminder_time: &str) {
        self.entries.insert(Self::entry_key(cell, reminder_time), true);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reminder timing rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRules {
    /// Used when a record has neither a reminder time nor a start time.
    pub default_time: String,
    /// How long after its target a reminder may still fire.
    pub window: Duration,
}

impl Default for ReminderRules {
    fn default() -> Self {
        Self {
            default_time: DEFAULT_REMINDER_TIME.to_string(),
            window: Duration::hours(1),
        }
    }
}

impl From<&NotificationSettings> for ReminderRules {
    /// A window that is not positive or does not fit a `Duration` falls back
    /// to one hour.
    fn from(settings: &NotificationSettings) -> Self {
        let window = Duration::try_minutes(settings.window_minutes)
            .filter(|window| *window > Duration::zero())
            .unwrap_or_else(|| {
                log::warn!(
                    "Unusable reminder window of {} minutes, using one hour",
                    settings.window_minutes
                );
                Duration::hours(1)
            });
        Self {
            default_time: settings.default_time.clone(),
            window,
        }
    }
}

/// A reminder whose target time has been reached and that has not fired yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueReminder {
    pub cell: CellKey,
    pub reminder_time: String,
    pub target: NaiveDateTime,
    pub body: String,
}

/// `notifyTime`, else `startTime`, else the default time.
pub fn resolve_reminder_time<'r>(record: &'r EventRecord, default_time: &'r str) -> &'r str {
    [record.notify_time.as_str(), record.start_time.as_str()]
        .into_iter()
        .find(|time| !time.is_empty())
        .unwrap_or(default_time)
}

/// "<date> <time range> <title>", memo on a second line.
pub fn notification_body(date: NaiveDate, record: &EventRecord) -> String {
    let title = if record.title.is_empty() {
        UNTITLED
    } else {
        record.title.as_str()
    };
    let time = if record.start_time.is_empty() {
        String::new()
    } else if record.end_time.is_empty() {
        format!("{} ", record.start_time)
    } else {
        format!("{}–{} ", record.start_time, record.end_time)
    };
    let mut body = format!("{} {}{}", format_date(date), time, title);
    if !record.memo.is_empty() {
        body.push('\n');
        body.push_str(&record.memo);
    }
    body
}

/// Months scanned around `now`: previous, current and next.
fn scanned_months(now: NaiveDateTime) -> [NaiveDate; 3] {
    let current = first_of_month(now.date());
    [shift_month(current, -1), current, shift_month(current, 1)]
}

/// Reminders due at `now` that `notified` has not recorded yet.
///
/// Only records dated in the month before, of, or after `now` are considered.
/// A reminder is due when `target <= now < target + window`.
pub fn due_reminders(
    doc: &Document,
    notified: &NotifiedLog,
    now: NaiveDateTime,
    rules: &ReminderRules,
) -> Vec<DueReminder> {
    let months = scanned_months(now);
    doc.events
        .iter()
        .filter(|(cell, _)| months.contains(&first_of_month(cell.date)))
        .filter(|(_, record)| record.notify)
        .filter_map(|(cell, record)| {
            let reminder_time = resolve_reminder_time(record, &rules.default_time);
            let target = cell.date.and_time(parse_hhmm(reminder_time)?);
            let in_window = target <= now
                && target
                    .checked_add_signed(rules.window)
                    .is_none_or(|window_end| now < window_end);
            if !in_window || notified.has_fired(cell, reminder_time) {
                return None;
            }
            Some(DueReminder {
                cell: cell.clone(),
                reminder_time: reminder_time.to_string(),
                target,
                body: notification_body(cell.date, record),
            })
        })
        .collect()
}

/// Outcome of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub fired: Vec<DueReminder>,
    /// Set when the scan was skipped because permission is not granted.
    pub skipped_without_permission: bool,
}

/// Fires due reminders through a [`Notifier`].
pub struct ReminderService<N: Notifier> {
    notifier: N,
    rules: ReminderRules,
}

impl<N: Notifier> ReminderService<N> {
    pub fn new(notifier: N, rules: ReminderRules) -> Self {
        Self { notifier, rules }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Fires every due reminder once and records it in `notified`.
    ///
    /// A reminder whose notification fails to show is still recorded, so a
    /// broken notification channel does not cause repeated attempts.
    pub fn scan(&self, doc: &Document, notified: &mut NotifiedLog, now: NaiveDateTime) -> ScanReport {
        if !self.notifier.permission().is_granted() {
            log::debug!("Notification permission not granted, skipping reminder scan");
            return ScanReport {
                fired: Vec::new(),
                skipped_without_permission: true,
            };
        }

        let due = due_reminders(doc, notified, now, &self.rules);
        for reminder in &due {
            if let Err(e) = self.notifier.show(NOTIFICATION_TITLE, &reminder.body) {
                log::warn!("Reminder for {} could not be shown: {:#}", reminder.cell, e);
            } else {
                log::info!("Fired reminder for {} at {}", reminder.cell, reminder.reminder_time);
            }
            notified.mark_fired(&reminder.cell, &reminder.reminder_time);
        }

        ScanReport {
            fired: due,
            skipped_without_permission: false,
        }
    }
}
