use std::time::Duration as StdDuration;

use chrono::{Duration, Local, NaiveDateTime};

use super::{ReminderService, ScanReport};
use crate::models::settings::MAX_CHECK_INTERVAL_SECS;
use crate::services::notification::Notifier;
use crate::services::planner::{Planner, PlannerError};
use crate::services::storage::KeyValueStore;

/// Decides when the next reminder scan is due.
#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    interval: Duration,
    next_run_at: Option<NaiveDateTime>,
}

impl ReminderScheduler {
    pub fn new(interval: StdDuration) -> Self {
        let interval = Duration::from_std(interval).unwrap_or_else(|_| Duration::seconds(60));
        Self {
            interval,
            next_run_at: None,
        }
    }

    /// The first tick is always due.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.next_run_at.is_none_or(|next| now >= next)
    }

    pub fn next_run_at(&self) -> Option<NaiveDateTime> {
        self.next_run_at
    }

    /// Reloads the planner from its store and scans it when a scan is due.
    /// Returns `None` when it is too early.
    pub fn tick_at<S, N>(
        &mut self,
        planner: &mut Planner<S>,
        reminders: &ReminderService<N>,
        now: NaiveDateTime,
    ) -> Result<Option<ScanReport>, PlannerError>
    where
        S: KeyValueStore,
        N: Notifier,
    {
        if !self.is_due(now) {
            return Ok(None);
        }
        self.run_at(planner, reminders, now).map(Some)
    }

    /// Reloads and scans unconditionally, then schedules the next run.
    pub fn run_at<S, N>(
        &mut self,
        planner: &mut Planner<S>,
        reminders: &ReminderService<N>,
        now: NaiveDateTime,
    ) -> Result<ScanReport, PlannerError>
    where
        S: KeyValueStore,
        N: Notifier,
    {
        self.next_run_at = Some(
            now.checked_add_signed(self.interval)
                .unwrap_or(NaiveDateTime::MAX),
        );
        planner.reload();
        planner.check_reminders(reminders, now)
    }
}

/// Scans for due reminders on a fixed interval until Ctrl-C.
pub async fn run_reminder_loop<S, N>(
    planner: &mut Planner<S>,
    reminders: &ReminderService<N>,
    interval: StdDuration,
) -> anyhow::Result<()>
where
    S: KeyValueStore,
    N: Notifier,
{
    let period = interval.clamp(
        StdDuration::from_secs(1),
        StdDuration::from_secs(MAX_CHECK_INTERVAL_SECS),
    );
    let mut ticker = tokio::time::interval(period);
    let mut scheduler = ReminderScheduler::new(period);
    log::info!("Watching reminders every {}s", period.as_secs());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Local::now().naive_local();
                match scheduler.run_at(planner, reminders, now) {
                    Ok(report) if !report.fired.is_empty() => {
                        log::info!("Fired {} reminder(s)", report.fired.len());
                    }
                    Ok(_) => {}
                    Err(e) => log::error!("Reminder scan failed: {:#}", e),
                }
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                log::info!("Stopping reminder watch");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::edit::EventEdit;
    use crate::models::event::CellKey;
    use crate::services::migration::MigrationContext;
    use crate::services::notification::{MockNotifier, NotificationPermission};
    use crate::services::reminder::ReminderRules;
    use crate::services::storage::{FileStore, MemoryStore};
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn planner_with_event() -> Planner<MemoryStore> {
        let mut planner = Planner::open(
            MemoryStore::new(),
            MigrationContext {
                today: at(15, 0, 0).date(),
                compat_mode: false,
            },
        );
        let column = planner.document().columns[0].id.clone();
        let cell = CellKey::new(at(15, 0, 0).date(), column);
        planner
            .save_cell(&cell, &EventEdit::titled("Dentist").times("10:00", ""))
            .unwrap();
        planner
    }

    #[test]
    fn test_first_tick_is_due_then_waits_for_interval() {
        let mut scheduler = ReminderScheduler::new(StdDuration::from_secs(60));
        let mut planner = planner_with_event();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_permission()
            .returning(|| NotificationPermission::Granted);
        notifier.expect_show().times(1).returning(|_, _| Ok(()));
        let reminders = ReminderService::new(notifier, ReminderRules::default());

        let first = scheduler.tick_at(&mut planner, &reminders, at(15, 10, 5)).unwrap();
        assert_eq!(first.map(|r| r.fired.len()), Some(1));

        let early = scheduler.tick_at(&mut planner, &reminders, at(15, 10, 5)).unwrap();
        assert!(early.is_none());
        assert_eq!(scheduler.next_run_at(), Some(at(15, 10, 6)));

        let later = scheduler.tick_at(&mut planner, &reminders, at(15, 10, 6)).unwrap();
        assert_eq!(later.map(|r| r.fired.len()), Some(0));
    }

    #[test]
    fn test_next_run_saturates_near_the_end_of_time() {
        let mut scheduler = ReminderScheduler::new(StdDuration::from_secs(60));
        let mut planner = Planner::open(
            MemoryStore::new(),
            MigrationContext {
                today: at(15, 0, 0).date(),
                compat_mode: false,
            },
        );
        let mut notifier = MockNotifier::new();
        notifier
            .expect_permission()
            .returning(|| NotificationPermission::Denied);
        let reminders = ReminderService::new(notifier, ReminderRules::default());
        let last_minute = NaiveDateTime::MAX - Duration::seconds(1);

        scheduler.run_at(&mut planner, &reminders, last_minute).unwrap();

        assert_eq!(scheduler.next_run_at(), Some(NaiveDateTime::MAX));
        assert!(!scheduler.is_due(last_minute));
    }

    #[test]
    fn test_run_sees_changes_written_by_another_planner() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = MigrationContext {
            today: at(15, 0, 0).date(),
            compat_mode: false,
        };
        let mut watcher = Planner::open(FileStore::new(dir.path()), ctx);
        let mut writer = Planner::open(FileStore::new(dir.path()), ctx);
        writer.set_month("2024-04").unwrap();

        let mut notifier = MockNotifier::new();
        notifier
            .expect_permission()
            .returning(|| NotificationPermission::Denied);
        let reminders = ReminderService::new(notifier, ReminderRules::default());
        let mut scheduler = ReminderScheduler::new(StdDuration::from_secs(60));

        let report = scheduler.run_at(&mut watcher, &reminders, at(15, 10, 5)).unwrap();

        assert!(report.skipped_without_permission);
        assert_eq!(watcher.document().month, "2024-04");
    }
}
